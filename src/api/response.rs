//! Response types for the HRIS API.
//!
//! This module defines the error response structures and maps every
//! [`EngineError`] to an HTTP status and error code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{Payslip, PayslipBreakdown};
use crate::services::ToggleOutcome;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
                )
            }
            EngineError::ConfigurationMissing { name } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIGURATION_MISSING",
                    message,
                    format!("Initialize the {} configuration before computing payroll", name),
                ),
            ),
            EngineError::AlreadyInitialized { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("ALREADY_INITIALIZED", message),
            ),
            EngineError::InvalidConfiguration { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_CONFIGURATION", message),
            ),
            EngineError::ValueMismatch { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("VALUE_MISMATCH", message),
            ),
            EngineError::RoleMisconfiguration { missing_roles, .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "ROLE_MISCONFIGURATION",
                    message,
                    format!("Assign {} for the department", missing_roles.join(", ")),
                ),
            ),
            EngineError::UnauthorizedApprover { .. } => ApiErrorResponse::new(
                StatusCode::FORBIDDEN,
                ApiError::new("UNAUTHORIZED_APPROVER", message),
            ),
            EngineError::InvalidDecision { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details("INVALID_DECISION", message, "Expected APPROVE or REJECT"),
            ),
            EngineError::RequestAlreadyResolved { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("REQUEST_ALREADY_RESOLVED", message),
            ),
            EngineError::InvalidSalaryGrade { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details("INVALID_SALARY_GRADE", message, "Salary grades start at 1"),
            ),
            EngineError::InvalidRank { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_RANK", message),
            ),
            EngineError::RecordNotFound { .. } => ApiErrorResponse::new(
                StatusCode::NOT_FOUND,
                ApiError::new("NOT_FOUND", message),
            ),
            EngineError::InactiveShift { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("INACTIVE_SHIFT", message),
            ),
            EngineError::InvalidPunch { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_PUNCH", message),
            ),
            EngineError::DeviceError { .. } => ApiErrorResponse::new(
                StatusCode::BAD_GATEWAY,
                ApiError::new("DEVICE_ERROR", message),
            ),
            EngineError::CalculationError { message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            ),
        }
    }
}

/// Body of a successful `POST /payslips`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipResponse {
    /// The stored payslip after recomputation.
    pub payslip: Payslip,
    /// Its breakdown.
    pub breakdown: PayslipBreakdown,
}

/// Body of a successful `POST /shifts/toggle`.
#[derive(Debug, Clone, Serialize)]
pub struct ToggleShiftResponse {
    /// Whether the pairing was linked or unlinked.
    pub outcome: ToggleOutcome,
}
