//! Error types for the HRIS core.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the payroll, approval and attendance components signal.
//! The core never logs or formats these for users; the surrounding layer does.

use thiserror::Error;

/// The main error type for the HRIS core.
///
/// # Example
///
/// ```
/// use hris_core::error::EngineError;
///
/// let error = EngineError::ConfigurationMissing {
///     name: "SSS".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration not initialized: SSS");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A deduction, wage or MP2 lookup found no initialized record.
    #[error("Configuration not initialized: {name}")]
    ConfigurationMissing {
        /// The name of the missing configuration (e.g. "SSS", "MINIMUM WAGE").
        name: String,
    },

    /// A configuration record was initialized twice.
    #[error("Configuration already initialized: {name}")]
    AlreadyInitialized {
        /// The name of the configuration.
        name: String,
    },

    /// A configuration block carries values that cannot be used.
    #[error("Invalid configuration for {name}: {message}")]
    InvalidConfiguration {
        /// The block name.
        name: String,
        /// What is wrong with it.
        message: String,
    },

    /// An update was submitted with the value already in effect.
    #[error("The value {value} for {field} matches the current value")]
    ValueMismatch {
        /// The field being updated.
        field: String,
        /// The submitted value.
        value: String,
    },

    /// The approval chain cannot be resolved for a department.
    #[error("Roles not set: {} for {department} department", .missing_roles.join(", "))]
    RoleMisconfiguration {
        /// The department of the requester.
        department: String,
        /// The approver roles that are not assigned.
        missing_roles: Vec<String>,
    },

    /// A response was submitted by a user who holds no approval slot.
    #[error("User '{user_id}' does not have approval rights for request {request_id}")]
    UnauthorizedApprover {
        /// The responding user.
        user_id: String,
        /// The request being responded to.
        request_id: String,
    },

    /// A response value outside approve/reject.
    #[error("Invalid choice for approval: {value}")]
    InvalidDecision {
        /// The rejected response value.
        value: String,
    },

    /// The request already reached a final status.
    #[error("Request {request_id} is already {status}")]
    RequestAlreadyResolved {
        /// The request identifier.
        request_id: String,
        /// Its final status.
        status: String,
    },

    /// A salary grade below 1 was requested.
    #[error("Invalid salary grade: {grade}")]
    InvalidSalaryGrade {
        /// The requested grade.
        grade: i64,
    },

    /// A rank string could not be resolved to a job and grade.
    #[error("Invalid rank '{rank}': {message}")]
    InvalidRank {
        /// The rank as stored on the user or payslip.
        rank: String,
        /// Why it could not be resolved.
        message: String,
    },

    /// A record referenced by id does not exist.
    #[error("{entity} not found: {id}")]
    RecordNotFound {
        /// The kind of record.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// An inactive shift was newly assigned.
    #[error("Shift '{shift_id}' is inactive")]
    InactiveShift {
        /// The shift identifier.
        shift_id: String,
    },

    /// A device punch code that maps to no punch direction.
    #[error("Unknown punch code from device: {code}")]
    InvalidPunch {
        /// The raw punch code.
        code: i32,
    },

    /// The biometric device could not be reached or failed mid-capture.
    #[error("Biometric device error: {message}")]
    DeviceError {
        /// A description of the failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::RecordNotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::RecordNotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for a decimal overflow while computing `what`.
    pub fn overflow(what: &str) -> Self {
        Self::CalculationError {
            message: format!("decimal overflow while computing {}", what),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
