//! HTTP request handlers for the HRIS API.
//!
//! This module contains the handler functions for all API endpoints. Each
//! handler tags its log events with a fresh correlation id.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{calculate_deduction, salary_grade};
use crate::error::EngineError;
use crate::models::PunchEvent;
use crate::services::{ApprovalChainResolver, PayslipAssembler, ShiftReconciliationEngine};

use super::request::{
    DeductionRequest, LeaveRequest, OvertimeRequest, PayslipRequest, ReconcileRequest,
    ResponseRequest, ToggleShiftRequest,
};
use super::response::{ApiError, ApiErrorResponse, PayslipResponse, ToggleShiftResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/deductions/compute", post(compute_deduction_handler))
        .route("/salary-grades/:grade", get(salary_grade_handler))
        .route("/payslips", post(payslip_handler))
        .route("/leaves", post(create_leave_handler))
        .route("/leaves/:id/response", post(leave_response_handler))
        .route("/overtime", post(create_overtime_handler))
        .route("/overtime/:id/response", post(overtime_response_handler))
        .route("/shifts/toggle", post(toggle_shift_handler))
        .route("/attendance/punches", post(ingest_punch_handler))
        .route("/attendance/reconcile", post(reconcile_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

/// Unwraps a JSON body or builds the 400 response for its rejection.
fn parse_body<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(json_response(StatusCode::BAD_REQUEST, error))
}

/// Handler for `POST /deductions/compute`.
async fn compute_deduction_handler(
    State(state): State<AppState>,
    payload: Result<Json<DeductionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(
        correlation_id = %correlation_id,
        kind = request.kind.name(),
        "Computing deduction"
    );

    let config = state.config();
    let result = config
        .deductions()
        .and_then(|deductions| calculate_deduction(request.kind, request.salary, deductions));
    match result {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                amount = %result.amount,
                "Deduction computed"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `GET /salary-grades/:grade`.
async fn salary_grade_handler(State(state): State<AppState>, Path(grade): Path<i64>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, grade, "Computing salary grade");

    let config = state.config();
    let result = config
        .minimum_wage()
        .and_then(|wage| salary_grade(grade, wage.amount, config.settings()));
    match result {
        Ok(grade) => json_response(StatusCode::OK, grade),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /payslips`.
///
/// Creates the payslip if needed, recomputes it and returns the stored
/// payslip with its breakdown.
async fn payslip_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayslipRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(
        correlation_id = %correlation_id,
        user_id = %request.user_id,
        month = request.month,
        year = request.year,
        "Assembling payslip"
    );

    let config = state.config();
    let assembler = PayslipAssembler::new(state.store(), config);
    let result = assembler
        .get_or_create_payslip(&request.user_id, request.month, request.year, request.period)
        .and_then(|payslip| assembler.update_salary(payslip.id));
    match result {
        Ok((payslip, breakdown)) => {
            info!(
                correlation_id = %correlation_id,
                payslip_id = %payslip.id,
                net_salary = %breakdown.net_salary,
                "Payslip assembled"
            );
            json_response(StatusCode::OK, PayslipResponse { payslip, breakdown })
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /leaves`.
async fn create_leave_handler(
    State(state): State<AppState>,
    payload: Result<Json<LeaveRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(
        correlation_id = %correlation_id,
        user_id = %request.user_id,
        date = %request.date,
        "Filing leave request"
    );

    let resolver = ApprovalChainResolver::new(state.store());
    match resolver.create_leave_request(
        &request.user_id,
        request.date,
        request.leave_type,
        request.info,
    ) {
        Ok(leave) => json_response(StatusCode::CREATED, leave),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /leaves/:id/response`.
async fn leave_response_handler(
    State(state): State<AppState>,
    Path(leave_id): Path<Uuid>,
    payload: Result<Json<ResponseRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(
        correlation_id = %correlation_id,
        leave_id = %leave_id,
        responder = %request.responder,
        decision = %request.decision,
        "Recording leave response"
    );

    let resolver = ApprovalChainResolver::new(state.store());
    match resolver.submit_response(leave_id, &request.responder, &request.decision) {
        Ok(leave) => {
            info!(
                correlation_id = %correlation_id,
                status = %leave.status(),
                "Leave response recorded"
            );
            json_response(StatusCode::OK, leave)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /overtime`.
async fn create_overtime_handler(
    State(state): State<AppState>,
    payload: Result<Json<OvertimeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(
        correlation_id = %correlation_id,
        user_id = %request.user_id,
        approver = %request.approver,
        "Filing overtime request"
    );

    let resolver = ApprovalChainResolver::new(state.store());
    match resolver.create_overtime_request(&request.user_id, &request.approver, request.date) {
        Ok(overtime) => json_response(StatusCode::CREATED, overtime),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /overtime/:id/response`.
async fn overtime_response_handler(
    State(state): State<AppState>,
    Path(overtime_id): Path<Uuid>,
    payload: Result<Json<ResponseRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(
        correlation_id = %correlation_id,
        overtime_id = %overtime_id,
        responder = %request.responder,
        "Recording overtime response"
    );

    let resolver = ApprovalChainResolver::new(state.store());
    match resolver.respond_to_overtime(overtime_id, &request.responder, &request.decision) {
        Ok(overtime) => json_response(StatusCode::OK, overtime),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /shifts/toggle`.
async fn toggle_shift_handler(
    State(state): State<AppState>,
    payload: Result<Json<ToggleShiftRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let engine = ShiftReconciliationEngine::new(state.store());
    match engine.toggle_assignment(
        &request.department_id,
        request.date,
        &request.user_id,
        &request.shift_id,
    ) {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                department_id = %request.department_id,
                date = %request.date,
                user_id = %request.user_id,
                shift_id = %request.shift_id,
                outcome = ?outcome,
                "Shift assignment toggled"
            );
            json_response(StatusCode::OK, ToggleShiftResponse { outcome })
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /attendance/punches`.
async fn ingest_punch_handler(
    State(state): State<AppState>,
    payload: Result<Json<PunchEvent>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let event = match parse_body(correlation_id, payload) {
        Ok(event) => event,
        Err(response) => return response,
    };

    let engine = ShiftReconciliationEngine::new(state.store());
    match engine.ingest_punch(&event) {
        Ok(record) => {
            if record.user_id.is_none() {
                warn!(
                    correlation_id = %correlation_id,
                    device_user_id = event.device_user_id,
                    "Punch stored without a mapped user"
                );
            }
            json_response(StatusCode::CREATED, record)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /attendance/reconcile`.
async fn reconcile_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReconcileRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let engine = ShiftReconciliationEngine::new(state.store());
    match engine.reconcile_day(&request.user_id, request.date) {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                user_id = %request.user_id,
                removed = report.removed.len(),
                "Attendance reconciled"
            );
            json_response(StatusCode::OK, report)
        }
        Err(err) => error_response(correlation_id, err),
    }
}
