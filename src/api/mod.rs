//! HTTP API module for the HRIS core.
//!
//! This module exposes deduction and salary-grade computation, payslip
//! assembly, leave and overtime approval, shift toggling and attendance
//! ingestion as JSON endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    DeductionRequest, LeaveRequest, OvertimeRequest, PayslipRequest, ReconcileRequest,
    ResponseRequest, ToggleShiftRequest,
};
pub use response::{ApiError, PayslipResponse};
pub use state::AppState;
