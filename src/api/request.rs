//! Request types for the HRIS API.
//!
//! This module defines the JSON request bodies of the payroll, approval and
//! attendance endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::DeductionKind;
use crate::models::{LeaveType, PayPeriodHalf};

/// Request body for `POST /deductions/compute`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionRequest {
    /// Which statutory deduction to compute.
    pub kind: DeductionKind,
    /// The salary the deduction is based on.
    pub salary: Decimal,
}

/// Request body for `POST /payslips`.
///
/// Creates the payslip on first use, then recomputes and persists its
/// salary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipRequest {
    /// The payslip owner.
    pub user_id: String,
    /// Calendar month, 1–12.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// The pay-period half.
    pub period: PayPeriodHalf,
}

/// Request body for `POST /leaves`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// The requester.
    pub user_id: String,
    /// The day of leave.
    pub date: NaiveDate,
    /// Paid, unpaid or work-related trip.
    pub leave_type: LeaveType,
    /// Free-text reason.
    #[serde(default)]
    pub info: Option<String>,
}

/// Request body for `POST /leaves/:id/response` and
/// `POST /overtime/:id/response`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRequest {
    /// The responding approver.
    pub responder: String,
    /// "APPROVE" or "REJECT".
    pub decision: String,
}

/// Request body for `POST /overtime`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvertimeRequest {
    /// The requester.
    pub user_id: String,
    /// The approver chosen from the requester's candidates.
    pub approver: String,
    /// The day of overtime.
    pub date: NaiveDate,
}

/// Request body for `POST /shifts/toggle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleShiftRequest {
    /// The department whose schedule is edited.
    pub department_id: String,
    /// The scheduled date.
    pub date: NaiveDate,
    /// The user to link or unlink.
    pub user_id: String,
    /// The shift to link or unlink.
    pub shift_id: String,
}

/// Request body for `POST /attendance/reconcile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileRequest {
    /// Whose punches to reconcile.
    pub user_id: String,
    /// The shift date.
    pub date: NaiveDate,
}
