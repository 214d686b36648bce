//! Core data models for the HRIS core.
//!
//! This module contains the domain records the payroll, approval and
//! attendance components read and write.

mod attendance;
mod audit;
mod employee;
mod leave;
mod payslip;
mod shift;

pub use attendance::{AttendanceRecord, Punch, PunchEvent};
pub use audit::AuditStep;
pub use employee::{BiometricDetail, Department, Employee, Job, Role};
pub use leave::{
    ApproverDecision, Decision, DecisionStatus, Leave, LeaveApprover, LeaveCredit, LeaveType,
    OverTime,
};
pub use payslip::{
    CompensationLine, FixedCompensation, LineItem, PayPeriodHalf, Payslip, PayslipBreakdown,
    PayslipKey, StatutoryDeduction, ThirteenthMonthBreakdown, ThirteenthMonthPay,
};
pub use shift::{DailyShiftRecord, Shift, ShiftAssignment};
