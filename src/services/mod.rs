//! Stateful workflows over the repositories.
//!
//! The payslip assembler, the leave/overtime approval chain and the shift
//! reconciliation engine each borrow a repository and run every
//! read-modify-write as a single repository transaction.

mod approval;
mod payslip;
mod shift;

pub use approval::{ApprovalChainResolver, ApproverSlot, overtime_approver_role, required_slots};
pub use payslip::PayslipAssembler;
pub use shift::{
    PunchResolution, ReconcileReport, ShiftReconciliationEngine, ToggleOutcome,
    disambiguate_duplicate_punch,
};
