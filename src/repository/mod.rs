//! Typed repository interfaces for the records the core reads and writes.
//!
//! Every read-modify-write goes through a closure-taking `update_*`/`with_*`
//! method. The closure runs while the store holds the record's lock and its
//! changes are committed only when it returns `Ok`, so one call is one
//! transaction.

mod memory;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    AttendanceRecord, DailyShiftRecord, Department, Employee, FixedCompensation, Job, Leave,
    LeaveApprover, LeaveCredit, OverTime, Payslip, PayslipKey, Role, Shift, ThirteenthMonthPay,
};

pub use memory::InMemoryStore;

/// Users, departments, jobs, approvers and credits.
pub trait DirectoryRepository {
    /// Looks up a user by id.
    fn employee(&self, id: &str) -> EngineResult<Employee>;

    /// Looks up a department by id.
    fn department(&self, id: &str) -> EngineResult<Department>;

    /// All users holding `role`, in id order.
    fn employees_with_role(&self, role: Role) -> Vec<Employee>;

    /// Users of a department holding `role`, in id order.
    fn department_members_with_role(&self, department_id: &str, role: Role) -> Vec<Employee>;

    /// All jobs.
    fn jobs(&self) -> Vec<Job>;

    /// The approver mapping of a department.
    fn leave_approver(&self, department_id: &str) -> Option<LeaveApprover>;

    /// Replaces the approver mapping of `approver.department_id`.
    fn save_leave_approver(&self, approver: LeaveApprover);

    /// Maps a device-side user id to a user.
    fn user_for_device_id(&self, device_user_id: i64) -> Option<String>;

    /// The credit balance of a user.
    fn leave_credit(&self, user_id: &str) -> Option<LeaveCredit>;

    /// Updates a user's credit balance, creating an empty one first if needed.
    fn update_leave_credit<T, F>(&self, user_id: &str, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut LeaveCredit) -> EngineResult<T>;
}

/// Payslips, compensations and thirteenth-month pay.
pub trait PayrollRepository {
    /// Returns the payslip for `key`, inserting `create()` if none exists.
    fn get_or_create_payslip<F>(&self, key: &PayslipKey, create: F) -> Payslip
    where
        F: FnOnce() -> Payslip;

    /// Looks up a payslip by id.
    fn payslip(&self, id: Uuid) -> EngineResult<Payslip>;

    /// Updates a payslip.
    fn update_payslip<T, F>(&self, id: Uuid, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Payslip) -> EngineResult<T>;

    /// Fixed compensations granted to `user_id` for the month.
    fn fixed_compensations_for(&self, user_id: &str, month: u32, year: i32) -> Vec<FixedCompensation>;

    /// Inserts or replaces a fixed compensation.
    fn save_fixed_compensation(&self, compensation: FixedCompensation);

    /// Removes a fixed compensation.
    fn delete_fixed_compensation(&self, id: Uuid) -> EngineResult<FixedCompensation>;

    /// Inserts a thirteenth-month pay record.
    fn insert_thirteenth_month(&self, pay: ThirteenthMonthPay);

    /// Looks up a thirteenth-month pay record.
    fn thirteenth_month(&self, id: Uuid) -> EngineResult<ThirteenthMonthPay>;

    /// Updates a thirteenth-month pay record.
    fn update_thirteenth_month<T, F>(&self, id: Uuid, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut ThirteenthMonthPay) -> EngineResult<T>;

    /// Removes a thirteenth-month pay record.
    fn delete_thirteenth_month(&self, id: Uuid) -> EngineResult<ThirteenthMonthPay>;
}

/// Leave and overtime requests.
pub trait LeaveRepository {
    /// Inserts a leave request.
    fn insert_leave(&self, leave: Leave);

    /// Looks up a leave request.
    fn leave(&self, id: Uuid) -> EngineResult<Leave>;

    /// Leave requests filed by `user_id`.
    fn leaves_for(&self, user_id: &str) -> Vec<Leave>;

    /// Updates a leave request.
    fn update_leave<T, F>(&self, id: Uuid, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Leave) -> EngineResult<T>;

    /// Removes a leave request.
    fn delete_leave(&self, id: Uuid) -> EngineResult<Leave>;

    /// Inserts an overtime request.
    fn insert_overtime(&self, overtime: OverTime);

    /// Looks up an overtime request.
    fn overtime(&self, id: Uuid) -> EngineResult<OverTime>;

    /// Updates an overtime request.
    fn update_overtime<T, F>(&self, id: Uuid, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut OverTime) -> EngineResult<T>;

    /// Removes an overtime request.
    fn delete_overtime(&self, id: Uuid) -> EngineResult<OverTime>;
}

/// Shift templates and daily schedules.
pub trait ScheduleRepository {
    /// Looks up a shift template.
    fn shift(&self, id: &str) -> EngineResult<Shift>;

    /// The schedule of a department on a date, if one was created.
    fn daily_record(&self, department_id: &str, date: NaiveDate) -> Option<DailyShiftRecord>;

    /// Runs `f` on the department's schedule for `date`, creating an empty
    /// record first if none exists.
    fn with_daily_record<T, F>(&self, department_id: &str, date: NaiveDate, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut DailyShiftRecord) -> EngineResult<T>;

    /// The shift `user_id` is scheduled for on `date`, in any department.
    ///
    /// Assignments in the user's own department win over others; among
    /// those the earliest start wins, then the lowest shift id.
    fn scheduled_shift(&self, user_id: &str, date: NaiveDate) -> Option<Shift>;
}

/// Stored punches.
pub trait AttendanceRepository {
    /// Inserts a punch.
    fn insert_attendance(&self, record: AttendanceRecord);

    /// Punches of `user_id` on `date`, in timestamp order.
    fn attendance_for(&self, user_id: &str, date: NaiveDate) -> Vec<AttendanceRecord>;

    /// Punches with no mapped user.
    fn orphan_attendance(&self) -> Vec<AttendanceRecord>;

    /// Runs `f` on the punches of `user_id` on `date`; the records it leaves
    /// in the vector are the ones kept.
    fn with_attendance_day<T, F>(&self, user_id: &str, date: NaiveDate, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Vec<AttendanceRecord>) -> EngineResult<T>;
}
