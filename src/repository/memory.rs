//! In-memory implementation of every repository.
//!
//! Each collection sits behind its own `RwLock`. Locks are always taken in
//! declaration order (leaves before leave credits) when nested.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, BiometricDetail, DailyShiftRecord, Department, Employee, FixedCompensation,
    Job, Leave, LeaveApprover, LeaveCredit, OverTime, Payslip, PayslipKey, Role, Shift,
    ThirteenthMonthPay,
};

use super::{
    AttendanceRepository, DirectoryRepository, LeaveRepository, PayrollRepository,
    ScheduleRepository,
};

/// A process-local store backing every repository trait.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    employees: RwLock<BTreeMap<String, Employee>>,
    departments: RwLock<BTreeMap<String, Department>>,
    jobs: RwLock<Vec<Job>>,
    leave_approvers: RwLock<HashMap<String, LeaveApprover>>,
    biometrics: RwLock<HashMap<i64, String>>,
    payslips: RwLock<HashMap<Uuid, Payslip>>,
    fixed_compensations: RwLock<HashMap<Uuid, FixedCompensation>>,
    thirteenth_month: RwLock<HashMap<Uuid, ThirteenthMonthPay>>,
    leaves: RwLock<HashMap<Uuid, Leave>>,
    leave_credits: RwLock<HashMap<String, LeaveCredit>>,
    overtime: RwLock<HashMap<Uuid, OverTime>>,
    shifts: RwLock<HashMap<String, Shift>>,
    daily_records: RwLock<HashMap<(String, NaiveDate), DailyShiftRecord>>,
    attendance: RwLock<Vec<AttendanceRecord>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Applies `f` to a copy of the entry and commits it only on success.
fn update_entry<K, V, T, F>(
    map: &mut HashMap<K, V>,
    key: &K,
    entity: &'static str,
    f: F,
) -> EngineResult<T>
where
    K: Eq + Hash + ToString,
    V: Clone,
    F: FnOnce(&mut V) -> EngineResult<T>,
{
    let entry = map
        .get_mut(key)
        .ok_or_else(|| EngineError::not_found(entity, key.to_string()))?;
    let mut draft = entry.clone();
    let value = f(&mut draft)?;
    *entry = draft;
    Ok(value)
}

fn remove_entry<K, V>(map: &mut HashMap<K, V>, key: &K, entity: &'static str) -> EngineResult<V>
where
    K: Eq + Hash + ToString,
{
    map.remove(key)
        .ok_or_else(|| EngineError::not_found(entity, key.to_string()))
}

fn get_entry<K, V>(map: &HashMap<K, V>, key: &K, entity: &'static str) -> EngineResult<V>
where
    K: Eq + Hash + ToString,
    V: Clone,
{
    map.get(key)
        .cloned()
        .ok_or_else(|| EngineError::not_found(entity, key.to_string()))
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user.
    pub fn insert_employee(&self, employee: Employee) {
        write(&self.employees).insert(employee.id.clone(), employee);
    }

    /// Inserts or replaces a department.
    pub fn insert_department(&self, department: Department) {
        write(&self.departments).insert(department.id.clone(), department);
    }

    /// Inserts or replaces a job by code.
    pub fn insert_job(&self, job: Job) {
        let mut jobs = write(&self.jobs);
        jobs.retain(|existing| existing.code != job.code);
        jobs.push(job);
    }

    /// Maps a device-side user id to a user.
    pub fn insert_biometric_detail(&self, detail: BiometricDetail) {
        write(&self.biometrics).insert(detail.user_id_in_device, detail.user_id);
    }

    /// Inserts or replaces a shift template.
    pub fn insert_shift(&self, shift: Shift) {
        write(&self.shifts).insert(shift.id.clone(), shift);
    }
}

impl DirectoryRepository for InMemoryStore {
    fn employee(&self, id: &str) -> EngineResult<Employee> {
        read(&self.employees)
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("User", id))
    }

    fn department(&self, id: &str) -> EngineResult<Department> {
        read(&self.departments)
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("Department", id))
    }

    fn employees_with_role(&self, role: Role) -> Vec<Employee> {
        read(&self.employees)
            .values()
            .filter(|e| e.role == role)
            .cloned()
            .collect()
    }

    fn department_members_with_role(&self, department_id: &str, role: Role) -> Vec<Employee> {
        read(&self.employees)
            .values()
            .filter(|e| e.role == role && e.department_id.as_deref() == Some(department_id))
            .cloned()
            .collect()
    }

    fn jobs(&self) -> Vec<Job> {
        read(&self.jobs).clone()
    }

    fn leave_approver(&self, department_id: &str) -> Option<LeaveApprover> {
        read(&self.leave_approvers).get(department_id).cloned()
    }

    fn save_leave_approver(&self, approver: LeaveApprover) {
        write(&self.leave_approvers).insert(approver.department_id.clone(), approver);
    }

    fn user_for_device_id(&self, device_user_id: i64) -> Option<String> {
        read(&self.biometrics).get(&device_user_id).cloned()
    }

    fn leave_credit(&self, user_id: &str) -> Option<LeaveCredit> {
        read(&self.leave_credits).get(user_id).cloned()
    }

    fn update_leave_credit<T, F>(&self, user_id: &str, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut LeaveCredit) -> EngineResult<T>,
    {
        let mut credits = write(&self.leave_credits);
        let mut draft = credits.get(user_id).cloned().unwrap_or_else(|| LeaveCredit {
            user_id: user_id.to_string(),
            credits: 0,
            used_credits: 0,
        });
        let value = f(&mut draft)?;
        credits.insert(user_id.to_string(), draft);
        Ok(value)
    }
}

impl PayrollRepository for InMemoryStore {
    fn get_or_create_payslip<F>(&self, key: &PayslipKey, create: F) -> Payslip
    where
        F: FnOnce() -> Payslip,
    {
        let mut payslips = write(&self.payslips);
        if let Some(existing) = payslips.values().find(|p| &p.key == key) {
            return existing.clone();
        }
        let payslip = create();
        payslips.insert(payslip.id, payslip.clone());
        payslip
    }

    fn payslip(&self, id: Uuid) -> EngineResult<Payslip> {
        get_entry(&read(&self.payslips), &id, "Payslip")
    }

    fn update_payslip<T, F>(&self, id: Uuid, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Payslip) -> EngineResult<T>,
    {
        update_entry(&mut write(&self.payslips), &id, "Payslip", f)
    }

    fn fixed_compensations_for(&self, user_id: &str, month: u32, year: i32) -> Vec<FixedCompensation> {
        let mut found: Vec<FixedCompensation> = read(&self.fixed_compensations)
            .values()
            .filter(|c| c.applies_to(user_id, month, year))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    fn save_fixed_compensation(&self, compensation: FixedCompensation) {
        write(&self.fixed_compensations).insert(compensation.id, compensation);
    }

    fn delete_fixed_compensation(&self, id: Uuid) -> EngineResult<FixedCompensation> {
        remove_entry(&mut write(&self.fixed_compensations), &id, "FixedCompensation")
    }

    fn insert_thirteenth_month(&self, pay: ThirteenthMonthPay) {
        write(&self.thirteenth_month).insert(pay.id, pay);
    }

    fn thirteenth_month(&self, id: Uuid) -> EngineResult<ThirteenthMonthPay> {
        get_entry(&read(&self.thirteenth_month), &id, "ThirteenthMonthPay")
    }

    fn update_thirteenth_month<T, F>(&self, id: Uuid, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut ThirteenthMonthPay) -> EngineResult<T>,
    {
        update_entry(&mut write(&self.thirteenth_month), &id, "ThirteenthMonthPay", f)
    }

    fn delete_thirteenth_month(&self, id: Uuid) -> EngineResult<ThirteenthMonthPay> {
        remove_entry(&mut write(&self.thirteenth_month), &id, "ThirteenthMonthPay")
    }
}

impl LeaveRepository for InMemoryStore {
    fn insert_leave(&self, leave: Leave) {
        write(&self.leaves).insert(leave.id, leave);
    }

    fn leave(&self, id: Uuid) -> EngineResult<Leave> {
        get_entry(&read(&self.leaves), &id, "Leave")
    }

    fn leaves_for(&self, user_id: &str) -> Vec<Leave> {
        let mut found: Vec<Leave> = read(&self.leaves)
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|l| l.date);
        found
    }

    fn update_leave<T, F>(&self, id: Uuid, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Leave) -> EngineResult<T>,
    {
        update_entry(&mut write(&self.leaves), &id, "Leave", f)
    }

    fn delete_leave(&self, id: Uuid) -> EngineResult<Leave> {
        remove_entry(&mut write(&self.leaves), &id, "Leave")
    }

    fn insert_overtime(&self, overtime: OverTime) {
        write(&self.overtime).insert(overtime.id, overtime);
    }

    fn overtime(&self, id: Uuid) -> EngineResult<OverTime> {
        get_entry(&read(&self.overtime), &id, "OverTime")
    }

    fn update_overtime<T, F>(&self, id: Uuid, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut OverTime) -> EngineResult<T>,
    {
        update_entry(&mut write(&self.overtime), &id, "OverTime", f)
    }

    fn delete_overtime(&self, id: Uuid) -> EngineResult<OverTime> {
        remove_entry(&mut write(&self.overtime), &id, "OverTime")
    }
}

impl ScheduleRepository for InMemoryStore {
    fn shift(&self, id: &str) -> EngineResult<Shift> {
        read(&self.shifts)
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("Shift", id))
    }

    fn daily_record(&self, department_id: &str, date: NaiveDate) -> Option<DailyShiftRecord> {
        read(&self.daily_records)
            .get(&(department_id.to_string(), date))
            .cloned()
    }

    fn with_daily_record<T, F>(&self, department_id: &str, date: NaiveDate, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut DailyShiftRecord) -> EngineResult<T>,
    {
        let mut records = write(&self.daily_records);
        let key = (department_id.to_string(), date);
        let mut draft = records
            .get(&key)
            .cloned()
            .unwrap_or_else(|| DailyShiftRecord::new(department_id, date));
        let value = f(&mut draft)?;
        records.insert(key, draft);
        Ok(value)
    }

    fn scheduled_shift(&self, user_id: &str, date: NaiveDate) -> Option<Shift> {
        let home = read(&self.employees)
            .get(user_id)
            .and_then(|employee| employee.department_id.clone());
        let records = read(&self.daily_records);
        let shifts_guard = read(&self.shifts);
        let shifts = &*shifts_guard;
        records
            .values()
            .filter(|record| record.date == date)
            .flat_map(|record| {
                let foreign = home.as_deref() != Some(record.department_id.as_str());
                record
                    .assignments
                    .iter()
                    .filter(|a| a.user_id == user_id)
                    .filter_map(move |a| shifts.get(&a.shift_id).map(|shift| (foreign, shift)))
            })
            .min_by(|(a_foreign, a), (b_foreign, b)| {
                (a_foreign, a.start_time, &a.id).cmp(&(b_foreign, b.start_time, &b.id))
            })
            .map(|(_, shift)| shift.clone())
    }
}

impl AttendanceRepository for InMemoryStore {
    fn insert_attendance(&self, record: AttendanceRecord) {
        write(&self.attendance).push(record);
    }

    fn attendance_for(&self, user_id: &str, date: NaiveDate) -> Vec<AttendanceRecord> {
        let mut found: Vec<AttendanceRecord> = read(&self.attendance)
            .iter()
            .filter(|r| r.user_id.as_deref() == Some(user_id) && r.timestamp.date() == date)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.timestamp);
        found
    }

    fn orphan_attendance(&self) -> Vec<AttendanceRecord> {
        read(&self.attendance)
            .iter()
            .filter(|r| r.user_id.is_none())
            .cloned()
            .collect()
    }

    fn with_attendance_day<T, F>(&self, user_id: &str, date: NaiveDate, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Vec<AttendanceRecord>) -> EngineResult<T>,
    {
        let mut records = write(&self.attendance);
        let (mut day, rest): (Vec<AttendanceRecord>, Vec<AttendanceRecord>) = records
            .iter()
            .cloned()
            .partition(|r| r.user_id.as_deref() == Some(user_id) && r.timestamp.date() == date);
        day.sort_by_key(|r| r.timestamp);
        let value = f(&mut day)?;
        *records = rest;
        records.extend(day);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PayPeriodHalf, Punch, ShiftAssignment};
    use chrono::NaiveTime;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    fn key() -> PayslipKey {
        PayslipKey {
            user_id: "u_001".to_string(),
            month: 3,
            year: 2025,
            period: PayPeriodHalf::Second,
        }
    }

    fn punch(user: Option<&str>, h: u32, m: u32) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            user_id: user.map(str::to_string),
            user_id_from_device: 7,
            timestamp: date().and_hms_opt(h, m, 0).unwrap(),
            punch: Punch::TimeIn,
        }
    }

    #[test]
    fn test_get_or_create_payslip_is_idempotent() {
        let store = InMemoryStore::new();
        let first = store.get_or_create_payslip(&key(), || Payslip::new(key(), None));
        let second = store.get_or_create_payslip(&key(), || panic!("should not create twice"));
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn test_failed_update_is_rolled_back() {
        let store = InMemoryStore::new();
        let payslip = store.get_or_create_payslip(&key(), || Payslip::new(key(), None));

        let result: EngineResult<()> = store.update_payslip(payslip.id, |p| {
            p.released = true;
            Err(EngineError::CalculationError {
                message: "boom".to_string(),
            })
        });
        assert!(result.is_err());
        assert!(!store.payslip(payslip.id).unwrap().released);
    }

    #[test]
    fn test_missing_records_are_not_found() {
        let store = InMemoryStore::new();
        match store.leave(Uuid::nil()) {
            Err(EngineError::RecordNotFound { entity, .. }) => assert_eq!(entity, "Leave"),
            other => panic!("Expected RecordNotFound, got {:?}", other),
        }
        assert!(store.employee("nobody").is_err());
    }

    #[test]
    fn test_update_leave_credit_creates_empty_balance() {
        let store = InMemoryStore::new();
        store
            .update_leave_credit("u_001", |c| {
                c.credits = 5;
                Ok(())
            })
            .unwrap();
        assert_eq!(store.leave_credit("u_001").unwrap().remaining(), 5);
    }

    #[test]
    fn test_scheduled_shift_looks_across_departments() {
        let store = InMemoryStore::new();
        store.insert_shift(Shift {
            id: "morning".to_string(),
            description: "Morning".to_string(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            is_active: true,
        });
        store
            .with_daily_record("ops", date(), |record| {
                record.link(ShiftAssignment {
                    user_id: "u_001".to_string(),
                    shift_id: "morning".to_string(),
                });
                Ok(())
            })
            .unwrap();

        assert_eq!(store.scheduled_shift("u_001", date()).unwrap().id, "morning");
        assert!(store.scheduled_shift("u_002", date()).is_none());
        assert!(store.scheduled_shift("u_001", date().succ_opt().unwrap()).is_none());
    }

    #[test]
    fn test_scheduled_shift_prefers_home_department_then_earliest_start() {
        let store = InMemoryStore::new();
        store.insert_employee(Employee {
            id: "u_001".to_string(),
            name: "Juan".to_string(),
            department_id: Some("ops".to_string()),
            role: Role::Employee,
            rank: None,
            mp2_enrolled: false,
        });
        for (id, hour) in [("early", 6), ("late", 14), ("dawn", 4)] {
            store.insert_shift(Shift {
                id: id.to_string(),
                description: id.to_string(),
                start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(hour + 8, 0, 0).unwrap(),
                is_active: true,
            });
        }
        let assign = |department: &str, shift: &str| {
            store
                .with_daily_record(department, date(), |record| {
                    record.link(ShiftAssignment {
                        user_id: "u_001".to_string(),
                        shift_id: shift.to_string(),
                    });
                    Ok(())
                })
                .unwrap();
        };
        assign("ops", "late");
        assign("ops", "early");
        assign("sales", "dawn");

        for _ in 0..5 {
            assert_eq!(store.scheduled_shift("u_001", date()).unwrap().id, "early");
        }
    }

    #[test]
    fn test_with_attendance_day_only_touches_that_day() {
        let store = InMemoryStore::new();
        store.insert_attendance(punch(Some("u_001"), 8, 58));
        store.insert_attendance(punch(Some("u_001"), 9, 15));
        store.insert_attendance(punch(Some("u_002"), 9, 0));
        store.insert_attendance(punch(None, 9, 1));

        store
            .with_attendance_day("u_001", date(), |day| {
                assert_eq!(day.len(), 2);
                day.truncate(1);
                Ok(())
            })
            .unwrap();

        assert_eq!(store.attendance_for("u_001", date()).len(), 1);
        assert_eq!(store.attendance_for("u_002", date()).len(), 1);
        assert_eq!(store.orphan_attendance().len(), 1);
    }
}
