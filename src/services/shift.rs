//! Shift scheduling and attendance reconciliation.
//!
//! Assignments are toggled, not declared: submitting a (user, shift) pairing
//! that is already linked to the day's schedule unlinks it. Duplicate punches
//! of one direction are reconciled against the scheduled shift boundary.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, Punch, PunchEvent, Shift, ShiftAssignment};
use crate::repository::{AttendanceRepository, DirectoryRepository, ScheduleRepository};

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// The pairing was added to the schedule.
    Linked,
    /// The pairing was removed from the schedule.
    Unlinked,
}

/// The survivor and the losers of a duplicate-punch disambiguation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PunchResolution {
    /// The record nearest to the boundary.
    pub kept: AttendanceRecord,
    /// Every other record, to be deleted.
    pub discarded: Vec<AttendanceRecord>,
}

/// Records removed by a day's reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Whether a shift was scheduled; without one nothing is reconciled.
    pub shift_id: Option<String>,
    /// Ids of deleted duplicate punches.
    pub removed: Vec<Uuid>,
}

/// Picks the punch nearest to `target` among same-direction duplicates.
///
/// Ties go to the earlier record in `records`. Returns `None` for an empty
/// slice.
///
/// # Examples
///
/// ```
/// use hris_core::models::{AttendanceRecord, Punch};
/// use hris_core::services::disambiguate_duplicate_punch;
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
/// let punch = |h, m| AttendanceRecord {
///     id: Uuid::new_v4(),
///     user_id: Some("u_001".to_string()),
///     user_id_from_device: 17,
///     timestamp: day.and_hms_opt(h, m, 0).unwrap(),
///     punch: Punch::TimeIn,
/// };
/// let records = vec![punch(8, 58), punch(9, 15)];
/// let resolution =
///     disambiguate_duplicate_punch(&records, day.and_hms_opt(9, 0, 0).unwrap()).unwrap();
/// assert_eq!(resolution.kept.timestamp, records[0].timestamp);
/// assert_eq!(resolution.discarded.len(), 1);
/// ```
pub fn disambiguate_duplicate_punch(
    records: &[AttendanceRecord],
    target: NaiveDateTime,
) -> Option<PunchResolution> {
    let (index, _) = records
        .iter()
        .enumerate()
        .min_by_key(|(_, record)| (record.timestamp - target).num_milliseconds().abs())?;

    let kept = records[index].clone();
    let discarded = records
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, record)| record.clone())
        .collect();
    Some(PunchResolution { kept, discarded })
}

/// Assigns shifts and reconciles attendance.
pub struct ShiftReconciliationEngine<'a, R> {
    repo: &'a R,
}

impl<'a, R> ShiftReconciliationEngine<'a, R>
where
    R: DirectoryRepository + ScheduleRepository + AttendanceRepository,
{
    /// Creates an engine over a repository.
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    fn assignable_shift(&self, shift_id: &str) -> EngineResult<Shift> {
        let shift = self.repo.shift(shift_id)?;
        if !shift.is_active {
            return Err(EngineError::InactiveShift {
                shift_id: shift.id,
            });
        }
        Ok(shift)
    }

    /// Links the pairing if absent from the day's schedule, unlinks it if
    /// present. Applying the same toggle twice restores the original state.
    pub fn toggle_assignment(
        &self,
        department_id: &str,
        date: NaiveDate,
        user_id: &str,
        shift_id: &str,
    ) -> EngineResult<ToggleOutcome> {
        self.repo.employee(user_id)?;
        let shift = self.repo.shift(shift_id)?;
        let assignment = ShiftAssignment {
            user_id: user_id.to_string(),
            shift_id: shift.id.clone(),
        };

        self.repo.with_daily_record(department_id, date, |record| {
            if record.contains(&assignment) {
                record.unlink(&assignment);
                return Ok(ToggleOutcome::Unlinked);
            }
            if !shift.is_active {
                return Err(EngineError::InactiveShift {
                    shift_id: shift.id.clone(),
                });
            }
            record.link(assignment);
            Ok(ToggleOutcome::Linked)
        })
    }

    /// Assigns or unassigns `target_shift` for a group of users.
    ///
    /// Without `deselect`, every user not already on one of `shifts` that day
    /// is linked to `target_shift`. With `deselect`, only users currently on
    /// `target_shift` are unlinked. Returns the affected user ids.
    pub fn bulk_assign(
        &self,
        department_id: &str,
        date: NaiveDate,
        shifts: &[String],
        user_ids: &[String],
        target_shift: &str,
        deselect: bool,
    ) -> EngineResult<Vec<String>> {
        let target = if deselect {
            self.repo.shift(target_shift)?
        } else {
            self.assignable_shift(target_shift)?
        };

        self.repo.with_daily_record(department_id, date, |record| {
            let mut affected = Vec::new();
            for user_id in user_ids {
                let on_listed_shift = record
                    .assignments
                    .iter()
                    .any(|a| a.user_id == *user_id && shifts.contains(&a.shift_id));
                let assignment = ShiftAssignment {
                    user_id: user_id.clone(),
                    shift_id: target.id.clone(),
                };
                if deselect {
                    if record.contains(&assignment) {
                        record.unlink(&assignment);
                        affected.push(user_id.clone());
                    }
                } else if !on_listed_shift {
                    record.link(assignment);
                    affected.push(user_id.clone());
                }
            }
            Ok(affected)
        })
    }

    /// Stores a punch reported by the device.
    ///
    /// Device ids with no biometric mapping produce an orphan record.
    pub fn ingest_punch(&self, event: &PunchEvent) -> EngineResult<AttendanceRecord> {
        let punch = Punch::from_device_code(event.punch_code)?;
        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            user_id: self.repo.user_for_device_id(event.device_user_id),
            user_id_from_device: event.device_user_id,
            timestamp: event.timestamp,
            punch,
        };
        self.repo.insert_attendance(record.clone());
        Ok(record)
    }

    /// Removes duplicate IN and OUT punches of a user's shift on `date`.
    ///
    /// IN punches are measured against the shift start, OUT punches against
    /// its end, which falls on the next day for overnight shifts. Only OUT
    /// punches after the shift start and before the next scheduled shift
    /// starts are considered. Without a scheduled shift nothing is removed.
    pub fn reconcile_day(&self, user_id: &str, date: NaiveDate) -> EngineResult<ReconcileReport> {
        let Some(shift) = self.repo.scheduled_shift(user_id, date) else {
            return Ok(ReconcileReport::default());
        };

        let clock_in = shift.start_on(date);
        let clock_out = shift.end_on(date);
        let out_day = clock_out.date();
        let next_start = self
            .repo
            .scheduled_shift(user_id, out_day)
            .map(|next| next.start_on(out_day))
            .filter(|start| *start > clock_in);

        let mut removed = self.drop_duplicates(user_id, date, Punch::TimeIn, clock_in, |_| true)?;
        removed.extend(self.drop_duplicates(
            user_id,
            out_day,
            Punch::TimeOut,
            clock_out,
            |record| {
                record.timestamp > clock_in && next_start.is_none_or(|start| record.timestamp < start)
            },
        )?);

        Ok(ReconcileReport {
            shift_id: Some(shift.id),
            removed,
        })
    }

    fn drop_duplicates<P>(
        &self,
        user_id: &str,
        day: NaiveDate,
        punch: Punch,
        target: NaiveDateTime,
        in_span: P,
    ) -> EngineResult<Vec<Uuid>>
    where
        P: Fn(&AttendanceRecord) -> bool,
    {
        self.repo.with_attendance_day(user_id, day, |records| {
            let candidates: Vec<AttendanceRecord> = records
                .iter()
                .filter(|r| r.punch == punch && in_span(*r))
                .cloned()
                .collect();
            if candidates.len() < 2 {
                return Ok(Vec::new());
            }
            let Some(resolution) = disambiguate_duplicate_punch(&candidates, target) else {
                return Ok(Vec::new());
            };
            let removed: Vec<Uuid> = resolution.discarded.iter().map(|r| r.id).collect();
            records.retain(|r| !removed.contains(&r.id));
            Ok(removed)
        })
    }
}
