//! Shift and daily shift schedule models.
//!
//! A [`DailyShiftRecord`] holds, for one department and date, the set of
//! (user, shift) assignments scheduled that day.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reusable shift template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier.
    pub id: String,
    /// Description shown in the scheduler.
    pub description: String,
    /// Clock-in time.
    pub start_time: NaiveTime,
    /// Clock-out time; earlier than `start_time` for overnight shifts.
    pub end_time: NaiveTime,
    /// Inactive shifts cannot be newly assigned.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Shift {
    /// Returns true if the shift ends on the day after it starts.
    ///
    /// # Examples
    ///
    /// ```
    /// use hris_core::models::Shift;
    /// use chrono::NaiveTime;
    ///
    /// let night = Shift {
    ///     id: "night".to_string(),
    ///     description: "Night".to_string(),
    ///     start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
    ///     end_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
    ///     is_active: true,
    /// };
    /// assert!(night.is_next_day_clock_out());
    /// ```
    pub fn is_next_day_clock_out(&self) -> bool {
        self.end_time < self.start_time
    }

    /// The scheduled clock-in on `date`.
    pub fn start_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.start_time)
    }

    /// The scheduled clock-out for the shift starting on `date`.
    pub fn end_on(&self, date: NaiveDate) -> NaiveDateTime {
        let end = date.and_time(self.end_time);
        if self.is_next_day_clock_out() {
            end + Duration::days(1)
        } else {
            end
        }
    }
}

/// One (user, shift) pairing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftAssignment {
    /// The scheduled user.
    pub user_id: String,
    /// The assigned shift.
    pub shift_id: String,
}

/// The schedule of one department on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyShiftRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// The department scheduled.
    pub department_id: String,
    /// The scheduled date.
    pub date: NaiveDate,
    /// The linked assignments; each pairing appears at most once.
    #[serde(default)]
    pub assignments: Vec<ShiftAssignment>,
    /// Whether the schedule was approved.
    #[serde(default)]
    pub is_approved: bool,
}

impl DailyShiftRecord {
    /// An empty record for a department and date.
    pub fn new(department_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            department_id: department_id.into(),
            date,
            assignments: Vec::new(),
            is_approved: false,
        }
    }

    /// Whether the pairing is linked to this record.
    pub fn contains(&self, assignment: &ShiftAssignment) -> bool {
        self.assignments.contains(assignment)
    }

    /// Links the pairing; no-op when already linked.
    pub fn link(&mut self, assignment: ShiftAssignment) {
        if !self.contains(&assignment) {
            self.assignments.push(assignment);
        }
    }

    /// Unlinks the pairing; no-op when not linked.
    pub fn unlink(&mut self, assignment: &ShiftAssignment) {
        self.assignments.retain(|a| a != assignment);
    }

    /// The shift id `user_id` is scheduled for, if any.
    pub fn shift_for(&self, user_id: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.user_id == user_id)
            .map(|a| a.shift_id.as_str())
    }

    /// Users assigned to `shift_id`.
    pub fn users_on(&self, shift_id: &str) -> impl Iterator<Item = &str> {
        self.assignments
            .iter()
            .filter(move |a| a.shift_id == shift_id)
            .map(|a| a.user_id.as_str())
    }
}
