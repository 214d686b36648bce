//! Attendance punch models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// The direction of a punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Punch {
    /// Clock in.
    #[serde(rename = "IN")]
    TimeIn,
    /// Clock out.
    #[serde(rename = "OUT")]
    TimeOut,
    /// Overtime clock in.
    #[serde(rename = "OT_IN")]
    OvertimeIn,
    /// Overtime clock out.
    #[serde(rename = "OT_OUT")]
    OvertimeOut,
}

impl Punch {
    /// Maps the punch code reported by the device.
    ///
    /// ```
    /// use hris_core::models::Punch;
    ///
    /// assert_eq!(Punch::from_device_code(1).unwrap(), Punch::TimeOut);
    /// assert!(Punch::from_device_code(2).is_err());
    /// ```
    pub fn from_device_code(code: i32) -> EngineResult<Self> {
        match code {
            0 => Ok(Punch::TimeIn),
            1 => Ok(Punch::TimeOut),
            4 => Ok(Punch::OvertimeIn),
            5 => Ok(Punch::OvertimeOut),
            other => Err(EngineError::InvalidPunch { code: other }),
        }
    }
}

/// A punch as reported by the biometric device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchEvent {
    /// The user id configured on the device.
    pub device_user_id: i64,
    /// When the punch happened (device local time).
    pub timestamp: NaiveDateTime,
    /// The raw punch code.
    pub punch_code: i32,
}

/// A stored punch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// The mapped user; `None` for an orphan awaiting manual reconciliation.
    pub user_id: Option<String>,
    /// The id the device reported.
    pub user_id_from_device: i64,
    /// When the punch happened.
    pub timestamp: NaiveDateTime,
    /// The punch direction.
    pub punch: Punch,
}
