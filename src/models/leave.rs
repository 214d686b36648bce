//! Leave and overtime request models.
//!
//! A leave request embeds one decision per approval slot. Its overall status
//! is derived from the slots, never stored: any rejection is final, and the
//! request is approved only when every present slot is approved.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

/// The state of one approval slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionStatus {
    /// Awaiting the approver.
    Pending,
    /// Approved by the approver.
    Approved,
    /// Rejected by the approver.
    Rejected,
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DecisionStatus::Pending => "PENDING",
            DecisionStatus::Approved => "APPROVED",
            DecisionStatus::Rejected => "REJECTED",
        })
    }
}

/// An approver's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Approve the request.
    Approve,
    /// Reject the request.
    Reject,
}

impl Decision {
    /// The slot status this decision produces.
    pub fn status(self) -> DecisionStatus {
        match self {
            Decision::Approve => DecisionStatus::Approved,
            Decision::Reject => DecisionStatus::Rejected,
        }
    }
}

impl FromStr for Decision {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "APPROVE" => Ok(Decision::Approve),
            "REJECT" => Ok(Decision::Reject),
            other => Err(EngineError::InvalidDecision {
                value: other.to_string(),
            }),
        }
    }
}

/// One approval slot of a leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproverDecision {
    /// The user holding this slot.
    pub approver: String,
    /// The slot's status.
    pub status: DecisionStatus,
}

impl ApproverDecision {
    /// A pending slot for `approver`.
    pub fn pending(approver: impl Into<String>) -> Self {
        Self {
            approver: approver.into(),
            status: DecisionStatus::Pending,
        }
    }
}

/// The kind of leave being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveType {
    /// Paid leave; consumes one leave credit once approved.
    #[serde(rename = "PA")]
    Paid,
    /// Unpaid leave.
    #[serde(rename = "UN")]
    Unpaid,
    /// Work-related trip.
    #[serde(rename = "WR")]
    WorkRelatedTrip,
}

/// Per-department approver assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApprover {
    /// The department these approvers serve.
    pub department_id: String,
    /// Approves employees.
    #[serde(default)]
    pub department_approver: Option<String>,
    /// Approves department heads.
    #[serde(default)]
    pub director_approver: Option<String>,
    /// Approves directors.
    #[serde(default)]
    pub president_approver: Option<String>,
    /// Second-level approver for everyone; sole approver for the president.
    #[serde(default)]
    pub hr_approver: Option<String>,
}

/// A leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leave {
    /// Unique identifier.
    pub id: Uuid,
    /// The requester.
    pub user_id: String,
    /// The leave date.
    pub date: NaiveDate,
    /// The leave type.
    pub leave_type: LeaveType,
    /// Free-form details.
    #[serde(default)]
    pub info: Option<String>,
    /// First approval slot.
    pub first_approver: ApproverDecision,
    /// Second approval slot; absent for a single-approver chain.
    pub second_approver: Option<ApproverDecision>,
    /// Whether approval consumed a leave credit.
    #[serde(default)]
    pub credit_consumed: bool,
}

impl Leave {
    /// The present slots, in order.
    pub fn slots(&self) -> impl Iterator<Item = &ApproverDecision> {
        std::iter::once(&self.first_approver).chain(self.second_approver.as_ref())
    }

    /// The derived overall status.
    ///
    /// # Examples
    ///
    /// ```
    /// use hris_core::models::{ApproverDecision, DecisionStatus, Leave, LeaveType};
    /// use chrono::NaiveDate;
    /// use uuid::Uuid;
    ///
    /// let mut leave = Leave {
    ///     id: Uuid::new_v4(),
    ///     user_id: "u_001".to_string(),
    ///     date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
    ///     leave_type: LeaveType::Paid,
    ///     info: None,
    ///     first_approver: ApproverDecision::pending("head"),
    ///     second_approver: Some(ApproverDecision::pending("hr")),
    ///     credit_consumed: false,
    /// };
    /// leave.first_approver.status = DecisionStatus::Approved;
    /// assert_eq!(leave.status(), DecisionStatus::Pending);
    /// ```
    pub fn status(&self) -> DecisionStatus {
        if self.slots().any(|s| s.status == DecisionStatus::Rejected) {
            return DecisionStatus::Rejected;
        }
        if self.slots().all(|s| s.status == DecisionStatus::Approved) {
            return DecisionStatus::Approved;
        }
        DecisionStatus::Pending
    }

    /// The status of the slot held by `user_id`, if any.
    pub fn user_status(&self, user_id: &str) -> Option<DecisionStatus> {
        self.slots()
            .find(|s| s.approver == user_id)
            .map(|s| s.status)
    }

    /// Whether the first approver has responded.
    pub fn ready_for_second_approver(&self) -> bool {
        self.first_approver.status != DecisionStatus::Pending
    }
}

/// A user's leave credit balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveCredit {
    /// The credited user.
    pub user_id: String,
    /// Credits granted.
    pub credits: u32,
    /// Credits consumed by approved paid leave.
    #[serde(default)]
    pub used_credits: u32,
}

impl LeaveCredit {
    /// Credits still available.
    pub fn remaining(&self) -> u32 {
        self.credits.saturating_sub(self.used_credits)
    }
}

/// An overtime request with a single approver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverTime {
    /// Unique identifier.
    pub id: Uuid,
    /// The requester.
    pub user_id: String,
    /// The approver chosen by the requester.
    pub approver: String,
    /// The overtime date.
    pub date: NaiveDate,
    /// The approver's decision.
    pub status: DecisionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leave(second: Option<ApproverDecision>) -> Leave {
        Leave {
            id: Uuid::new_v4(),
            user_id: "u_001".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            leave_type: LeaveType::Paid,
            info: None,
            first_approver: ApproverDecision::pending("head"),
            second_approver: second,
            credit_consumed: false,
        }
    }

    #[test]
    fn test_new_request_is_pending() {
        let leave = leave(Some(ApproverDecision::pending("hr")));
        assert_eq!(leave.status(), DecisionStatus::Pending);
        assert!(!leave.ready_for_second_approver());
    }

    #[test]
    fn test_both_approved_is_approved() {
        let mut leave = leave(Some(ApproverDecision::pending("hr")));
        leave.first_approver.status = DecisionStatus::Approved;
        leave.second_approver.as_mut().unwrap().status = DecisionStatus::Approved;
        assert_eq!(leave.status(), DecisionStatus::Approved);
    }

    #[test]
    fn test_first_rejection_is_terminal_even_if_second_approves() {
        let mut leave = leave(Some(ApproverDecision::pending("hr")));
        leave.first_approver.status = DecisionStatus::Rejected;
        assert_eq!(leave.status(), DecisionStatus::Rejected);

        leave.second_approver.as_mut().unwrap().status = DecisionStatus::Approved;
        assert_eq!(leave.status(), DecisionStatus::Rejected);
    }

    #[test]
    fn test_single_slot_chain() {
        let mut leave = leave(None);
        assert_eq!(leave.status(), DecisionStatus::Pending);
        leave.first_approver.status = DecisionStatus::Approved;
        assert_eq!(leave.status(), DecisionStatus::Approved);
    }

    #[test]
    fn test_user_status() {
        let leave = leave(Some(ApproverDecision::pending("hr")));
        assert_eq!(leave.user_status("hr"), Some(DecisionStatus::Pending));
        assert_eq!(leave.user_status("stranger"), None);
    }

    #[test]
    fn test_decision_parse() {
        assert_eq!("APPROVE".parse::<Decision>().unwrap(), Decision::Approve);
        assert_eq!("REJECT".parse::<Decision>().unwrap(), Decision::Reject);
        match "approve".parse::<Decision>() {
            Err(EngineError::InvalidDecision { value }) => assert_eq!(value, "approve"),
            other => panic!("Expected InvalidDecision, got {:?}", other),
        }
    }

    #[test]
    fn test_leave_credit_remaining() {
        let credit = LeaveCredit {
            user_id: "u_001".to_string(),
            credits: 5,
            used_credits: 2,
        };
        assert_eq!(credit.remaining(), 3);
    }

    #[test]
    fn test_leave_type_serialization() {
        assert_eq!(serde_json::to_string(&LeaveType::Paid).unwrap(), "\"PA\"");
        let parsed: LeaveType = serde_json::from_str("\"WR\"").unwrap();
        assert_eq!(parsed, LeaveType::WorkRelatedTrip);
    }
}
