//! Leave and overtime approval chains.
//!
//! The requester's role fixes which of the department's approvers hold the
//! two decision slots of a leave request:
//!
//! | Requester       | First slot          | Second slot |
//! |-----------------|---------------------|-------------|
//! | EMPLOYEE, HR    | department approver | HR          |
//! | DEPARTMENT_HEAD | director            | HR          |
//! | DIRECTOR        | president           | HR          |
//! | PRESIDENT       | HR                  | none        |
//!
//! A REJECTED slot is terminal: once the request is resolved no further
//! responses are accepted.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    ApproverDecision, Decision, DecisionStatus, Employee, Leave, LeaveApprover, LeaveCredit,
    LeaveType, OverTime, Role,
};
use crate::repository::{DirectoryRepository, LeaveRepository};

/// One approver position of a department.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproverSlot {
    /// The department head position.
    Department,
    /// The director position.
    Director,
    /// The president position.
    President,
    /// The HR position.
    Hr,
}

impl ApproverSlot {
    /// The field name of this slot on a [`LeaveApprover`].
    pub fn field_name(self) -> &'static str {
        match self {
            ApproverSlot::Department => "department_approver",
            ApproverSlot::Director => "director_approver",
            ApproverSlot::President => "president_approver",
            ApproverSlot::Hr => "hr_approver",
        }
    }

    fn holder(self, approvers: &LeaveApprover) -> Option<&str> {
        match self {
            ApproverSlot::Department => approvers.department_approver.as_deref(),
            ApproverSlot::Director => approvers.director_approver.as_deref(),
            ApproverSlot::President => approvers.president_approver.as_deref(),
            ApproverSlot::Hr => approvers.hr_approver.as_deref(),
        }
    }
}

/// The approver positions a requester's leave goes through, in order.
pub fn required_slots(role: Role) -> &'static [ApproverSlot] {
    match role {
        Role::Employee | Role::Hr => &[ApproverSlot::Department, ApproverSlot::Hr],
        Role::DepartmentHead => &[ApproverSlot::Director, ApproverSlot::Hr],
        Role::Director => &[ApproverSlot::President, ApproverSlot::Hr],
        Role::President => &[ApproverSlot::Hr],
    }
}

/// The role whose holders may approve a requester's overtime.
pub fn overtime_approver_role(role: Role) -> Option<Role> {
    match role {
        Role::Employee => Some(Role::DepartmentHead),
        Role::DepartmentHead => Some(Role::Director),
        Role::Director => Some(Role::President),
        Role::President => Some(Role::Hr),
        Role::Hr => None,
    }
}

/// Routes leave and overtime requests to their approvers.
pub struct ApprovalChainResolver<'a, R> {
    repo: &'a R,
}

impl<'a, R> ApprovalChainResolver<'a, R>
where
    R: DirectoryRepository + LeaveRepository,
{
    /// Creates a resolver over a repository.
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Replaces a department's approver mapping.
    ///
    /// The department and every assigned user must exist.
    pub fn set_department_approvers(&self, approvers: LeaveApprover) -> EngineResult<LeaveApprover> {
        self.repo.department(&approvers.department_id)?;
        for slot in [
            ApproverSlot::Department,
            ApproverSlot::Director,
            ApproverSlot::President,
            ApproverSlot::Hr,
        ] {
            if let Some(user_id) = slot.holder(&approvers) {
                self.repo.employee(user_id)?;
            }
        }
        self.repo.save_leave_approver(approvers.clone());
        Ok(approvers)
    }

    /// Resolves the pending decision slots for a requester.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RoleMisconfiguration`] naming every required
    /// position the requester's department has not assigned.
    pub fn resolve_approvers(
        &self,
        requester: &Employee,
    ) -> EngineResult<(ApproverDecision, Option<ApproverDecision>)> {
        let slots = required_slots(requester.role);
        let department = requester.department_id.clone().unwrap_or_default();
        let approvers = self
            .repo
            .leave_approver(&department)
            .unwrap_or_else(|| LeaveApprover {
                department_id: department.clone(),
                ..LeaveApprover::default()
            });

        let missing_roles: Vec<String> = slots
            .iter()
            .filter(|slot| slot.holder(&approvers).is_none())
            .map(|slot| slot.field_name().to_string())
            .collect();
        if !missing_roles.is_empty() {
            let department = match self.repo.department(&department) {
                Ok(found) => found.name,
                Err(_) => department,
            };
            return Err(EngineError::RoleMisconfiguration {
                department,
                missing_roles,
            });
        }

        let mut decisions = slots
            .iter()
            .filter_map(|slot| slot.holder(&approvers))
            .map(ApproverDecision::pending);
        let first = decisions.next().ok_or_else(|| EngineError::RoleMisconfiguration {
            department: approvers.department_id.clone(),
            missing_roles: vec![ApproverSlot::Hr.field_name().to_string()],
        })?;
        Ok((first, decisions.next()))
    }

    /// Files a leave request with its approval slots resolved.
    pub fn create_leave_request(
        &self,
        user_id: &str,
        date: NaiveDate,
        leave_type: LeaveType,
        info: Option<String>,
    ) -> EngineResult<Leave> {
        let requester = self.repo.employee(user_id)?;
        let (first_approver, second_approver) = self.resolve_approvers(&requester)?;
        let leave = Leave {
            id: Uuid::new_v4(),
            user_id: requester.id,
            date,
            leave_type,
            info,
            first_approver,
            second_approver,
            credit_consumed: false,
        };
        self.repo.insert_leave(leave.clone());
        Ok(leave)
    }

    /// Records `responder`'s decision on a leave request.
    ///
    /// When a paid leave becomes fully approved, one of the requester's
    /// credits is consumed.
    ///
    /// # Errors
    ///
    /// - [`EngineError::RequestAlreadyResolved`] if the request is no longer pending
    /// - [`EngineError::UnauthorizedApprover`] if `responder` holds neither slot
    /// - [`EngineError::InvalidDecision`] for anything but APPROVE or REJECT
    pub fn submit_response(&self, leave_id: Uuid, responder: &str, decision: &str) -> EngineResult<Leave> {
        self.repo.update_leave(leave_id, |leave| {
            let status = leave.status();
            if status != DecisionStatus::Pending {
                return Err(EngineError::RequestAlreadyResolved {
                    request_id: leave.id.to_string(),
                    status: status.to_string(),
                });
            }

            let slot = if leave.first_approver.approver == responder {
                &mut leave.first_approver
            } else {
                match leave.second_approver.as_mut() {
                    Some(second) if second.approver == responder => second,
                    _ => {
                        return Err(EngineError::UnauthorizedApprover {
                            user_id: responder.to_string(),
                            request_id: leave.id.to_string(),
                        })
                    }
                }
            };
            slot.status = decision.parse::<Decision>()?.status();

            if leave.status() == DecisionStatus::Approved
                && leave.leave_type == LeaveType::Paid
                && !leave.credit_consumed
            {
                self.repo.update_leave_credit(&leave.user_id, |credit| {
                    credit.used_credits += 1;
                    Ok(())
                })?;
                leave.credit_consumed = true;
            }
            Ok(leave.clone())
        })
    }

    /// Deletes a leave request, restoring any credit it consumed.
    pub fn delete_leave(&self, leave_id: Uuid) -> EngineResult<Leave> {
        let leave = self.repo.delete_leave(leave_id)?;
        if leave.credit_consumed {
            self.repo.update_leave_credit(&leave.user_id, |credit| {
                credit.used_credits = credit.used_credits.saturating_sub(1);
                Ok(())
            })?;
        }
        Ok(leave)
    }

    /// Sets the number of credits granted to a user.
    pub fn set_leave_credit(&self, user_id: &str, credits: u32) -> EngineResult<LeaveCredit> {
        let employee = self.repo.employee(user_id)?;
        self.repo.update_leave_credit(&employee.id, |credit| {
            credit.credits = credits;
            Ok(credit.clone())
        })
    }

    /// Clears a user's consumed credits.
    pub fn reset_used_credits(&self, user_id: &str) -> EngineResult<LeaveCredit> {
        let employee = self.repo.employee(user_id)?;
        self.repo.update_leave_credit(&employee.id, |credit| {
            credit.used_credits = 0;
            Ok(credit.clone())
        })
    }

    /// The users a requester may pick as overtime approver.
    ///
    /// Employees pick among their own department's heads; everyone else
    /// among all holders of the next role up.
    pub fn overtime_approver_candidates(&self, requester: &Employee) -> Vec<Employee> {
        match (requester.role, overtime_approver_role(requester.role)) {
            (_, None) => Vec::new(),
            (Role::Employee, Some(role)) => match requester.department_id.as_deref() {
                Some(department) => self.repo.department_members_with_role(department, role),
                None => Vec::new(),
            },
            (_, Some(role)) => self.repo.employees_with_role(role),
        }
    }

    /// Files an overtime request to a chosen approver.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnauthorizedApprover`] when the approver is not
    /// among the requester's candidates.
    pub fn create_overtime_request(
        &self,
        user_id: &str,
        approver_id: &str,
        date: NaiveDate,
    ) -> EngineResult<OverTime> {
        let requester = self.repo.employee(user_id)?;
        let id = Uuid::new_v4();
        if !self
            .overtime_approver_candidates(&requester)
            .iter()
            .any(|candidate| candidate.id == approver_id)
        {
            return Err(EngineError::UnauthorizedApprover {
                user_id: approver_id.to_string(),
                request_id: id.to_string(),
            });
        }

        let overtime = OverTime {
            id,
            user_id: requester.id,
            approver: approver_id.to_string(),
            date,
            status: DecisionStatus::Pending,
        };
        self.repo.insert_overtime(overtime.clone());
        Ok(overtime)
    }

    /// Records the designated approver's decision on an overtime request.
    pub fn respond_to_overtime(
        &self,
        overtime_id: Uuid,
        responder: &str,
        decision: &str,
    ) -> EngineResult<OverTime> {
        self.repo.update_overtime(overtime_id, |overtime| {
            if overtime.approver != responder {
                return Err(EngineError::UnauthorizedApprover {
                    user_id: responder.to_string(),
                    request_id: overtime.id.to_string(),
                });
            }
            if overtime.status != DecisionStatus::Pending {
                return Err(EngineError::RequestAlreadyResolved {
                    request_id: overtime.id.to_string(),
                    status: overtime.status.to_string(),
                });
            }
            overtime.status = decision.parse::<Decision>()?.status();
            Ok(overtime.clone())
        })
    }

    /// Deletes an overtime request.
    pub fn delete_overtime(&self, overtime_id: Uuid) -> EngineResult<OverTime> {
        self.repo.delete_overtime(overtime_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Department;
    use crate::repository::InMemoryStore;

    fn person(id: &str, department: Option<&str>, role: Role) -> Employee {
        Employee {
            id: id.to_string(),
            name: id.to_string(),
            department_id: department.map(str::to_string),
            role,
            rank: None,
            mp2_enrolled: false,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.insert_department(Department {
            id: "it".to_string(),
            name: "IT".to_string(),
        });
        store.insert_department(Department {
            id: "finance".to_string(),
            name: "Finance".to_string(),
        });
        for employee in [
            person("emp", Some("it"), Role::Employee),
            person("head", Some("it"), Role::DepartmentHead),
            person("other_head", Some("finance"), Role::DepartmentHead),
            person("director", Some("it"), Role::Director),
            person("president", None, Role::President),
            person("hr", Some("it"), Role::Hr),
            person("fin_emp", Some("finance"), Role::Employee),
        ] {
            store.insert_employee(employee);
        }
        store.save_leave_approver(LeaveApprover {
            department_id: "it".to_string(),
            department_approver: Some("head".to_string()),
            director_approver: Some("director".to_string()),
            president_approver: Some("president".to_string()),
            hr_approver: Some("hr".to_string()),
        });
        store
    }

    #[test]
    fn test_chain_by_role() {
        let store = store();
        let resolver = ApprovalChainResolver::new(&store);

        let cases = [
            ("emp", "head", Some("hr")),
            ("head", "director", Some("hr")),
            ("director", "president", Some("hr")),
        ];
        for (requester, first, second) in cases {
            let mut employee = store.employee(requester).unwrap();
            employee.department_id = Some("it".to_string());
            let (a, b) = resolver.resolve_approvers(&employee).unwrap();
            assert_eq!(a.approver, first);
            assert_eq!(a.status, DecisionStatus::Pending);
            assert_eq!(b.map(|d| d.approver).as_deref(), second);
        }
    }

    #[test]
    fn test_president_has_single_approver() {
        let store = store();
        let resolver = ApprovalChainResolver::new(&store);
        let president = person("president", Some("it"), Role::President);
        let (first, second) = resolver.resolve_approvers(&president).unwrap();
        assert_eq!(first.approver, "hr");
        assert!(second.is_none());
    }

    #[test]
    fn test_missing_roles_block_creation() {
        let store = store();
        let resolver = ApprovalChainResolver::new(&store);
        match resolver.create_leave_request("fin_emp", date(), LeaveType::Paid, None) {
            Err(EngineError::RoleMisconfiguration {
                department,
                missing_roles,
            }) => {
                assert_eq!(department, "Finance");
                assert_eq!(missing_roles, vec!["department_approver", "hr_approver"]);
            }
            other => panic!("Expected RoleMisconfiguration, got {:?}", other),
        }
        assert!(store.leaves_for("fin_emp").is_empty());
    }

    #[test]
    fn test_partial_mapping_names_only_missing_roles() {
        let store = store();
        let resolver = ApprovalChainResolver::new(&store);
        resolver
            .set_department_approvers(LeaveApprover {
                department_id: "finance".to_string(),
                department_approver: Some("other_head".to_string()),
                ..LeaveApprover::default()
            })
            .unwrap();
        let err = resolver
            .create_leave_request("fin_emp", date(), LeaveType::Unpaid, None)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Roles not set: hr_approver for Finance department"
        );
    }

    #[test]
    fn test_set_department_approvers_validates_users() {
        let store = store();
        let resolver = ApprovalChainResolver::new(&store);
        let result = resolver.set_department_approvers(LeaveApprover {
            department_id: "finance".to_string(),
            hr_approver: Some("ghost".to_string()),
            ..LeaveApprover::default()
        });
        assert!(matches!(result, Err(EngineError::RecordNotFound { .. })));
        assert!(resolver
            .set_department_approvers(LeaveApprover {
                department_id: "nowhere".to_string(),
                ..LeaveApprover::default()
            })
            .is_err());
    }

    #[test]
    fn test_approval_round_trip() {
        let store = store();
        let resolver = ApprovalChainResolver::new(&store);
        let leave = resolver
            .create_leave_request("emp", date(), LeaveType::Unpaid, Some("Family".to_string()))
            .unwrap();
        assert_eq!(leave.first_approver.approver, "head");
        assert_eq!(leave.second_approver.as_ref().unwrap().approver, "hr");
        assert_eq!(leave.status(), DecisionStatus::Pending);

        let leave = resolver.submit_response(leave.id, "head", "APPROVE").unwrap();
        assert_eq!(leave.first_approver.status, DecisionStatus::Approved);
        assert_eq!(leave.second_approver.as_ref().unwrap().status, DecisionStatus::Pending);
        assert_eq!(leave.status(), DecisionStatus::Pending);

        let leave = resolver.submit_response(leave.id, "hr", "REJECT").unwrap();
        assert_eq!(leave.status(), DecisionStatus::Rejected);
    }

    #[test]
    fn test_rejection_is_terminal() {
        let store = store();
        let resolver = ApprovalChainResolver::new(&store);
        let leave = resolver
            .create_leave_request("emp", date(), LeaveType::Unpaid, None)
            .unwrap();
        resolver.submit_response(leave.id, "head", "REJECT").unwrap();

        match resolver.submit_response(leave.id, "hr", "APPROVE") {
            Err(EngineError::RequestAlreadyResolved { status, .. }) => assert_eq!(status, "REJECTED"),
            other => panic!("Expected RequestAlreadyResolved, got {:?}", other),
        }
        assert_eq!(store.leave(leave.id).unwrap().status(), DecisionStatus::Rejected);
    }

    #[test]
    fn test_approver_may_revise_while_pending() {
        let store = store();
        let resolver = ApprovalChainResolver::new(&store);
        let leave = resolver
            .create_leave_request("emp", date(), LeaveType::Unpaid, None)
            .unwrap();
        resolver.submit_response(leave.id, "hr", "APPROVE").unwrap();
        let leave = resolver.submit_response(leave.id, "hr", "REJECT").unwrap();
        assert_eq!(leave.status(), DecisionStatus::Rejected);
    }

    #[test]
    fn test_non_approver_and_bad_decision() {
        let store = store();
        let resolver = ApprovalChainResolver::new(&store);
        let leave = resolver
            .create_leave_request("emp", date(), LeaveType::Unpaid, None)
            .unwrap();

        assert!(matches!(
            resolver.submit_response(leave.id, "director", "APPROVE"),
            Err(EngineError::UnauthorizedApprover { .. })
        ));
        assert!(matches!(
            resolver.submit_response(leave.id, "head", "MAYBE"),
            Err(EngineError::InvalidDecision { .. })
        ));
        assert_eq!(store.leave(leave.id).unwrap().first_approver.status, DecisionStatus::Pending);
    }

    #[test]
    fn test_paid_leave_consumes_and_restores_credit() {
        let store = store();
        let resolver = ApprovalChainResolver::new(&store);
        resolver.set_leave_credit("emp", 5).unwrap();

        let leave = resolver
            .create_leave_request("emp", date(), LeaveType::Paid, None)
            .unwrap();
        resolver.submit_response(leave.id, "head", "APPROVE").unwrap();
        assert_eq!(store.leave_credit("emp").unwrap().used_credits, 0);

        let leave = resolver.submit_response(leave.id, "hr", "APPROVE").unwrap();
        assert!(leave.credit_consumed);
        assert_eq!(store.leave_credit("emp").unwrap().remaining(), 4);

        resolver.delete_leave(leave.id).unwrap();
        assert_eq!(store.leave_credit("emp").unwrap().remaining(), 5);
        assert!(store.leave(leave.id).is_err());
    }

    #[test]
    fn test_reset_used_credits() {
        let store = store();
        let resolver = ApprovalChainResolver::new(&store);
        resolver.set_leave_credit("emp", 3).unwrap();
        store
            .update_leave_credit("emp", |c| {
                c.used_credits = 2;
                Ok(())
            })
            .unwrap();
        assert_eq!(resolver.reset_used_credits("emp").unwrap().remaining(), 3);
    }

    #[test]
    fn test_overtime_candidates() {
        let store = store();
        let resolver = ApprovalChainResolver::new(&store);

        let ids = |user: &str| -> Vec<String> {
            let employee = store.employee(user).unwrap();
            resolver
                .overtime_approver_candidates(&employee)
                .into_iter()
                .map(|e| e.id)
                .collect()
        };
        assert_eq!(ids("emp"), vec!["head"]);
        assert_eq!(ids("head"), vec!["director"]);
        assert_eq!(ids("director"), vec!["president"]);
        assert_eq!(ids("president"), vec!["hr"]);
        assert!(ids("hr").is_empty());
    }

    #[test]
    fn test_overtime_flow() {
        let store = store();
        let resolver = ApprovalChainResolver::new(&store);

        assert!(matches!(
            resolver.create_overtime_request("emp", "other_head", date()),
            Err(EngineError::UnauthorizedApprover { .. })
        ));

        let overtime = resolver.create_overtime_request("emp", "head", date()).unwrap();
        assert!(matches!(
            resolver.respond_to_overtime(overtime.id, "hr", "APPROVE"),
            Err(EngineError::UnauthorizedApprover { .. })
        ));
        assert!(matches!(
            resolver.respond_to_overtime(overtime.id, "head", "approve"),
            Err(EngineError::InvalidDecision { .. })
        ));

        let approved = resolver.respond_to_overtime(overtime.id, "head", "APPROVE").unwrap();
        assert_eq!(approved.status, DecisionStatus::Approved);
        assert!(matches!(
            resolver.respond_to_overtime(overtime.id, "head", "REJECT"),
            Err(EngineError::RequestAlreadyResolved { .. })
        ));

        resolver.delete_overtime(overtime.id).unwrap();
        assert!(store.overtime(overtime.id).is_err());
    }
}
