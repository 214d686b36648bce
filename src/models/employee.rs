//! Employee directory models.
//!
//! Users, departments, jobs and the biometric UID mapping. These are the
//! records the core reads from the directory; it never owns their lifecycle.

use serde::{Deserialize, Serialize};

/// A user's organisational role, which fixes their approval chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular employee.
    Employee,
    /// Head of a department.
    DepartmentHead,
    /// Director, above department heads.
    Director,
    /// President of the organisation.
    President,
    /// Human resources.
    Hr,
}

/// Represents an employee known to the HRIS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the user.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The department the user belongs to, if assigned.
    #[serde(default)]
    pub department_id: Option<String>,
    /// The user's role.
    pub role: Role,
    /// Current rank, formatted as `<JOB CODE>-<n>` (e.g. "ADM-2").
    #[serde(default)]
    pub rank: Option<String>,
    /// Whether the user is enrolled in MP2 savings.
    #[serde(default)]
    pub mp2_enrolled: bool,
}

impl Employee {
    /// Returns true if the user holds `role`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hris_core::models::{Employee, Role};
    ///
    /// let head = Employee {
    ///     id: "u_001".to_string(),
    ///     name: "Ana Reyes".to_string(),
    ///     department_id: Some("it".to_string()),
    ///     role: Role::DepartmentHead,
    ///     rank: None,
    ///     mp2_enrolled: false,
    /// };
    /// assert!(head.has_role(Role::DepartmentHead));
    /// ```
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

/// An organisational department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Unique identifier.
    pub id: String,
    /// Department name.
    pub name: String,
}

/// A job with its starting salary grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Short job code used in ranks (e.g. "ADM").
    pub code: String,
    /// Job title.
    pub title: String,
    /// Salary grade of rank 1 of this job.
    pub salary_grade: u32,
    /// Departments this job applies to.
    #[serde(default)]
    pub department_ids: Vec<String>,
    /// Inactive jobs are kept for old ranks but not offered.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Links a user to the id the biometric device reports for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiometricDetail {
    /// The internal user id.
    pub user_id: String,
    /// The user id configured on the device.
    pub user_id_in_device: i64,
}
