//! Calculation logic for the HRIS payroll core.
//!
//! This module contains the pure statutory deduction calculators (tiered
//! social-security contribution, capped-percentage health insurance premium,
//! progressive withholding tax and the fixed Pag-IBIG split), their dispatch
//! by deduction kind, and the salary grade/step compounding.

mod capped_percentage;
mod deduction;
mod fixed_split;
mod progressive_tax;
mod salary_grade;
mod tiered_contribution;

pub use capped_percentage::calculate_capped_percentage;
pub use deduction::{DeductionResult, calculate_deduction, compute_deduction};
pub use fixed_split::calculate_fixed_split;
pub use progressive_tax::calculate_progressive_tax;
pub use salary_grade::{
    MAX_SALARY_GRADE, RankSalary, SalaryGrade, SalaryStep, basic_salary, grade_for_rank,
    job_salary_schedule, parse_rank, salary_from_rank, salary_grade, salary_steps,
};
pub use tiered_contribution::{BRACKET_WIDTH, calculate_tiered_contribution};
