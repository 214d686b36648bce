//! Salary grade and step compounding.
//!
//! Grade 1 pays the minimum wage; every grade above it multiplies the
//! previous one by the grade multiplier. Steps compound within a grade by the
//! step multiplier. Ranks (`<JOB CODE>-<n>`) map onto grades through the
//! job's starting grade.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::PayrollSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::Job;

/// One labelled step within a grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalaryStep {
    /// "STEP 1" to "STEP n".
    pub label: String,
    /// Monthly amount, rounded to centavos.
    pub amount: Decimal,
}

/// A grade with its basic salary and steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalaryGrade {
    /// The grade, starting at 1.
    pub grade: i64,
    /// Monthly basic salary, rounded to centavos.
    pub basic_salary: Decimal,
    /// The steps of this grade.
    pub steps: Vec<SalaryStep>,
}

/// One rank of a job's salary schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankSalary {
    /// The rank label, e.g. "ADM-2".
    pub rank: String,
    /// The grade the rank resolves to.
    pub salary_grade: i64,
    /// Monthly basic salary, rounded to centavos.
    pub basic_salary: Decimal,
    /// The steps of the grade.
    pub steps: Vec<SalaryStep>,
}

/// Highest grade a salary can be computed for.
pub const MAX_SALARY_GRADE: i64 = 100;

/// Computes `minimum_wage × multiplier^(grade - 1)`.
///
/// The product is built iteratively, one grade at a time, so
/// `basic_salary(g + 1) == basic_salary(g) × multiplier` holds exactly.
///
/// # Errors
///
/// - [`EngineError::InvalidSalaryGrade`] when `grade` is outside
///   `1..=MAX_SALARY_GRADE`
/// - [`EngineError::CalculationError`] when the product overflows
///
/// # Examples
///
/// ```
/// use hris_core::calculation::basic_salary;
/// use rust_decimal::Decimal;
///
/// let wage = Decimal::new(13000, 0);
/// let multiplier = Decimal::new(108, 2);
/// assert_eq!(basic_salary(1, wage, multiplier).unwrap(), wage);
/// assert_eq!(basic_salary(2, wage, multiplier).unwrap(), Decimal::new(14040, 0));
/// assert!(basic_salary(0, wage, multiplier).is_err());
/// ```
pub fn basic_salary(grade: i64, minimum_wage: Decimal, multiplier: Decimal) -> EngineResult<Decimal> {
    if !(1..=MAX_SALARY_GRADE).contains(&grade) {
        return Err(EngineError::InvalidSalaryGrade { grade });
    }

    let mut salary = minimum_wage;
    for _ in 1..grade {
        salary = salary
            .checked_mul(multiplier)
            .ok_or_else(|| EngineError::overflow("basic salary"))?;
    }
    Ok(salary)
}

/// Generates `n` steps from a basic salary.
///
/// Step 1 is `basic × step_multiplier`; each later step multiplies the
/// previous one. Amounts are compounded unrounded and rounded for output.
pub fn salary_steps(
    basic: Decimal,
    step_multiplier: Decimal,
    n: u32,
) -> EngineResult<Vec<SalaryStep>> {
    let mut steps = Vec::with_capacity(n as usize);
    let mut current = basic;
    for index in 1..=n {
        current = current
            .checked_mul(step_multiplier)
            .ok_or_else(|| EngineError::overflow("salary step"))?;
        steps.push(SalaryStep {
            label: format!("STEP {}", index),
            amount: current.round_dp(2),
        });
    }
    Ok(steps)
}

/// The basic salary and steps of one grade under `settings`.
pub fn salary_grade(
    grade: i64,
    minimum_wage: Decimal,
    settings: &PayrollSettings,
) -> EngineResult<SalaryGrade> {
    let basic = basic_salary(grade, minimum_wage, settings.grade_multiplier)?;
    Ok(SalaryGrade {
        grade,
        basic_salary: basic.round_dp(2),
        steps: salary_steps(basic, settings.step_multiplier, settings.steps)?,
    })
}

/// Splits a rank into job code and rank number, e.g. "ADM-2" into ("ADM", 2).
pub fn parse_rank<'r>(rank: &'r str, settings: &PayrollSettings) -> EngineResult<(&'r str, u32)> {
    let invalid = |message: String| EngineError::InvalidRank {
        rank: rank.to_string(),
        message,
    };

    let (code, number) = rank
        .rsplit_once('-')
        .ok_or_else(|| invalid("expected <JOB CODE>-<n>".to_string()))?;
    if code.is_empty() {
        return Err(invalid("missing job code".to_string()));
    }
    let number: u32 = number
        .parse()
        .map_err(|_| invalid(format!("'{}' is not a rank number", number)))?;
    if number < 1 || number > settings.max_job_rank {
        return Err(invalid(format!(
            "rank number must be between 1 and {}",
            settings.max_job_rank
        )));
    }
    Ok((code, number))
}

/// The grade a rank resolves to: the job's grade plus the rank offset.
pub fn grade_for_rank(rank: &str, jobs: &[Job], settings: &PayrollSettings) -> EngineResult<i64> {
    let (code, number) = parse_rank(rank, settings)?;
    let job = jobs
        .iter()
        .find(|job| job.code == code)
        .ok_or_else(|| EngineError::InvalidRank {
            rank: rank.to_string(),
            message: format!("no job with code '{}'", code),
        })?;
    Ok(i64::from(job.salary_grade) + i64::from(number) - 1)
}

/// The unrounded monthly basic salary for a rank.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRank`] for a malformed rank or an unknown
/// job code.
pub fn salary_from_rank(
    rank: &str,
    jobs: &[Job],
    minimum_wage: Decimal,
    settings: &PayrollSettings,
) -> EngineResult<Decimal> {
    let grade = grade_for_rank(rank, jobs, settings)?;
    basic_salary(grade, minimum_wage, settings.grade_multiplier)
}

/// The salary schedule of every rank of `job`.
pub fn job_salary_schedule(
    job: &Job,
    minimum_wage: Decimal,
    settings: &PayrollSettings,
) -> EngineResult<Vec<RankSalary>> {
    (1..=settings.max_job_rank)
        .map(|number| {
            let grade = i64::from(job.salary_grade) + i64::from(number) - 1;
            let table = salary_grade(grade, minimum_wage, settings)?;
            Ok(RankSalary {
                rank: format!("{}-{}", job.code, number),
                salary_grade: grade,
                basic_salary: table.basic_salary,
                steps: table.steps,
            })
        })
        .collect()
}
