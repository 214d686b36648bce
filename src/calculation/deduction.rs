//! Dispatch from a deduction kind to its calculator.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::{DeductionConfiguration, DeductionKind};
use crate::error::EngineResult;
use crate::models::AuditStep;

use super::capped_percentage::calculate_capped_percentage;
use super::fixed_split::calculate_fixed_split;
use super::progressive_tax::calculate_progressive_tax;
use super::tiered_contribution::calculate_tiered_contribution;

/// The result of one statutory deduction calculation.
#[derive(Debug, Clone, Serialize)]
pub struct DeductionResult {
    /// Which deduction was calculated.
    pub kind: DeductionKind,
    /// The employee's share.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates one deduction with its audit step.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::ConfigurationMissing`] when `config`
/// has no block for `kind`.
pub fn calculate_deduction(
    kind: DeductionKind,
    salary: Decimal,
    config: &DeductionConfiguration,
) -> EngineResult<DeductionResult> {
    match kind {
        DeductionKind::Sss => Ok(calculate_tiered_contribution(salary, config.sss()?)),
        DeductionKind::Philhealth => Ok(calculate_capped_percentage(salary, config.philhealth()?)),
        DeductionKind::Tax => calculate_progressive_tax(salary, config.tax()?),
        DeductionKind::PagIbig => Ok(calculate_fixed_split(config.pagibig()?)),
    }
}

/// Computes the employee-side amount of one statutory deduction.
///
/// A pure function of its inputs: identical arguments always give the
/// identical amount.
///
/// # Examples
///
/// ```
/// use hris_core::calculation::compute_deduction;
/// use hris_core::config::{DeductionBlock, DeductionConfiguration, DeductionKind, FixedContributionConfig};
/// use rust_decimal::Decimal;
///
/// let config = DeductionConfiguration::new(vec![DeductionBlock::PagIbig(
///     FixedContributionConfig { amount: Decimal::new(200, 0) },
/// )]);
/// let amount = compute_deduction(DeductionKind::PagIbig, Decimal::new(30000, 0), &config).unwrap();
/// assert_eq!(amount, Decimal::new(100, 0));
/// assert!(compute_deduction(DeductionKind::Sss, Decimal::new(30000, 0), &config).is_err());
/// ```
pub fn compute_deduction(
    kind: DeductionKind,
    salary: Decimal,
    config: &DeductionConfiguration,
) -> EngineResult<Decimal> {
    calculate_deduction(kind, salary, config).map(|result| result.amount)
}
