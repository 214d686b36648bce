//! Progressive withholding tax.

use rust_decimal::Decimal;

use crate::config::{DeductionKind, ProgressiveTaxConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

use super::deduction::DeductionResult;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Calculates the withholding tax on `salary`.
///
/// Finds the first bracket `i` with `salary <= compensation_range[i]`. Nothing
/// is withheld in bracket 0. Otherwise the tax is
/// `base_tax[i-1] + (salary - (compensation_range[i-1] + 1)) × percentage[i-1] / 100`.
/// A salary above every bracket pays `base_tax[last] + (salary -
/// compensation_range[last]) × percentage[last] / 100`, with no offset.
///
/// The excess over the threshold never goes below zero, so fractional salaries
/// in `(range, range + 1)` pay only the base tax.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfiguration`] when the parallel lists
/// differ in length.
///
/// # Examples
///
/// ```
/// use hris_core::calculation::calculate_progressive_tax;
/// use hris_core::config::ProgressiveTaxConfig;
/// use rust_decimal::Decimal;
///
/// let config = ProgressiveTaxConfig {
///     compensation_range: vec![Decimal::new(10417, 0), Decimal::new(16666, 0)],
///     percentage: vec![Decimal::new(15, 0), Decimal::new(20, 0)],
///     base_tax: vec![Decimal::ZERO, Decimal::new(93750, 2)],
/// };
/// let result = calculate_progressive_tax(Decimal::new(10000, 0), &config).unwrap();
/// assert_eq!(result.amount, Decimal::ZERO);
/// ```
pub fn calculate_progressive_tax(
    salary: Decimal,
    config: &ProgressiveTaxConfig,
) -> EngineResult<DeductionResult> {
    let ranges = &config.compensation_range;
    if ranges.len() != config.percentage.len() || ranges.len() != config.base_tax.len() {
        return Err(EngineError::InvalidConfiguration {
            name: DeductionKind::Tax.name().to_string(),
            message: "compensation_range, percentage and base_tax differ in length".to_string(),
        });
    }

    let position = ranges.iter().position(|upper| salary <= *upper);
    let bracket = position.unwrap_or(ranges.len());

    let (amount, reasoning) = match (position, bracket.checked_sub(1)) {
        (_, None) => (
            Decimal::ZERO,
            format!("Salary ₱{} is within the exempt bracket: no tax", salary),
        ),
        (found, Some(previous)) => {
            let threshold = match found {
                Some(_) => ranges[previous] + Decimal::ONE,
                None => ranges[previous],
            };
            let excess = (salary - threshold).max(Decimal::ZERO);
            let rate = config.percentage[previous];
            let base = config.base_tax[previous];
            let amount = base + excess * rate / HUNDRED;
            (
                amount,
                format!(
                    "₱{} + (₱{} - ₱{}) × {}% = ₱{}",
                    base, salary, threshold, rate, amount
                ),
            )
        }
    };

    Ok(DeductionResult {
        kind: DeductionKind::Tax,
        amount,
        audit_step: AuditStep {
            rule_id: "withholding_tax".to_string(),
            rule_name: "Withholding Tax".to_string(),
            input: serde_json::json!({
                "salary": salary.to_string()
            }),
            output: serde_json::json!({
                "bracket": bracket,
                "amount": amount.to_string()
            }),
            reasoning,
        },
    })
}
