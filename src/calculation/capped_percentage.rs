//! Capped percentage (health-insurance style) contribution.

use rust_decimal::Decimal;

use crate::config::{CappedPercentageConfig, DeductionKind};
use crate::models::AuditStep;

use super::deduction::DeductionResult;

/// Employee share of the premium; the employer pays the other half.
const EMPLOYEE_SHARE_DIVISOR: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// Calculates the employee's share of a percentage premium.
///
/// Below `min_compensation` the minimum contribution applies, above
/// `max_compensation` the maximum; in between the employee pays
/// `salary × rate% / 2`.
pub fn calculate_capped_percentage(
    salary: Decimal,
    config: &CappedPercentageConfig,
) -> DeductionResult {
    let (amount, reasoning) = if salary < config.min_compensation {
        (
            config.min_contribution,
            format!(
                "Salary ₱{} is below ₱{}: minimum contribution ₱{}",
                salary, config.min_compensation, config.min_contribution
            ),
        )
    } else if salary > config.max_compensation {
        (
            config.max_contribution,
            format!(
                "Salary ₱{} is above ₱{}: maximum contribution ₱{}",
                salary, config.max_compensation, config.max_contribution
            ),
        )
    } else {
        let amount = salary * config.rate / EMPLOYEE_SHARE_DIVISOR;
        (
            amount,
            format!(
                "₱{} × {}% / 2 = ₱{}",
                salary, config.rate, amount
            ),
        )
    };

    DeductionResult {
        kind: DeductionKind::Philhealth,
        amount,
        audit_step: AuditStep {
            rule_id: "philhealth_capped_percentage".to_string(),
            rule_name: "PhilHealth Premium".to_string(),
            input: serde_json::json!({
                "salary": salary.to_string(),
                "rate": config.rate.to_string()
            }),
            output: serde_json::json!({
                "amount": amount.to_string()
            }),
            reasoning,
        },
    }
}
