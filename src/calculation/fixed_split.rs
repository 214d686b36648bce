//! Fixed contribution split (Pag-IBIG).

use rust_decimal::Decimal;

use crate::config::{DeductionKind, FixedContributionConfig};
use crate::models::AuditStep;

use super::deduction::DeductionResult;

/// The employee's half of the configured fixed contribution.
///
/// Independent of salary.
pub fn calculate_fixed_split(config: &FixedContributionConfig) -> DeductionResult {
    let amount = config.amount / Decimal::TWO;

    DeductionResult {
        kind: DeductionKind::PagIbig,
        amount,
        audit_step: AuditStep {
            rule_id: "pagibig_fixed_split".to_string(),
            rule_name: "Pag-IBIG Contribution".to_string(),
            input: serde_json::json!({
                "configured_amount": config.amount.to_string()
            }),
            output: serde_json::json!({
                "amount": amount.to_string()
            }),
            reasoning: format!("₱{} / 2 = ₱{}", config.amount, amount),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_of_configured_amount() {
        let config = FixedContributionConfig {
            amount: Decimal::new(200, 0),
        };
        assert_eq!(calculate_fixed_split(&config).amount, Decimal::new(100, 0));
    }

    #[test]
    fn test_odd_amount_keeps_fraction() {
        let config = FixedContributionConfig {
            amount: Decimal::new(15, 0),
        };
        assert_eq!(calculate_fixed_split(&config).amount, Decimal::new(75, 1));
    }
}
