//! Tiered (social-security style) contribution.
//!
//! Salaries between the compensation bounds are bucketed into 500-wide
//! brackets counted upward from `min_compensation`. Each full bracket crossed
//! adds `contribution_difference` on top of `min_contribution`.

use rust_decimal::Decimal;

use crate::config::{DeductionKind, TieredContributionConfig};
use crate::models::AuditStep;

use super::deduction::DeductionResult;

/// Width of one contribution bracket.
pub const BRACKET_WIDTH: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Calculates the employee's tiered contribution for a monthly salary.
///
/// - below `min_compensation`: `min_contribution`
/// - above `max_compensation`: `max_contribution`
/// - otherwise `min_contribution + k × contribution_difference`, where `k` is
///   the number of full brackets between `min_compensation` and the salary,
///   capped at `max_contribution`
///
/// The bracket walk is a bounded loop: it never runs past
/// `max_compensation`.
///
/// # Examples
///
/// ```
/// use hris_core::calculation::calculate_tiered_contribution;
/// use hris_core::config::TieredContributionConfig;
/// use rust_decimal::Decimal;
///
/// let config = TieredContributionConfig {
///     min_compensation: Decimal::ZERO,
///     max_compensation: Decimal::new(30000, 0),
///     min_contribution: Decimal::ZERO,
///     max_contribution: Decimal::new(1500, 0),
///     contribution_difference: Decimal::new(25, 0),
/// };
/// let result = calculate_tiered_contribution(Decimal::new(1000, 0), &config);
/// assert_eq!(result.amount, Decimal::new(50, 0));
/// ```
pub fn calculate_tiered_contribution(
    salary: Decimal,
    config: &TieredContributionConfig,
) -> DeductionResult {
    if salary < config.min_compensation {
        return build_result(
            salary,
            config.min_contribution,
            0,
            format!(
                "Salary ₱{} is below minimum compensation ₱{}: minimum contribution ₱{}",
                salary, config.min_compensation, config.min_contribution
            ),
        );
    }

    if salary > config.max_compensation {
        return build_result(
            salary,
            config.max_contribution,
            0,
            format!(
                "Salary ₱{} is above maximum compensation ₱{}: maximum contribution ₱{}",
                salary, config.max_compensation, config.max_contribution
            ),
        );
    }

    let mut bracket_start = config.min_compensation;
    let mut contribution = config.min_contribution;
    let mut brackets_crossed: u64 = 0;

    while salary >= bracket_start + BRACKET_WIDTH {
        bracket_start += BRACKET_WIDTH;
        contribution += config.contribution_difference;
        brackets_crossed += 1;
    }

    let amount = contribution.min(config.max_contribution);

    build_result(
        salary,
        amount,
        brackets_crossed,
        format!(
            "Salary ₱{} falls in bracket [{}, {}) after {} brackets: ₱{} + {} × ₱{} = ₱{}",
            salary,
            bracket_start,
            bracket_start + BRACKET_WIDTH,
            brackets_crossed,
            config.min_contribution,
            brackets_crossed,
            config.contribution_difference,
            amount
        ),
    )
}

fn build_result(
    salary: Decimal,
    amount: Decimal,
    brackets_crossed: u64,
    reasoning: String,
) -> DeductionResult {
    DeductionResult {
        kind: DeductionKind::Sss,
        amount,
        audit_step: AuditStep {
            rule_id: "sss_tiered_contribution".to_string(),
            rule_name: "SSS Tiered Contribution".to_string(),
            input: serde_json::json!({
                "salary": salary.to_string()
            }),
            output: serde_json::json!({
                "amount": amount.to_string(),
                "brackets_crossed": brackets_crossed
            }),
            reasoning,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn zero_based() -> TieredContributionConfig {
        TieredContributionConfig {
            min_compensation: dec("0"),
            max_compensation: dec("30000"),
            min_contribution: dec("0"),
            max_contribution: dec("1500"),
            contribution_difference: dec("25"),
        }
    }

    fn seeded() -> TieredContributionConfig {
        TieredContributionConfig {
            min_compensation: dec("5250"),
            max_compensation: dec("34750"),
            min_contribution: dec("250"),
            max_contribution: dec("1750"),
            contribution_difference: dec("25"),
        }
    }

    #[test]
    fn test_two_full_brackets_from_zero() {
        let result = calculate_tiered_contribution(dec("1000"), &zero_based());
        assert_eq!(result.amount, dec("50"));
        assert_eq!(result.audit_step.output["brackets_crossed"], 2);
    }

    #[test]
    fn test_within_first_bracket_pays_minimum() {
        let result = calculate_tiered_contribution(dec("499.99"), &zero_based());
        assert_eq!(result.amount, dec("0"));
    }

    #[test]
    fn test_below_min_compensation() {
        let result = calculate_tiered_contribution(dec("5249.99"), &seeded());
        assert_eq!(result.amount, dec("250"));
        assert!(result.audit_step.reasoning.contains("below minimum"));
    }

    #[test]
    fn test_above_max_compensation() {
        let result = calculate_tiered_contribution(dec("100000"), &seeded());
        assert_eq!(result.amount, dec("1750"));
    }

    #[test]
    fn test_bracket_boundaries() {
        let config = seeded();
        for k in 0..10u32 {
            let salary = config.min_compensation + BRACKET_WIDTH * Decimal::from(k);
            let expected = config.min_contribution + config.contribution_difference * Decimal::from(k);
            assert_eq!(calculate_tiered_contribution(salary, &config).amount, expected);
        }
    }

    #[test]
    fn test_just_below_next_bracket_stays_in_current() {
        let result = calculate_tiered_contribution(dec("6249.99"), &seeded());
        assert_eq!(result.amount, dec("275"));
    }

    #[test]
    fn test_top_of_range_is_capped() {
        // 59 brackets would give 250 + 1475 = 1725, under the cap
        let result = calculate_tiered_contribution(dec("34750"), &seeded());
        assert_eq!(result.amount, dec("1725"));

        let mut config = seeded();
        config.contribution_difference = dec("100");
        let result = calculate_tiered_contribution(dec("34750"), &config);
        assert_eq!(result.amount, dec("1750"));
    }

    #[test]
    fn test_large_range_terminates() {
        let config = TieredContributionConfig {
            min_compensation: dec("0"),
            max_compensation: dec("50000000"),
            min_contribution: dec("0"),
            max_contribution: dec("100000000"),
            contribution_difference: dec("1"),
        };
        let result = calculate_tiered_contribution(dec("49999999"), &config);
        assert_eq!(result.amount, dec("99999"));
    }
}
