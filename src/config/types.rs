//! Configuration types for payroll computation.
//!
//! This module contains the strongly-typed deduction blocks, wage and MP2
//! records, and the payroll constants. They deserialize from the YAML seed
//! files and from JSON API payloads alike.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The statutory deduction kinds the engine knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeductionKind {
    /// Social-security style tiered contribution.
    #[serde(rename = "SSS")]
    Sss,
    /// Health-insurance style capped percentage contribution.
    #[serde(rename = "PHILHEALTH")]
    Philhealth,
    /// Progressive withholding tax.
    #[serde(rename = "TAX")]
    Tax,
    /// Housing fund fixed contribution, split with the employer.
    #[serde(rename = "PAG-IBIG")]
    PagIbig,
}

impl DeductionKind {
    /// All kinds, in the order they appear on a payslip.
    pub const ALL: [DeductionKind; 4] = [
        DeductionKind::Sss,
        DeductionKind::Philhealth,
        DeductionKind::PagIbig,
        DeductionKind::Tax,
    ];

    /// The block name used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            DeductionKind::Sss => "SSS",
            DeductionKind::Philhealth => "PHILHEALTH",
            DeductionKind::Tax => "TAX",
            DeductionKind::PagIbig => "PAG-IBIG",
        }
    }
}

impl fmt::Display for DeductionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of the tiered (social-security style) contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieredContributionConfig {
    /// Salaries below this pay the minimum contribution.
    pub min_compensation: Decimal,
    /// Salaries above this pay the maximum contribution.
    pub max_compensation: Decimal,
    /// Contribution of the lowest bracket.
    pub min_contribution: Decimal,
    /// Contribution ceiling.
    pub max_contribution: Decimal,
    /// Added contribution per 500-wide bracket crossed.
    pub contribution_difference: Decimal,
}

/// Parameters of the capped percentage (health-insurance style) contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CappedPercentageConfig {
    /// Salaries below this pay the minimum contribution.
    pub min_compensation: Decimal,
    /// Salaries above this pay the maximum contribution.
    pub max_compensation: Decimal,
    /// Contribution floor.
    pub min_contribution: Decimal,
    /// Contribution ceiling.
    pub max_contribution: Decimal,
    /// The nominal premium rate in percent; the employee pays half of it.
    pub rate: Decimal,
}

/// Parallel, ascending bracket lists for the progressive tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressiveTaxConfig {
    /// Upper bound of each bracket, ascending.
    pub compensation_range: Vec<Decimal>,
    /// Marginal rate in percent applied above the previous bound.
    pub percentage: Vec<Decimal>,
    /// Tax already due at the previous bound.
    pub base_tax: Vec<Decimal>,
}

/// A single fixed contribution amount shared by employer and employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedContributionConfig {
    /// The total contribution.
    pub amount: Decimal,
}

/// One named block of the deduction configuration.
///
/// Serialized as `{name, data}` so the on-disk format matches the
/// persisted configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data")]
pub enum DeductionBlock {
    /// The SSS block.
    #[serde(rename = "SSS")]
    Sss(TieredContributionConfig),
    /// The PhilHealth block.
    #[serde(rename = "PHILHEALTH")]
    Philhealth(CappedPercentageConfig),
    /// The withholding tax block.
    #[serde(rename = "TAX")]
    Tax(ProgressiveTaxConfig),
    /// The Pag-IBIG block.
    #[serde(rename = "PAG-IBIG")]
    PagIbig(FixedContributionConfig),
}

impl DeductionBlock {
    /// The kind this block configures.
    pub fn kind(&self) -> DeductionKind {
        match self {
            DeductionBlock::Sss(_) => DeductionKind::Sss,
            DeductionBlock::Philhealth(_) => DeductionKind::Philhealth,
            DeductionBlock::Tax(_) => DeductionKind::Tax,
            DeductionBlock::PagIbig(_) => DeductionKind::PagIbig,
        }
    }

    /// Checks the block for values no calculator can work with.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: &str| EngineError::InvalidConfiguration {
            name: self.kind().name().to_string(),
            message: message.to_string(),
        };

        match self {
            DeductionBlock::Sss(c) => {
                if c.min_compensation > c.max_compensation {
                    return Err(invalid("min_compensation exceeds max_compensation"));
                }
                if c.min_contribution > c.max_contribution {
                    return Err(invalid("min_contribution exceeds max_contribution"));
                }
                if c.contribution_difference.is_sign_negative() {
                    return Err(invalid("contribution_difference must not be negative"));
                }
            }
            DeductionBlock::Philhealth(c) => {
                if c.min_compensation > c.max_compensation {
                    return Err(invalid("min_compensation exceeds max_compensation"));
                }
                if c.min_contribution > c.max_contribution {
                    return Err(invalid("min_contribution exceeds max_contribution"));
                }
                if c.rate.is_sign_negative() {
                    return Err(invalid("rate must not be negative"));
                }
            }
            DeductionBlock::Tax(c) => {
                if c.compensation_range.is_empty() {
                    return Err(invalid("compensation_range is empty"));
                }
                if c.compensation_range.len() != c.percentage.len()
                    || c.compensation_range.len() != c.base_tax.len()
                {
                    return Err(invalid(
                        "compensation_range, percentage and base_tax differ in length",
                    ));
                }
                if c.compensation_range.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(invalid("compensation_range must be strictly ascending"));
                }
            }
            DeductionBlock::PagIbig(c) => {
                if c.amount.is_sign_negative() {
                    return Err(invalid("amount must not be negative"));
                }
            }
        }
        Ok(())
    }
}

/// The full set of deduction blocks, at most one per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeductionConfiguration {
    blocks: Vec<DeductionBlock>,
}

impl DeductionConfiguration {
    /// Builds a configuration, keeping the last block given for each kind.
    pub fn new(blocks: Vec<DeductionBlock>) -> Self {
        let mut config = Self::default();
        for block in blocks {
            config.replace(block);
        }
        config
    }

    /// Returns all blocks.
    pub fn blocks(&self) -> &[DeductionBlock] {
        &self.blocks
    }

    /// Returns the block for `kind`, if configured.
    pub fn get(&self, kind: DeductionKind) -> Option<&DeductionBlock> {
        self.blocks.iter().find(|b| b.kind() == kind)
    }

    /// Replaces the block of the same kind, or appends it.
    pub fn replace(&mut self, block: DeductionBlock) {
        match self.blocks.iter_mut().find(|b| b.kind() == block.kind()) {
            Some(existing) => *existing = block,
            None => self.blocks.push(block),
        }
    }

    /// Validates every block.
    pub fn validate(&self) -> EngineResult<()> {
        self.blocks.iter().try_for_each(DeductionBlock::validate)
    }

    /// The SSS block.
    pub fn sss(&self) -> EngineResult<&TieredContributionConfig> {
        match self.get(DeductionKind::Sss) {
            Some(DeductionBlock::Sss(c)) => Ok(c),
            _ => Err(missing(DeductionKind::Sss)),
        }
    }

    /// The PhilHealth block.
    pub fn philhealth(&self) -> EngineResult<&CappedPercentageConfig> {
        match self.get(DeductionKind::Philhealth) {
            Some(DeductionBlock::Philhealth(c)) => Ok(c),
            _ => Err(missing(DeductionKind::Philhealth)),
        }
    }

    /// The tax block.
    pub fn tax(&self) -> EngineResult<&ProgressiveTaxConfig> {
        match self.get(DeductionKind::Tax) {
            Some(DeductionBlock::Tax(c)) => Ok(c),
            _ => Err(missing(DeductionKind::Tax)),
        }
    }

    /// The Pag-IBIG block.
    pub fn pagibig(&self) -> EngineResult<&FixedContributionConfig> {
        match self.get(DeductionKind::PagIbig) {
            Some(DeductionBlock::PagIbig(c)) => Ok(c),
            _ => Err(missing(DeductionKind::PagIbig)),
        }
    }
}

fn missing(kind: DeductionKind) -> EngineError {
    EngineError::ConfigurationMissing {
        name: kind.name().to_string(),
    }
}

/// A deduction configuration snapshot recorded in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionHistoryEntry {
    /// The date the snapshot took effect.
    pub date_set: NaiveDate,
    /// The full configuration at that date.
    pub config: DeductionConfiguration,
}

/// A minimum wage amount recorded in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WageHistoryEntry {
    /// The amount that was set.
    pub amount: Decimal,
    /// The date it was set.
    pub date_set: NaiveDate,
}

/// The current minimum wage with its change log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumWage {
    /// The amount in effect.
    pub amount: Decimal,
    /// Every amount ever set, oldest first.
    pub history: Vec<WageHistoryEntry>,
}

/// MP2 voluntary savings contribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mp2Config {
    /// Monthly contribution; unset until configured by HR.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl Mp2Config {
    /// The per-cutoff share of the monthly contribution.
    pub fn semi_monthly_amount(&self) -> Decimal {
        self.amount
            .map(|a| a / Decimal::TWO)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Fixed payroll constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSettings {
    /// Factor between consecutive salary grades.
    #[serde(default = "default_grade_multiplier")]
    pub grade_multiplier: Decimal,
    /// Factor between consecutive steps within a grade.
    #[serde(default = "default_step_multiplier")]
    pub step_multiplier: Decimal,
    /// Number of steps per grade.
    #[serde(default = "default_steps")]
    pub steps: u32,
    /// Number of ranks per job.
    #[serde(default = "default_max_job_rank")]
    pub max_job_rank: u32,
}

fn default_grade_multiplier() -> Decimal {
    Decimal::new(108, 2)
}

fn default_step_multiplier() -> Decimal {
    Decimal::new(102, 2)
}

fn default_steps() -> u32 {
    8
}

fn default_max_job_rank() -> u32 {
    3
}

/// Most steps a grade may have.
pub const MAX_GRADE_STEPS: u32 = 64;

/// Most ranks a job may have.
pub const MAX_JOB_RANK: u32 = 100;

impl PayrollSettings {
    /// Rejects multipliers that do not grow salaries and out-of-range counts.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidConfiguration {
            name: "SETTINGS".to_string(),
            message,
        };

        if self.grade_multiplier <= Decimal::ONE {
            return Err(invalid("grade_multiplier must be greater than 1".to_string()));
        }
        if self.step_multiplier <= Decimal::ZERO {
            return Err(invalid("step_multiplier must be positive".to_string()));
        }
        if !(1..=MAX_GRADE_STEPS).contains(&self.steps) {
            return Err(invalid(format!("steps must be between 1 and {}", MAX_GRADE_STEPS)));
        }
        if !(1..=MAX_JOB_RANK).contains(&self.max_job_rank) {
            return Err(invalid(format!("max_job_rank must be between 1 and {}", MAX_JOB_RANK)));
        }
        Ok(())
    }
}

impl Default for PayrollSettings {
    fn default() -> Self {
        Self {
            grade_multiplier: default_grade_multiplier(),
            step_multiplier: default_step_multiplier(),
            steps: default_steps(),
            max_job_rank: default_max_job_rank(),
        }
    }
}
