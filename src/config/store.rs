//! Versioned configuration store.
//!
//! Holds the active deduction configuration, minimum wage and MP2 settings.
//! The active value is always the latest one and every change appends an
//! immutable history entry. Records are never deleted.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

use super::types::{
    DeductionBlock, DeductionConfiguration, DeductionHistoryEntry, MinimumWage, Mp2Config,
    PayrollSettings, WageHistoryEntry,
};

const DEDUCTIONS: &str = "DEDUCTION CONFIGURATION";
const MINIMUM_WAGE: &str = "MINIMUM WAGE";
const MP2: &str = "MP2";

#[derive(Debug, Clone)]
struct DeductionRecord {
    config: DeductionConfiguration,
    history: Vec<DeductionHistoryEntry>,
}

/// Append-only store of payroll configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationStore {
    deductions: Option<DeductionRecord>,
    minimum_wage: Option<MinimumWage>,
    mp2: Option<Mp2Config>,
    settings: PayrollSettings,
}

impl ConfigurationStore {
    /// Creates an empty store; every record must be initialized before use.
    pub fn new(settings: PayrollSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Initializes the deduction configuration.
    pub fn initialize_deductions(
        &mut self,
        config: DeductionConfiguration,
        date: NaiveDate,
    ) -> EngineResult<()> {
        if self.deductions.is_some() {
            return Err(EngineError::AlreadyInitialized {
                name: DEDUCTIONS.to_string(),
            });
        }
        config.validate()?;

        self.deductions = Some(DeductionRecord {
            history: vec![DeductionHistoryEntry {
                date_set: date,
                config: config.clone(),
            }],
            config,
        });
        Ok(())
    }

    /// Initializes the minimum wage.
    pub fn initialize_minimum_wage(&mut self, amount: Decimal, date: NaiveDate) -> EngineResult<()> {
        if self.minimum_wage.is_some() {
            return Err(EngineError::AlreadyInitialized {
                name: MINIMUM_WAGE.to_string(),
            });
        }

        self.minimum_wage = Some(MinimumWage {
            amount,
            history: vec![WageHistoryEntry {
                amount,
                date_set: date,
            }],
        });
        Ok(())
    }

    /// Initializes the MP2 settings.
    pub fn initialize_mp2(&mut self, mp2: Mp2Config) -> EngineResult<()> {
        if self.mp2.is_some() {
            return Err(EngineError::AlreadyInitialized {
                name: MP2.to_string(),
            });
        }
        self.mp2 = Some(mp2);
        Ok(())
    }

    /// Replaces one named block and appends the resulting configuration to history.
    pub fn replace_block(&mut self, block: DeductionBlock, date: NaiveDate) -> EngineResult<()> {
        block.validate()?;

        let record = self
            .deductions
            .as_mut()
            .ok_or_else(|| EngineError::ConfigurationMissing {
                name: DEDUCTIONS.to_string(),
            })?;

        record.config.replace(block);
        record.history.push(DeductionHistoryEntry {
            date_set: date,
            config: record.config.clone(),
        });
        Ok(())
    }

    /// Sets a new minimum wage.
    ///
    /// Submitting the amount already in effect is rejected with
    /// [`EngineError::ValueMismatch`].
    pub fn set_minimum_wage(&mut self, amount: Decimal, date: NaiveDate) -> EngineResult<&MinimumWage> {
        let wage = self
            .minimum_wage
            .as_mut()
            .ok_or_else(|| EngineError::ConfigurationMissing {
                name: MINIMUM_WAGE.to_string(),
            })?;

        if wage.amount == amount {
            return Err(EngineError::ValueMismatch {
                field: "minimum_wage".to_string(),
                value: amount.to_string(),
            });
        }

        wage.amount = amount;
        wage.history.push(WageHistoryEntry {
            amount,
            date_set: date,
        });
        Ok(wage)
    }

    /// Sets the monthly MP2 contribution.
    pub fn set_mp2_amount(&mut self, amount: Decimal) -> EngineResult<&Mp2Config> {
        let mp2 = self.mp2.as_mut().ok_or_else(|| EngineError::ConfigurationMissing {
            name: MP2.to_string(),
        })?;

        if mp2.amount == Some(amount) {
            return Err(EngineError::ValueMismatch {
                field: "mp2_amount".to_string(),
                value: amount.to_string(),
            });
        }
        mp2.amount = Some(amount);
        Ok(mp2)
    }

    /// The active deduction configuration.
    pub fn deductions(&self) -> EngineResult<&DeductionConfiguration> {
        self.deductions
            .as_ref()
            .map(|r| &r.config)
            .ok_or_else(|| EngineError::ConfigurationMissing {
                name: DEDUCTIONS.to_string(),
            })
    }

    /// Every deduction configuration ever in effect, oldest first.
    pub fn deduction_history(&self) -> EngineResult<&[DeductionHistoryEntry]> {
        self.deductions
            .as_ref()
            .map(|r| r.history.as_slice())
            .ok_or_else(|| EngineError::ConfigurationMissing {
                name: DEDUCTIONS.to_string(),
            })
    }

    /// The minimum wage record.
    pub fn minimum_wage(&self) -> EngineResult<&MinimumWage> {
        self.minimum_wage
            .as_ref()
            .ok_or_else(|| EngineError::ConfigurationMissing {
                name: MINIMUM_WAGE.to_string(),
            })
    }

    /// The MP2 settings.
    pub fn mp2(&self) -> EngineResult<&Mp2Config> {
        self.mp2.as_ref().ok_or_else(|| EngineError::ConfigurationMissing {
            name: MP2.to_string(),
        })
    }

    /// The payroll constants.
    pub fn settings(&self) -> &PayrollSettings {
        &self.settings
    }
}
