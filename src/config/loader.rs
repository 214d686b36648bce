//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for reading the payroll
//! seed files that initialize a [`ConfigurationStore`].

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

use super::store::ConfigurationStore;
use super::types::{DeductionConfiguration, Mp2Config, PayrollSettings};

#[derive(Debug, Deserialize)]
struct MinimumWageSeed {
    amount: Decimal,
}

/// Loads the payroll seed files.
///
/// # Directory Structure
///
/// ```text
/// config/payroll/
/// ├── deductions.yaml    # Named statutory deduction blocks
/// ├── minimum_wage.yaml  # Starting minimum wage
/// ├── mp2.yaml           # MP2 contribution (amount may be omitted)
/// └── settings.yaml      # Optional grade/step constants
/// ```
///
/// # Example
///
/// ```no_run
/// use hris_core::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/payroll")?;
/// let store = loader.into_store(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())?;
/// println!("Minimum wage: {}", store.minimum_wage()?.amount);
/// # Ok::<(), hris_core::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    deductions: DeductionConfiguration,
    minimum_wage: Decimal,
    mp2: Mp2Config,
    settings: PayrollSettings,
}

impl ConfigLoader {
    /// Loads the seed files from the specified directory.
    ///
    /// Returns an error if a required file is missing, contains invalid YAML,
    /// or holds a deduction block or settings that fail validation. `settings.yaml` is
    /// optional and falls back to [`PayrollSettings::default`].
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let deductions = Self::load_yaml::<DeductionConfiguration>(&path.join("deductions.yaml"))?;
        deductions.validate()?;

        let minimum_wage = Self::load_yaml::<MinimumWageSeed>(&path.join("minimum_wage.yaml"))?;
        let mp2 = Self::load_yaml::<Mp2Config>(&path.join("mp2.yaml"))?;

        let settings_path = path.join("settings.yaml");
        let settings = if settings_path.exists() {
            Self::load_yaml::<PayrollSettings>(&settings_path)?
        } else {
            PayrollSettings::default()
        };
        settings.validate()?;

        Ok(Self {
            deductions,
            minimum_wage: minimum_wage.amount,
            mp2,
            settings,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the seeded deduction configuration.
    pub fn deductions(&self) -> &DeductionConfiguration {
        &self.deductions
    }

    /// Returns the seeded minimum wage.
    pub fn minimum_wage(&self) -> Decimal {
        self.minimum_wage
    }

    /// Returns the payroll constants.
    pub fn settings(&self) -> &PayrollSettings {
        &self.settings
    }

    /// Initializes a fresh store from the seed, stamping history with `date`.
    pub fn into_store(self, date: NaiveDate) -> EngineResult<ConfigurationStore> {
        let mut store = ConfigurationStore::new(self.settings);
        store.initialize_deductions(self.deductions, date)?;
        store.initialize_minimum_wage(self.minimum_wage, date)?;
        store.initialize_mp2(self.mp2)?;
        Ok(store)
    }
}
