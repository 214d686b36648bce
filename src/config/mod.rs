//! Payroll configuration: seed loading and the versioned configuration store.
//!
//! Deduction parameters, the minimum wage and MP2 settings are seeded from
//! YAML files and then live in a [`ConfigurationStore`] whose changes append
//! to an immutable history.
//!
//! # Example
//!
//! ```no_run
//! use hris_core::config::ConfigLoader;
//! use chrono::NaiveDate;
//!
//! let store = ConfigLoader::load("./config/payroll")
//!     .unwrap()
//!     .into_store(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
//!     .unwrap();
//! println!("SSS: {:?}", store.deductions().unwrap().sss());
//! ```

mod loader;
mod store;
mod types;

pub use loader::ConfigLoader;
pub use store::ConfigurationStore;
pub use types::{
    CappedPercentageConfig, DeductionBlock, DeductionConfiguration, DeductionHistoryEntry,
    DeductionKind, FixedContributionConfig, MAX_GRADE_STEPS, MAX_JOB_RANK, MinimumWage, Mp2Config,
    PayrollSettings, ProgressiveTaxConfig, TieredContributionConfig, WageHistoryEntry,
};
