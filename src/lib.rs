//! Payroll, leave approval and attendance core for an HRIS.
//!
//! This crate computes statutory payroll deductions (tiered social security,
//! capped-percentage health insurance, progressive withholding tax and the
//! fixed Pag-IBIG split), salary grades and payslips; routes leave and
//! overtime requests through their approval chains; and schedules shifts and
//! reconciles biometric punches against them.

#![warn(missing_docs)]

pub mod api;
pub mod attendance;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
