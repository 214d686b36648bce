//! Payslip, compensation and thirteenth-month pay models.
//!
//! Payslips are semi-monthly and keyed by (user, month, year, half). Their
//! variable line items are child records; fixed compensations are shared
//! across users for a month/year.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DeductionKind;

/// Which half of the month a payslip covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayPeriodHalf {
    /// Days 1–15; only variable deductions apply.
    #[serde(rename = "1ST")]
    First,
    /// Days 16–end; statutory deductions apply.
    #[serde(rename = "2ND")]
    Second,
}

/// The identity of a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayslipKey {
    /// The user the payslip belongs to.
    pub user_id: String,
    /// Calendar month, 1–12.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// The pay-period half.
    pub period: PayPeriodHalf,
}

/// A named amount attached to one payslip or thirteenth-month pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique identifier.
    pub id: Uuid,
    /// Name shown on the payslip.
    pub name: String,
    /// The amount.
    pub amount: Decimal,
}

impl LineItem {
    /// Creates a line item with a fresh id.
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            amount,
        }
    }
}

/// A compensation granted to a set of users for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedCompensation {
    /// Unique identifier.
    pub id: Uuid,
    /// Name shown on the payslip.
    pub name: String,
    /// Monthly amount.
    pub amount: Decimal,
    /// The users receiving it.
    pub user_ids: Vec<String>,
    /// Calendar month, 1–12.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
}

impl FixedCompensation {
    /// The per-cutoff share of the monthly amount.
    pub fn semi_monthly_amount(&self) -> Decimal {
        self.amount / Decimal::TWO
    }

    /// Whether this compensation applies to `user_id` in the given month.
    pub fn applies_to(&self, user_id: &str, month: u32, year: i32) -> bool {
        self.month == month && self.year == year && self.user_ids.iter().any(|u| u == user_id)
    }
}

/// A semi-monthly payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// Unique identifier.
    pub id: Uuid,
    /// The payslip identity.
    pub key: PayslipKey,
    /// The user's rank when the payslip was created (or last re-snapshotted).
    pub rank: Option<String>,
    /// Monthly basic salary resolved from the rank at the last recomputation.
    pub salary: Option<Decimal>,
    /// Net salary at the last recomputation.
    pub net_salary: Option<Decimal>,
    /// Whether the payslip is released for payment.
    pub released: bool,
    /// Set only while released.
    pub release_date: Option<DateTime<Utc>>,
    /// Payslip-scoped compensations.
    #[serde(default)]
    pub variable_compensations: Vec<LineItem>,
    /// Payslip-scoped deductions.
    #[serde(default)]
    pub variable_deductions: Vec<LineItem>,
}

impl Payslip {
    /// Creates an unreleased payslip snapshotting `rank`.
    pub fn new(key: PayslipKey, rank: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            rank,
            salary: None,
            net_salary: None,
            released: false,
            release_date: None,
            variable_compensations: Vec::new(),
            variable_deductions: Vec::new(),
        }
    }

    /// Flips the release flag, stamping or clearing the release date.
    pub fn toggle_release(&mut self, now: DateTime<Utc>) {
        self.released = !self.released;
        self.release_date = self.released.then_some(now);
    }
}

/// One statutory deduction on a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryDeduction {
    /// The deduction kind, or `None` for MP2.
    pub kind: Option<DeductionKind>,
    /// Display name.
    pub name: String,
    /// Amount deducted.
    pub amount: Decimal,
}

/// A fixed compensation as it appears on one payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationLine {
    /// Display name.
    pub name: String,
    /// The per-cutoff amount.
    pub amount: Decimal,
}

/// The net-salary read model of a payslip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipBreakdown {
    /// The half of the month this breakdown covers.
    pub period: Option<PayPeriodHalf>,
    /// Basic salary for the cutoff (half the monthly basic).
    pub basic_salary: Decimal,
    /// Fixed compensations at their per-cutoff amount.
    pub fixed_compensations: Vec<CompensationLine>,
    /// Payslip-scoped compensations.
    pub variable_compensations: Vec<LineItem>,
    /// Basic salary plus all compensations.
    pub gross_pay: Decimal,
    /// Payslip-scoped deductions.
    pub variable_deductions: Vec<LineItem>,
    /// Statutory deductions; empty on the first half.
    pub deductions: Vec<StatutoryDeduction>,
    /// Everything deducted.
    pub total_deductions: Decimal,
    /// Gross pay minus total deductions.
    pub net_salary: Decimal,
}

/// A thirteenth-month pay record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirteenthMonthPay {
    /// Unique identifier.
    pub id: Uuid,
    /// The user it is paid to.
    pub user_id: String,
    /// Gross amount.
    pub amount: Decimal,
    /// Calendar month of payment.
    pub month: u32,
    /// Calendar year of payment.
    pub year: i32,
    /// Whether it is released for payment.
    pub released: bool,
    /// Set only while released.
    pub release_date: Option<DateTime<Utc>>,
    /// Deductions taken from the amount.
    #[serde(default)]
    pub variable_deductions: Vec<LineItem>,
}

impl ThirteenthMonthPay {
    /// Creates an unreleased record.
    pub fn new(user_id: impl Into<String>, amount: Decimal, month: u32, year: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            amount,
            month,
            year,
            released: false,
            release_date: None,
            variable_deductions: Vec::new(),
        }
    }

    /// Flips the release flag, stamping or clearing the release date.
    pub fn toggle_release(&mut self, now: DateTime<Utc>) {
        self.released = !self.released;
        self.release_date = self.released.then_some(now);
    }

    /// Sum of all variable deductions.
    pub fn total_deductions(&self) -> Decimal {
        self.variable_deductions.iter().map(|d| d.amount).sum()
    }

    /// The amount, its deductions and the net.
    pub fn breakdown(&self) -> ThirteenthMonthBreakdown {
        let total_deductions = self.total_deductions();
        ThirteenthMonthBreakdown {
            amount: self.amount,
            deductions: self.variable_deductions.clone(),
            total_deductions,
            net_salary: self.amount - total_deductions,
        }
    }
}

/// Read model of a thirteenth-month pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirteenthMonthBreakdown {
    /// Gross amount.
    pub amount: Decimal,
    /// Deductions taken from it.
    pub deductions: Vec<LineItem>,
    /// Sum of deductions.
    pub total_deductions: Decimal,
    /// Amount minus deductions.
    pub net_salary: Decimal,
}
