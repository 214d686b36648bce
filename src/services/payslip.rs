//! Payslip assembly.
//!
//! Combines the rank-derived basic salary, fixed and variable compensations,
//! variable deductions and the statutory deductions into a semi-monthly net
//! figure, and manages the payslip and thirteenth-month pay lifecycles.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::calculation::{compute_deduction, salary_from_rank};
use crate::config::{ConfigurationStore, DeductionKind};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CompensationLine, FixedCompensation, LineItem, PayPeriodHalf, Payslip, PayslipBreakdown,
    PayslipKey, StatutoryDeduction, ThirteenthMonthBreakdown, ThirteenthMonthPay,
};
use crate::repository::{DirectoryRepository, PayrollRepository};

const MP2_LINE: &str = "MP2";

/// Builds and recomputes payslips against one configuration snapshot.
pub struct PayslipAssembler<'a, R> {
    repo: &'a R,
    config: &'a ConfigurationStore,
}

impl<'a, R> PayslipAssembler<'a, R>
where
    R: DirectoryRepository + PayrollRepository,
{
    /// Creates an assembler over a repository and configuration.
    pub fn new(repo: &'a R, config: &'a ConfigurationStore) -> Self {
        Self { repo, config }
    }

    /// Returns the payslip for the period, creating it with the user's
    /// current rank if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RecordNotFound`] for an unknown user.
    pub fn get_or_create_payslip(
        &self,
        user_id: &str,
        month: u32,
        year: i32,
        period: PayPeriodHalf,
    ) -> EngineResult<Payslip> {
        let employee = self.repo.employee(user_id)?;
        let key = PayslipKey {
            user_id: employee.id.clone(),
            month,
            year,
            period,
        };
        Ok(self
            .repo
            .get_or_create_payslip(&key, || Payslip::new(key.clone(), employee.rank.clone())))
    }

    /// Monthly basic salary for a rank under the active minimum wage.
    pub fn monthly_salary(&self, rank: &str) -> EngineResult<Decimal> {
        let wage = self.config.minimum_wage()?.amount;
        salary_from_rank(rank, &self.repo.jobs(), wage, self.config.settings())
    }

    /// Computes the full breakdown of a payslip from current data.
    ///
    /// A payslip without a rank has an empty breakdown.
    pub fn breakdown(&self, payslip: &Payslip) -> EngineResult<PayslipBreakdown> {
        let key = &payslip.key;
        let Some(rank) = payslip.rank.as_deref() else {
            return Ok(PayslipBreakdown {
                period: Some(key.period),
                ..PayslipBreakdown::default()
            });
        };

        let per_cutoff = self.monthly_salary(rank)? / Decimal::TWO;

        let fixed_compensations: Vec<CompensationLine> = self
            .repo
            .fixed_compensations_for(&key.user_id, key.month, key.year)
            .iter()
            .map(|c| CompensationLine {
                name: c.name.clone(),
                amount: c.semi_monthly_amount(),
            })
            .collect();
        let fixed_total: Decimal = fixed_compensations.iter().map(|c| c.amount).sum();
        let variable_compensation_total: Decimal =
            payslip.variable_compensations.iter().map(|c| c.amount).sum();
        let variable_deduction_total: Decimal =
            payslip.variable_deductions.iter().map(|d| d.amount).sum();

        let gross_pay = per_cutoff + fixed_total + variable_compensation_total;

        let deductions = match key.period {
            PayPeriodHalf::First => Vec::new(),
            PayPeriodHalf::Second => self.statutory_deductions(
                &key.user_id,
                gross_pay,
                gross_pay - variable_deduction_total + per_cutoff,
            )?,
        };
        let statutory_total: Decimal = deductions.iter().map(|d| d.amount).sum();
        let total_deductions = statutory_total + variable_deduction_total;

        Ok(PayslipBreakdown {
            period: Some(key.period),
            basic_salary: per_cutoff,
            fixed_compensations,
            variable_compensations: payslip.variable_compensations.clone(),
            gross_pay,
            variable_deductions: payslip.variable_deductions.clone(),
            deductions,
            total_deductions,
            net_salary: gross_pay - total_deductions,
        })
    }

    /// SSS and PhilHealth use the monthly-equivalent `contribution_base`;
    /// tax is withheld on gross pay net of the other contributions.
    fn statutory_deductions(
        &self,
        user_id: &str,
        gross_pay: Decimal,
        contribution_base: Decimal,
    ) -> EngineResult<Vec<StatutoryDeduction>> {
        let deductions = self.config.deductions()?;
        let sss = compute_deduction(DeductionKind::Sss, contribution_base, deductions)?.round_dp(2);
        let philhealth =
            compute_deduction(DeductionKind::Philhealth, contribution_base, deductions)?.round_dp(2);
        let pagibig =
            compute_deduction(DeductionKind::PagIbig, contribution_base, deductions)?.round_dp(2);

        let mp2 = if self.repo.employee(user_id)?.mp2_enrolled {
            Some(self.config.mp2()?.semi_monthly_amount().round_dp(2))
        } else {
            None
        };

        let taxable = gross_pay - (sss + philhealth + pagibig + mp2.unwrap_or(Decimal::ZERO));
        let tax = compute_deduction(DeductionKind::Tax, taxable, deductions)?.round_dp(2);

        let statutory = |kind: DeductionKind, amount: Decimal| StatutoryDeduction {
            kind: Some(kind),
            name: kind.name().to_string(),
            amount,
        };

        let mut lines = vec![
            statutory(DeductionKind::Sss, sss),
            statutory(DeductionKind::Philhealth, philhealth),
            statutory(DeductionKind::PagIbig, pagibig),
        ];
        if let Some(amount) = mp2 {
            lines.push(StatutoryDeduction {
                kind: None,
                name: MP2_LINE.to_string(),
                amount,
            });
        }
        lines.push(statutory(DeductionKind::Tax, tax));
        Ok(lines)
    }

    /// Recomputes and persists the salary and net salary of a payslip.
    ///
    /// Safe to call repeatedly: with unchanged data it stores the same
    /// figures every time.
    pub fn update_salary(&self, payslip_id: Uuid) -> EngineResult<(Payslip, PayslipBreakdown)> {
        let payslip = self.repo.payslip(payslip_id)?;
        let salary = payslip
            .rank
            .as_deref()
            .map(|rank| self.monthly_salary(rank))
            .transpose()?;
        let breakdown = self.breakdown(&payslip)?;

        let net_salary = breakdown.net_salary;
        let updated = self.repo.update_payslip(payslip_id, |p| {
            p.salary = salary;
            p.net_salary = Some(net_salary);
            Ok(p.clone())
        })?;
        Ok((updated, breakdown))
    }

    /// Re-snapshots the user's current rank onto the payslip.
    pub fn update_rank(&self, payslip_id: Uuid) -> EngineResult<Payslip> {
        let payslip = self.repo.payslip(payslip_id)?;
        let rank = self.repo.employee(&payslip.key.user_id)?.rank;
        self.repo.update_payslip(payslip_id, |p| {
            p.rank = rank;
            Ok(p.clone())
        })
    }

    /// Flips the release flag of a payslip.
    pub fn toggle_release(&self, payslip_id: Uuid, now: DateTime<Utc>) -> EngineResult<Payslip> {
        self.repo.update_payslip(payslip_id, |p| {
            p.toggle_release(now);
            Ok(p.clone())
        })
    }

    /// Attaches a variable compensation. Call [`Self::update_salary`] after.
    pub fn add_variable_compensation(
        &self,
        payslip_id: Uuid,
        name: &str,
        amount: Decimal,
    ) -> EngineResult<LineItem> {
        let item = LineItem::new(name, amount);
        self.repo.update_payslip(payslip_id, |p| {
            p.variable_compensations.push(item.clone());
            Ok(item)
        })
    }

    /// Detaches a variable compensation. Call [`Self::update_salary`] after.
    pub fn remove_variable_compensation(&self, payslip_id: Uuid, item_id: Uuid) -> EngineResult<LineItem> {
        self.repo
            .update_payslip(payslip_id, |p| take_line(&mut p.variable_compensations, item_id))
    }

    /// Attaches a variable deduction. Call [`Self::update_salary`] after.
    pub fn add_variable_deduction(
        &self,
        payslip_id: Uuid,
        name: &str,
        amount: Decimal,
    ) -> EngineResult<LineItem> {
        let item = LineItem::new(name, amount);
        self.repo.update_payslip(payslip_id, |p| {
            p.variable_deductions.push(item.clone());
            Ok(item)
        })
    }

    /// Detaches a variable deduction. Call [`Self::update_salary`] after.
    pub fn remove_variable_deduction(&self, payslip_id: Uuid, item_id: Uuid) -> EngineResult<LineItem> {
        self.repo
            .update_payslip(payslip_id, |p| take_line(&mut p.variable_deductions, item_id))
    }

    /// Grants a fixed compensation to `user_ids` for one month.
    pub fn add_fixed_compensation(
        &self,
        name: &str,
        amount: Decimal,
        user_ids: Vec<String>,
        month: u32,
        year: i32,
    ) -> FixedCompensation {
        let compensation = FixedCompensation {
            id: Uuid::new_v4(),
            name: name.to_string(),
            amount,
            user_ids,
            month,
            year,
        };
        self.repo.save_fixed_compensation(compensation.clone());
        compensation
    }

    /// Removes a fixed compensation.
    pub fn remove_fixed_compensation(&self, id: Uuid) -> EngineResult<FixedCompensation> {
        self.repo.delete_fixed_compensation(id)
    }

    /// Creates a thirteenth-month pay record for a user.
    pub fn create_thirteenth_month(
        &self,
        user_id: &str,
        amount: Decimal,
        month: u32,
        year: i32,
    ) -> EngineResult<ThirteenthMonthPay> {
        let employee = self.repo.employee(user_id)?;
        let pay = ThirteenthMonthPay::new(employee.id, amount, month, year);
        self.repo.insert_thirteenth_month(pay.clone());
        Ok(pay)
    }

    /// Replaces the amount of a thirteenth-month pay.
    pub fn update_thirteenth_month_amount(
        &self,
        id: Uuid,
        amount: Decimal,
    ) -> EngineResult<ThirteenthMonthPay> {
        self.repo.update_thirteenth_month(id, |pay| {
            pay.amount = amount;
            Ok(pay.clone())
        })
    }

    /// Attaches a deduction to a thirteenth-month pay.
    pub fn add_thirteenth_month_deduction(
        &self,
        id: Uuid,
        name: &str,
        amount: Decimal,
    ) -> EngineResult<LineItem> {
        let item = LineItem::new(name, amount);
        self.repo.update_thirteenth_month(id, |pay| {
            pay.variable_deductions.push(item.clone());
            Ok(item)
        })
    }

    /// Detaches a deduction from a thirteenth-month pay.
    pub fn remove_thirteenth_month_deduction(&self, id: Uuid, item_id: Uuid) -> EngineResult<LineItem> {
        self.repo
            .update_thirteenth_month(id, |pay| take_line(&mut pay.variable_deductions, item_id))
    }

    /// Flips the release flag of a thirteenth-month pay.
    pub fn toggle_thirteenth_month_release(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> EngineResult<ThirteenthMonthPay> {
        self.repo.update_thirteenth_month(id, |pay| {
            pay.toggle_release(now);
            Ok(pay.clone())
        })
    }

    /// The amount, deductions and net of a thirteenth-month pay.
    pub fn thirteenth_month_breakdown(&self, id: Uuid) -> EngineResult<ThirteenthMonthBreakdown> {
        Ok(self.repo.thirteenth_month(id)?.breakdown())
    }

    /// Removes a thirteenth-month pay record.
    pub fn delete_thirteenth_month(&self, id: Uuid) -> EngineResult<ThirteenthMonthPay> {
        self.repo.delete_thirteenth_month(id)
    }
}

fn take_line(items: &mut Vec<LineItem>, item_id: Uuid) -> EngineResult<LineItem> {
    let index = items
        .iter()
        .position(|item| item.id == item_id)
        .ok_or_else(|| EngineError::not_found("LineItem", item_id))?;
    Ok(items.remove(index))
}
