use crate::error::{ScheduleError, ScheduleResult};
use crate::loan::{
    add_scheduled_pmts, exact_pmt_amount, get_pmt_amount, get_pmt_frequency, periodic_rate,
    to_cents, AmortizationRow, MortgageParams, PmtSchedule,
};
use log::info;
use rust_decimal::Decimal;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaymentPlan {
    Monthly,
    SemiMonthly,
    BiWeekly,
    Weekly,
    RapidBiWeekly,
    RapidWeekly,
}

impl PaymentPlan {
    // export order
    pub const ALL: [PaymentPlan; 6] = [
        PaymentPlan::Monthly,
        PaymentPlan::SemiMonthly,
        PaymentPlan::BiWeekly,
        PaymentPlan::Weekly,
        PaymentPlan::RapidBiWeekly,
        PaymentPlan::RapidWeekly,
    ];

    pub fn pmt_schedule(self) -> PmtSchedule {
        match self {
            PaymentPlan::Monthly => PmtSchedule::Monthly,
            PaymentPlan::SemiMonthly => PmtSchedule::SemiMonthly,
            PaymentPlan::BiWeekly | PaymentPlan::RapidBiWeekly => PmtSchedule::Biweekly,
            PaymentPlan::Weekly | PaymentPlan::RapidWeekly => PmtSchedule::Weekly,
        }
    }

    /// Used as the worksheet name and the chart legend entry.
    pub fn label(self) -> &'static str {
        match self {
            PaymentPlan::Monthly => "Monthly",
            PaymentPlan::SemiMonthly => "Semi-monthly",
            PaymentPlan::BiWeekly => "Bi-weekly",
            PaymentPlan::Weekly => "Weekly",
            PaymentPlan::RapidBiWeekly => "Rapid Bi-weekly",
            PaymentPlan::RapidWeekly => "Rapid Weekly",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            PaymentPlan::Monthly => "monthly",
            PaymentPlan::SemiMonthly => "semi_monthly",
            PaymentPlan::BiWeekly => "bi_weekly",
            PaymentPlan::Weekly => "weekly",
            PaymentPlan::RapidBiWeekly => "rapid_biweekly",
            PaymentPlan::RapidWeekly => "rapid_weekly",
        }
    }

    pub fn payments_per_year(self) -> u32 {
        get_pmt_frequency(self.pmt_schedule())
    }

    // rapid plans split the monthly payment instead of amortizing at their own frequency
    fn monthly_divisor(self) -> Option<f64> {
        match self {
            PaymentPlan::RapidBiWeekly => Some(2.),
            PaymentPlan::RapidWeekly => Some(4.),
            _ => None,
        }
    }

    pub fn pmt_amount(self, params: &MortgageParams) -> ScheduleResult<Decimal> {
        match self.monthly_divisor() {
            Some(divisor) => {
                let monthly = exact_pmt_amount(params, PmtSchedule::Monthly)?;
                to_cents(monthly / divisor)
            }
            None => get_pmt_amount(params, self.pmt_schedule()),
        }
    }
}

impl fmt::Display for PaymentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    pub plan: PaymentPlan,
    pub pmt_rate: Decimal,
    pub pmt_amount: Decimal,
    pub principal: Decimal,
    pub term_years: u32,
    pub rows: Vec<AmortizationRow>,
}

impl Schedule {
    pub fn get_pmt_count(&self) -> usize {
        self.rows.len()
    }

    pub fn total_interest(&self) -> Decimal {
        self.rows.iter().map(|r| r.pmt_interest_paid).sum()
    }

    pub fn total_principal(&self) -> Decimal {
        self.rows.iter().map(|r| r.pmt_principal_paid).sum()
    }

    pub fn total_paid(&self) -> Decimal {
        self.rows.iter().map(|r| r.pmt_amount).sum()
    }

    pub fn final_balance(&self) -> Decimal {
        self.rows
            .last()
            .map(|r| r.pmt_end_balance)
            .unwrap_or(self.principal)
    }

    /// Balance outstanding when the contract term ends (zero if repaid earlier).
    pub fn term_end_balance(&self) -> Decimal {
        let term_row = self
            .term_years
            .checked_mul(self.plan.payments_per_year())
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| self.rows.get(idx as usize));
        match term_row {
            Some(row) => row.pmt_end_balance,
            None => self.final_balance(),
        }
    }

    // period 0 carries the principal
    pub fn balances(&self) -> Vec<(u32, Decimal)> {
        std::iter::once((0, self.principal))
            .chain(self.rows.iter().map(|r| (r.pmt_number, r.pmt_end_balance)))
            .collect()
    }
}

pub fn build_schedule(params: &MortgageParams, plan: PaymentPlan) -> ScheduleResult<Schedule> {
    params.validate()?;
    let pmt_schedule = plan.pmt_schedule();
    let pmt_rate = periodic_rate(params.annual_rate, params.compounding, pmt_schedule)?;
    let pmt_amount = plan.pmt_amount(params)?;

    let rows = add_scheduled_pmts(params, pmt_schedule, pmt_rate, pmt_amount).map_err(
        |err| match err {
            ScheduleError::NonAmortizing {
                payment, interest, ..
            } => ScheduleError::NonAmortizing {
                plan: plan.label().to_string(),
                payment,
                interest,
            },
            other => other,
        },
    )?;

    let schedule = Schedule {
        plan,
        pmt_rate,
        pmt_amount,
        principal: params.principal,
        term_years: params.term_years,
        rows,
    };
    info!(
        "{}: {} payments of ${}, total interest ${}, balance at term end ${}",
        plan,
        schedule.get_pmt_count(),
        pmt_amount,
        schedule.total_interest(),
        schedule.term_end_balance()
    );
    Ok(schedule)
}

pub fn build_all(params: &MortgageParams) -> ScheduleResult<Vec<Schedule>> {
    PaymentPlan::ALL
        .iter()
        .map(|&plan| build_schedule(params, plan))
        .collect()
}

pub fn payment_amounts(params: &MortgageParams) -> ScheduleResult<Vec<(PaymentPlan, Decimal)>> {
    PaymentPlan::ALL
        .iter()
        .map(|&plan| plan.pmt_amount(params).map(|amt| (plan, amt)))
        .collect()
}
