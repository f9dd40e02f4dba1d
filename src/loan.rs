use crate::error::{ScheduleError, ScheduleResult};
use chrono::NaiveDate;
use log::{debug, trace};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

// longer amortizations overflow the annuity factor and the worksheet row limit
pub const MAX_AMORT_YEARS: u32 = 100;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PmtSchedule {
    Weekly,
    Biweekly,
    SemiMonthly,
    Monthly,
}

impl fmt::Display for PmtSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PmtSchedule::Weekly => "weekly",
            PmtSchedule::Biweekly => "bi-weekly",
            PmtSchedule::SemiMonthly => "semi-monthly",
            PmtSchedule::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compounding {
    Daily,
    Monthly,
    Quarterly,
    // Canadian mortgage convention
    #[default]
    SemiAnnually,
    Annually,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Horizon {
    #[default]
    Amortization,
    // stops at the end of the contract term, leaving the renewal balance outstanding
    Term,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MortgageParams {
    pub principal: Decimal,
    /// nominal annual rate in percent (5.49 means 5.49%)
    pub annual_rate: Decimal,
    pub amort_years: u32,
    pub term_years: u32,
    pub compounding: Compounding,
    pub loan_date: Option<NaiveDate>,
    pub horizon: Horizon,
}

impl MortgageParams {
    pub fn new(
        principal: Decimal,
        annual_rate: Decimal,
        amort_years: u32,
        term_years: u32,
    ) -> ScheduleResult<Self> {
        let params = Self {
            principal,
            annual_rate,
            amort_years,
            term_years,
            compounding: Compounding::default(),
            loan_date: None,
            horizon: Horizon::default(),
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_compounding(mut self, compounding: Compounding) -> Self {
        self.compounding = compounding;
        self
    }

    pub fn with_loan_date(mut self, loan_date: NaiveDate) -> Self {
        self.loan_date = Some(loan_date);
        self
    }

    pub fn with_horizon(mut self, horizon: Horizon) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn validate(&self) -> ScheduleResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(ScheduleError::InvalidPrincipal(self.principal));
        }
        if self.annual_rate <= Decimal::ZERO || self.annual_rate > Decimal::ONE_HUNDRED {
            return Err(ScheduleError::InvalidRate(self.annual_rate));
        }
        if self.amort_years == 0 || self.amort_years > MAX_AMORT_YEARS {
            return Err(ScheduleError::InvalidAmortization(self.amort_years));
        }
        if self.term_years == 0 {
            return Err(ScheduleError::InvalidTerm(self.term_years));
        }
        if self.term_years > self.amort_years {
            return Err(ScheduleError::TermExceedsAmortization {
                term: self.term_years,
                amort: self.amort_years,
            });
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmortizationRow {
    pub pmt_number: u32,
    pub pmt_date: Option<NaiveDate>,
    pub begin_balance: Decimal,
    pub pmt_amount: Decimal,
    pub pmt_interest_paid: Decimal,
    pub pmt_principal_paid: Decimal,
    pub pmt_end_balance: Decimal,
}

impl fmt::Display for AmortizationRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pmt number {}", self.pmt_number)?;
        if let Some(date) = self.pmt_date {
            write!(f, ", date {}", date)?;
        }
        write!(
            f,
            ", payment ${:.2}, interest paid ${:.2}, principal paid ${:.2}, ending balance ${:.2}",
            self.pmt_amount, self.pmt_interest_paid, self.pmt_principal_paid, self.pmt_end_balance
        )
    }
}

// half away from zero
pub fn round_cents(amt: Decimal) -> Decimal {
    amt.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn get_compounding_periods(compound_type: Compounding) -> u32 {
    match compound_type {
        Compounding::Daily => 365,
        Compounding::Monthly => 12,
        Compounding::Quarterly => 4,
        Compounding::SemiAnnually => 2,
        Compounding::Annually => 1,
    }
}

pub fn get_pmt_frequency(pmt_schedule: PmtSchedule) -> u32 {
    match pmt_schedule {
        PmtSchedule::Weekly => 52,
        PmtSchedule::Biweekly => 26,
        PmtSchedule::SemiMonthly => 24,
        PmtSchedule::Monthly => 12,
    }
}

// effective rate per payment period, as f64 for the annuity math
fn pmt_rate_f64(annual_rate: Decimal, compound_type: Compounding, pmt_schedule: PmtSchedule) -> f64 {
    let compounding_periods = f64::from(get_compounding_periods(compound_type));
    let pmt_frequency = f64::from(get_pmt_frequency(pmt_schedule));
    let nominal = annual_rate.to_f64().unwrap_or(0.) / 100.;

    (1. + nominal / compounding_periods).powf(compounding_periods / pmt_frequency) - 1.
}

// exact decimal `rate / periods` when payment and compounding frequencies coincide
pub fn periodic_rate(
    annual_rate: Decimal,
    compound_type: Compounding,
    pmt_schedule: PmtSchedule,
) -> ScheduleResult<Decimal> {
    let compounding_periods = get_compounding_periods(compound_type);
    if compounding_periods == get_pmt_frequency(pmt_schedule) {
        return Ok(annual_rate / Decimal::ONE_HUNDRED / Decimal::from(compounding_periods));
    }

    Decimal::from_f64(pmt_rate_f64(annual_rate, compound_type, pmt_schedule))
        .ok_or(ScheduleError::Unrepresentable("periodic rate"))
}

// level annuity payment before rounding to cents
fn annuity_payment(principal: f64, pmt_rate: f64, total_pmts: f64) -> f64 {
    if pmt_rate == 0. {
        return principal / total_pmts;
    }
    let factor = (1. + pmt_rate).powf(total_pmts);
    (principal * pmt_rate * factor) / (factor - 1.)
}

pub fn total_pmts(years: u32, pmt_schedule: PmtSchedule) -> ScheduleResult<u32> {
    years
        .checked_mul(get_pmt_frequency(pmt_schedule))
        .ok_or(ScheduleError::InvalidAmortization(years))
}

// unrounded level payment over the full amortization period
pub(crate) fn exact_pmt_amount(
    params: &MortgageParams,
    pmt_schedule: PmtSchedule,
) -> ScheduleResult<f64> {
    let pmt_rate = pmt_rate_f64(params.annual_rate, params.compounding, pmt_schedule);
    let n_pmts = f64::from(total_pmts(params.amort_years, pmt_schedule)?);
    Ok(annuity_payment(params.principal.to_f64().unwrap_or(0.), pmt_rate, n_pmts))
}

pub(crate) fn to_cents(amt: f64) -> ScheduleResult<Decimal> {
    Decimal::from_f64(amt)
        .map(round_cents)
        .ok_or(ScheduleError::Unrepresentable("payment amount"))
}

pub fn get_pmt_amount(params: &MortgageParams, pmt_schedule: PmtSchedule) -> ScheduleResult<Decimal> {
    let pmt_amount = to_cents(exact_pmt_amount(params, pmt_schedule)?)?;
    debug!("{} level payment {}", pmt_schedule, pmt_amount);
    Ok(pmt_amount)
}

/// Runs the amortization loop for one payment frequency. The last amortization period,
/// or any period where the payment would overshoot, pays exactly the remaining balance
/// plus interest so rounding drift ends up in the final payment.
pub fn add_scheduled_pmts(
    params: &MortgageParams,
    pmt_schedule: PmtSchedule,
    pmt_rate: Decimal,
    pmt_amount: Decimal,
) -> ScheduleResult<Vec<AmortizationRow>> {
    let amort_pmts = total_pmts(params.amort_years, pmt_schedule)?;
    let max_pmts = match params.horizon {
        Horizon::Amortization => amort_pmts,
        Horizon::Term => total_pmts(params.term_years, pmt_schedule)?,
    };

    let mut sched_pmt: Vec<AmortizationRow> = Vec::with_capacity(max_pmts as usize);
    let mut begin_balance = params.principal;
    let mut pmt_date = params.loan_date;

    for pmt_number in 1..=max_pmts {
        if let Some(prev_date) = pmt_date {
            pmt_date = Some(get_next_pmt_date(&prev_date, &pmt_schedule)?);
        }

        let interest = round_cents(begin_balance * pmt_rate);
        let payoff = begin_balance + interest;

        let (pmt_amt, principal_paid) = if pmt_amount >= payoff || pmt_number == amort_pmts {
            (payoff, begin_balance)
        } else if pmt_amount <= interest {
            return Err(ScheduleError::NonAmortizing {
                plan: pmt_schedule.to_string(),
                payment: pmt_amount,
                interest,
            });
        } else {
            (pmt_amount, pmt_amount - interest)
        };
        let end_balance = begin_balance - principal_paid;

        trace!(
            "{} pmt # {}, interest {}, principal {}, end bal {}",
            pmt_schedule,
            pmt_number,
            interest,
            principal_paid,
            end_balance
        );

        sched_pmt.push(AmortizationRow {
            pmt_number,
            pmt_date,
            begin_balance,
            pmt_amount: pmt_amt,
            pmt_interest_paid: interest,
            pmt_principal_paid: principal_paid,
            pmt_end_balance: end_balance,
        });

        if end_balance.is_zero() {
            break;
        }
        begin_balance = end_balance;
    }
    Ok(sched_pmt)
}

// semi-monthly payments are presumed to be made on the 1st and 15th of each month
pub fn get_next_pmt_date(
    &begin_date: &NaiveDate,
    &pmt_schedule: &PmtSchedule,
) -> ScheduleResult<NaiveDate> {
    use chrono::Datelike;

    let day = begin_date.day();
    let mon = begin_date.month();
    let yr = begin_date.year();

    let end_date = match pmt_schedule {
        PmtSchedule::Weekly => begin_date.checked_add_days(chrono::Days::new(7)),
        PmtSchedule::Biweekly => begin_date.checked_add_days(chrono::Days::new(14)),
        PmtSchedule::SemiMonthly => {
            if day < 15 {
                NaiveDate::from_ymd_opt(yr, mon, 15)
            } else if mon == 12 {
                NaiveDate::from_ymd_opt(yr + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(yr, mon + 1, 1)
            }
        }
        PmtSchedule::Monthly => begin_date.checked_add_months(chrono::Months::new(1)),
    };

    end_date.ok_or_else(|| ScheduleError::InvalidDate(begin_date.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{
        add_scheduled_pmts, get_next_pmt_date, get_pmt_amount, periodic_rate, to_cents,
        total_pmts, Compounding, Horizon, MortgageParams, PmtSchedule, MAX_AMORT_YEARS,
    };
    use crate::error::ScheduleError;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use test_log::test;

    fn assignment_params() -> MortgageParams {
        MortgageParams::new(dec!(500000), dec!(5.49), 25, 5).unwrap()
    }

    #[test]
    fn test_validate() {
        assert!(matches!(
            MortgageParams::new(dec!(0), dec!(5), 25, 5),
            Err(ScheduleError::InvalidPrincipal(_))
        ));
        assert!(matches!(
            MortgageParams::new(dec!(100000), dec!(0), 25, 5),
            Err(ScheduleError::InvalidRate(_))
        ));
        assert!(matches!(
            MortgageParams::new(dec!(100000), dec!(-1.5), 25, 5),
            Err(ScheduleError::InvalidRate(_))
        ));
        assert!(matches!(
            MortgageParams::new(dec!(100000), dec!(150), 25, 5),
            Err(ScheduleError::InvalidRate(_))
        ));
        assert!(matches!(
            MortgageParams::new(dec!(100000), dec!(5), 0, 0),
            Err(ScheduleError::InvalidAmortization(0))
        ));
        assert!(matches!(
            MortgageParams::new(dec!(100000), dec!(5), 25, 0),
            Err(ScheduleError::InvalidTerm(0))
        ));
        assert!(matches!(
            MortgageParams::new(dec!(100000), dec!(5), 25, 30),
            Err(ScheduleError::TermExceedsAmortization { term: 30, amort: 25 })
        ));
        assert!(matches!(
            MortgageParams::new(dec!(500000), dec!(5.49), 15000, 5),
            Err(ScheduleError::InvalidAmortization(15000))
        ));
        assert!(matches!(
            MortgageParams::new(dec!(500000), dec!(5.49), 4_000_000_000, 5),
            Err(ScheduleError::InvalidAmortization(4_000_000_000))
        ));
        assert!(MortgageParams::new(dec!(100000), dec!(5), 25, 25).is_ok());
        assert!(MortgageParams::new(dec!(100000), dec!(5), MAX_AMORT_YEARS, 5).is_ok());
    }

    #[test]
    fn test_unrepresentable_amounts() {
        assert!(matches!(
            to_cents(f64::NAN),
            Err(ScheduleError::Unrepresentable(_))
        ));
        assert!(matches!(
            to_cents(f64::INFINITY),
            Err(ScheduleError::Unrepresentable(_))
        ));
        assert!(matches!(
            total_pmts(u32::MAX, PmtSchedule::Weekly),
            Err(ScheduleError::InvalidAmortization(u32::MAX))
        ));
        assert_eq!(total_pmts(MAX_AMORT_YEARS, PmtSchedule::Weekly).unwrap(), 5200);
    }

    #[test]
    fn test_longest_amortization_builds() {
        let params = MortgageParams::new(dec!(500000), dec!(5.49), MAX_AMORT_YEARS, 5).unwrap();
        let rate = periodic_rate(params.annual_rate, params.compounding, PmtSchedule::Weekly).unwrap();
        let pmt = get_pmt_amount(&params, PmtSchedule::Weekly).unwrap();

        let rows = add_scheduled_pmts(&params, PmtSchedule::Weekly, rate, pmt).unwrap();
        assert!(rows.len() > 5190 && rows.len() <= 5200, "{}", rows.len());
        assert_eq!(rows.last().unwrap().pmt_end_balance, Decimal::ZERO);
    }

    #[test]
    fn test_get_next_pmt_date() {
        let mut begin_date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        assert_eq!(
            get_next_pmt_date(&begin_date, &PmtSchedule::Weekly).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 8).unwrap()
        );
        assert_eq!(
            get_next_pmt_date(&begin_date, &PmtSchedule::Biweekly).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()
        );
        assert_eq!(
            get_next_pmt_date(&begin_date, &PmtSchedule::SemiMonthly).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()
        );
        assert_eq!(
            get_next_pmt_date(&begin_date, &PmtSchedule::Monthly).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );

        begin_date = NaiveDate::from_ymd_opt(2023, 12, 15).unwrap();
        assert_eq!(
            get_next_pmt_date(&begin_date, &PmtSchedule::SemiMonthly).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );

        begin_date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        assert_eq!(
            get_next_pmt_date(&begin_date, &PmtSchedule::SemiMonthly).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
        );

        begin_date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            get_next_pmt_date(&begin_date, &PmtSchedule::Monthly).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_periodic_rate() {
        assert_eq!(
            periodic_rate(dec!(5.49), Compounding::Monthly, PmtSchedule::Monthly).unwrap(),
            dec!(0.004575)
        );

        let semi = periodic_rate(dec!(5.49), Compounding::SemiAnnually, PmtSchedule::Monthly).unwrap();
        assert!((semi - dec!(0.0045235344997)).abs() < dec!(0.0000000001));

        // more frequent payments mean a smaller per-period rate
        let weekly = periodic_rate(dec!(5.49), Compounding::SemiAnnually, PmtSchedule::Weekly).unwrap();
        assert!(weekly < semi);
    }

    #[test]
    fn test_get_pmt_amount() {
        let params = MortgageParams::new(dec!(200000), dec!(7), 15, 5).unwrap();

        let cases = [
            (Compounding::Daily, PmtSchedule::Monthly, dec!(1799.87)),
            (Compounding::Monthly, PmtSchedule::Monthly, dec!(1797.66)),
            (Compounding::Quarterly, PmtSchedule::Monthly, dec!(1793.14)),
            (Compounding::SemiAnnually, PmtSchedule::Monthly, dec!(1786.50)),
            (Compounding::Annually, PmtSchedule::Monthly, dec!(1773.70)),
            (Compounding::Monthly, PmtSchedule::Weekly, dec!(413.92)),
            (Compounding::Monthly, PmtSchedule::Biweekly, dec!(828.39)),
            (Compounding::Monthly, PmtSchedule::SemiMonthly, dec!(897.52)),
            (Compounding::SemiAnnually, PmtSchedule::Weekly, dec!(411.36)),
            (Compounding::SemiAnnually, PmtSchedule::Biweekly, dec!(823.27)),
            (Compounding::SemiAnnually, PmtSchedule::SemiMonthly, dec!(891.97)),
        ];
        for (compounding, schedule, expected) in cases {
            let params = params.clone().with_compounding(compounding);
            assert_eq!(
                get_pmt_amount(&params, schedule).unwrap(),
                expected,
                "{:?} / {}",
                compounding,
                schedule
            );
        }
    }

    #[test]
    fn test_monthly_compound_schedule() {
        let params = assignment_params().with_compounding(Compounding::Monthly);
        let rate = periodic_rate(params.annual_rate, params.compounding, PmtSchedule::Monthly).unwrap();
        let pmt = get_pmt_amount(&params, PmtSchedule::Monthly).unwrap();
        assert_eq!(pmt, dec!(3067.45));

        let rows = add_scheduled_pmts(&params, PmtSchedule::Monthly, rate, pmt).unwrap();
        assert_eq!(rows.len(), 300);

        let first = &rows[0];
        assert_eq!(first.pmt_interest_paid, params.principal * rate);
        assert_eq!(first.pmt_interest_paid, dec!(2287.50));
        assert_eq!(first.pmt_principal_paid, dec!(779.95));
        assert_eq!(first.pmt_end_balance, dec!(499220.05));
        assert_eq!(
            first.to_string(),
            "pmt number 1, payment $3067.45, interest paid $2287.50, principal paid $779.95, ending balance $499220.05"
        );

        let last = rows.last().unwrap();
        assert_eq!(last.pmt_number, 300);
        assert_eq!(last.pmt_amount, dec!(3068.93));
        assert_eq!(last.pmt_end_balance, Decimal::ZERO);
    }

    #[test]
    fn test_rows_balance_out() {
        let params = assignment_params();
        for schedule in [
            PmtSchedule::Weekly,
            PmtSchedule::Biweekly,
            PmtSchedule::SemiMonthly,
            PmtSchedule::Monthly,
        ] {
            let rate = periodic_rate(params.annual_rate, params.compounding, schedule).unwrap();
            let pmt = get_pmt_amount(&params, schedule).unwrap();
            let rows = add_scheduled_pmts(&params, schedule, rate, pmt).unwrap();

            let mut prev_balance = params.principal;
            for row in &rows {
                assert_eq!(row.pmt_amount, row.pmt_interest_paid + row.pmt_principal_paid);
                assert_eq!(row.begin_balance, prev_balance);
                assert_eq!(row.pmt_end_balance, prev_balance - row.pmt_principal_paid);
                prev_balance = row.pmt_end_balance;
            }
            assert_eq!(prev_balance, Decimal::ZERO);

            let repaid: Decimal = rows.iter().map(|r| r.pmt_principal_paid).sum();
            assert_eq!(repaid, params.principal);
        }
    }

    #[test]
    fn test_term_horizon() {
        let params = assignment_params()
            .with_compounding(Compounding::Monthly)
            .with_horizon(Horizon::Term);
        let rate = periodic_rate(params.annual_rate, params.compounding, PmtSchedule::Monthly).unwrap();
        let pmt = get_pmt_amount(&params, PmtSchedule::Monthly).unwrap();

        let rows = add_scheduled_pmts(&params, PmtSchedule::Monthly, rate, pmt).unwrap();
        assert_eq!(rows.len(), 60);
        assert_eq!(rows.last().unwrap().pmt_end_balance, dec!(446290.20));
    }

    #[test]
    fn test_dated_schedule() {
        let params =
            assignment_params().with_loan_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let rate = periodic_rate(params.annual_rate, params.compounding, PmtSchedule::Biweekly).unwrap();
        let pmt = get_pmt_amount(&params, PmtSchedule::Biweekly).unwrap();

        let rows = add_scheduled_pmts(&params, PmtSchedule::Biweekly, rate, pmt).unwrap();
        assert_eq!(rows[0].pmt_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(rows[1].pmt_date, NaiveDate::from_ymd_opt(2024, 1, 29));
    }

    #[test]
    fn test_payment_below_interest_is_rejected() {
        let params = assignment_params();
        let rate = periodic_rate(params.annual_rate, params.compounding, PmtSchedule::Monthly).unwrap();

        let err = add_scheduled_pmts(&params, PmtSchedule::Monthly, rate, dec!(1000)).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::NonAmortizing { payment, .. } if payment == dec!(1000)
        ));
    }
}
