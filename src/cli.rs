use chrono::NaiveDate;
use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;
use mortgage_schedules::{Compounding, ExportPaths, Horizon, MortgageParams, ScheduleError, ScheduleResult};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Generate loan payment schedules and balance plot.
#[derive(Parser, Debug)]
#[command(name = "mortgage-schedules")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Loan principal
    #[arg(long, allow_negative_numbers = true)]
    pub principal: Decimal,

    /// Nominal annual rate as a percentage, e.g. 5.49 for 5.49%
    #[arg(long, allow_negative_numbers = true)]
    pub rate: Decimal,

    /// Amortization period in years
    #[arg(long)]
    pub amort: u32,

    /// Contract term in years
    #[arg(long)]
    pub term: u32,

    /// Output workbook path (.xlsx)
    #[arg(long)]
    pub excel: PathBuf,

    /// Output chart path (.png)
    #[arg(long)]
    pub png: PathBuf,

    /// How often the quoted rate compounds
    #[arg(long, value_enum, default_value_t = CompoundingArg::SemiAnnually)]
    pub compounding: CompoundingArg,

    /// Loan advance date (YYYY-MM-DD). Adds payment dates to every schedule.
    #[arg(long, value_name = "DATE")]
    pub loan_date: Option<String>,

    /// Stop each schedule at the end of the term instead of running to payoff
    #[arg(long)]
    pub term_only: bool,

    /// Create missing output directories
    #[arg(long)]
    pub create_dirs: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompoundingArg {
    Daily,
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
}

impl From<CompoundingArg> for Compounding {
    fn from(arg: CompoundingArg) -> Self {
        match arg {
            CompoundingArg::Daily => Compounding::Daily,
            CompoundingArg::Monthly => Compounding::Monthly,
            CompoundingArg::Quarterly => Compounding::Quarterly,
            CompoundingArg::SemiAnnually => Compounding::SemiAnnually,
            CompoundingArg::Annually => Compounding::Annually,
        }
    }
}

/// Parses a date string in YYYY-MM-DD format.
pub fn parse_date(s: &str) -> ScheduleResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ScheduleError::InvalidDate(s.to_string()))
}

impl Cli {
    pub fn to_params(&self) -> ScheduleResult<MortgageParams> {
        let horizon = if self.term_only {
            Horizon::Term
        } else {
            Horizon::Amortization
        };
        let mut params = MortgageParams::new(self.principal, self.rate, self.amort, self.term)?
            .with_compounding(self.compounding.into())
            .with_horizon(horizon);
        if let Some(ref date) = self.loan_date {
            params = params.with_loan_date(parse_date(date)?);
        }
        Ok(params)
    }

    pub fn export_paths(&self) -> ExportPaths {
        ExportPaths::new(&self.excel, &self.png).with_create_dirs(self.create_dirs)
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
