//! Mortgage amortization schedules for six payment frequencies.

pub mod error;
pub mod export;
pub mod loan;
pub mod plan;

pub use error::{ScheduleError, ScheduleResult};
pub use export::{export_all, BalanceChart, ExportPaths};
pub use loan::{AmortizationRow, Compounding, Horizon, MortgageParams, PmtSchedule};
pub use plan::{build_all, build_schedule, payment_amounts, PaymentPlan, Schedule};
