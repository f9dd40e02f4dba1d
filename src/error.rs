use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Invalid principal: {0}. Must be positive.")]
    InvalidPrincipal(Decimal),

    #[error("Invalid rate: {0}%. Must be greater than 0 and at most 100.")]
    InvalidRate(Decimal),

    #[error("Invalid amortization period: {0} years. Must be between 1 and 100.")]
    InvalidAmortization(u32),

    #[error("Invalid term: {0} years. Must be between 1 and 100.")]
    InvalidTerm(u32),

    #[error("Term of {term} years exceeds the amortization period of {amort} years.")]
    TermExceedsAmortization { term: u32, amort: u32 },

    /// The payment does not cover the first period's interest, so the balance never declines.
    #[error("{plan} payment of ${payment} does not cover first-period interest of ${interest}.")]
    NonAmortizing {
        plan: String,
        payment: Decimal,
        interest: Decimal,
    },

    #[error("Inputs produce an unrepresentable {0}.")]
    Unrepresentable(&'static str),

    #[error("Invalid date: {0}. Use YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Output directory does not exist: {}", .path.display())]
    MissingDirectory { path: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("Failed to render chart {}: {message}", .path.display())]
    Chart { path: PathBuf, message: String },
}

impl ScheduleError {
    /// True for errors caused by the caller's inputs rather than the output files.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ScheduleError::InvalidPrincipal(_)
                | ScheduleError::InvalidRate(_)
                | ScheduleError::InvalidAmortization(_)
                | ScheduleError::InvalidTerm(_)
                | ScheduleError::TermExceedsAmortization { .. }
                | ScheduleError::NonAmortizing { .. }
                | ScheduleError::Unrepresentable(_)
                | ScheduleError::InvalidDate(_)
        )
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
