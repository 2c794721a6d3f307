use thiserror::Error;

use crate::StripReport;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("Forward curve provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("No curve data: {0}")]
    NoCurveData(String),

    #[error("No data found for the selected date range and location")]
    NoData,

    /// The run was stopped by its caller. Rows gathered before the stop are
    /// kept in `partial`.
    #[error("Calculation cancelled after {} trade dates", .partial.data.len())]
    Cancelled { partial: Box<StripReport> },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Expected per-day failures: the provider is down or published nothing.
    /// A batch skips every failed day, but logs anything else as an error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ProviderUnavailable(_) | Error::NoCurveData(_) | Error::Http(_) | Error::Json(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_day_errors_are_recoverable() {
        assert!(Error::ProviderUnavailable("timeout".into()).is_recoverable());
        assert!(Error::NoCurveData("weekend".into()).is_recoverable());
        assert!(Error::Http("connection reset".into()).is_recoverable());
    }

    #[test]
    fn batch_level_errors_are_fatal() {
        assert!(!Error::InvalidDate("2025-13-01".into()).is_recoverable());
        assert!(!Error::NoData.is_recoverable());
        assert!(!Error::InvalidRequest("num_strips must be >= 1".into()).is_recoverable());
    }
}
