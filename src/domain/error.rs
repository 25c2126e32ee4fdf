//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for folioduel.
#[derive(Debug, thiserror::Error)]
pub enum FolioduelError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("quote source error: {reason}")]
    QuoteSource { reason: String },

    #[error("no usable data: {what}")]
    DataUnavailable { what: String },

    #[error("integrity violation in {portfolio}: value {value} on {date} is not a positive number")]
    IntegrityViolation {
        portfolio: String,
        date: NaiveDate,
        value: f64,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&FolioduelError> for std::process::ExitCode {
    fn from(err: &FolioduelError) -> Self {
        let code: u8 = match err {
            FolioduelError::Io(_) => 1,
            FolioduelError::ConfigParse { .. }
            | FolioduelError::ConfigMissing { .. }
            | FolioduelError::ConfigInvalid { .. } => 2,
            FolioduelError::QuoteSource { .. } => 3,
            FolioduelError::IntegrityViolation { .. } => 4,
            FolioduelError::DataUnavailable { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
