use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid observation for {date}: {reason}")]
    InvalidObservation { date: String, reason: String },

    #[error("Unknown asset '{0}'")]
    UnknownAsset(String),
}

impl CoreError {
    pub(crate) fn invalid(date: NaiveDate, reason: impl Into<String>) -> Self {
        CoreError::InvalidObservation {
            date: date.to_string(),
            reason: reason.into(),
        }
    }
}
