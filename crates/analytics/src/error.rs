use chrono::NaiveDate;
use core_types::Asset;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Insufficient history for {metric} of {asset} at {date}")]
    InsufficientHistory {
        asset: Asset,
        date: NaiveDate,
        metric: &'static str,
    },

    #[error("Statistic is undefined: {0}")]
    UndefinedStatistic(String),

    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),
}
