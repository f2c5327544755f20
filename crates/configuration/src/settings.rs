use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub windows: Windows,
    pub summary: Summary,
}

/// Window lengths for every rolling metric. All windows count available rows, not
/// calendar days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Windows {
    /// Short price moving average (e.g., 7).
    pub ma_short: usize,
    /// Long price moving average (e.g., 30).
    pub ma_long: usize,
    /// Number of daily log returns in the volatility window.
    pub volatility_window: usize,
    /// Periods per year used to annualize volatility. Crypto trades every day, so 365.
    pub annualization_days: f64,
    /// Short volume moving average.
    pub volume_short: usize,
    /// Length of the baseline volume window that immediately precedes the short one.
    pub volume_baseline: usize,
    /// Number of daily returns in the rolling correlation window.
    pub correlation_window: usize,
}

/// Parameters for the point-in-time snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    /// Calendar-day lookbacks for the "days above MA" statistics.
    pub lookbacks_days: Vec<u32>,
    /// How many trailing rows the recent-data table shows.
    pub recent_rows: usize,
}

impl Default for Windows {
    fn default() -> Self {
        Self {
            ma_short: 7,
            ma_long: 30,
            volatility_window: 30,
            annualization_days: 365.0,
            volume_short: 7,
            volume_baseline: 30,
            correlation_window: 90,
        }
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            lookbacks_days: vec![30, 10],
            recent_rows: 15,
        }
    }
}

impl Config {
    /// Checks that the windows describe a computable pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.windows.validate()?;

        if self.summary.lookbacks_days.is_empty() {
            return Err(ConfigError::ValidationError(
                "summary.lookbacks_days must contain at least one lookback".to_string(),
            ));
        }
        Ok(())
    }
}

impl Windows {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("ma_short", self.ma_short),
            ("ma_long", self.ma_long),
            ("volume_short", self.volume_short),
            ("volume_baseline", self.volume_baseline),
        ];
        if let Some((name, _)) = named.iter().find(|(_, len)| *len == 0) {
            return Err(ConfigError::ValidationError(format!(
                "windows.{name} must be greater than zero"
            )));
        }

        if self.ma_short >= self.ma_long {
            return Err(ConfigError::ValidationError(
                "windows.ma_short must be less than windows.ma_long".to_string(),
            ));
        }

        // A sample standard deviation or correlation needs at least two returns.
        if self.volatility_window < 2 {
            return Err(ConfigError::ValidationError(
                "windows.volatility_window must be at least 2".to_string(),
            ));
        }
        if self.correlation_window < 2 {
            return Err(ConfigError::ValidationError(
                "windows.correlation_window must be at least 2".to_string(),
            ));
        }

        if !self.annualization_days.is_finite() || self.annualization_days <= 0.0 {
            return Err(ConfigError::ValidationError(
                "windows.annualization_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
