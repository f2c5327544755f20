use crate::error::AnalyticsError;
use crate::report::{AssetSnapshot, DaysAboveMa, MaKind, MetricReport, MetricRow, Snapshot};
use chrono::{Days, NaiveDate};
use core_types::Asset;

/// Reduces a `MetricReport` to point-in-time statistics at a reference date.
///
/// Holds only a borrow of the report; nothing is cached between calls.
#[derive(Debug, Clone, Copy)]
pub struct Summarizer<'a> {
    report: &'a MetricReport,
    reference: NaiveDate,
}

impl<'a> Summarizer<'a> {
    /// Summarizes at the report's latest date.
    pub fn new(report: &'a MetricReport) -> Result<Self, AnalyticsError> {
        let reference = report.latest_date().ok_or_else(|| {
            AnalyticsError::NotEnoughData("the report contains no dates".to_string())
        })?;
        Ok(Self::at(report, reference))
    }

    /// Summarizes at an explicit reference date.
    pub fn at(report: &'a MetricReport, reference: NaiveDate) -> Self {
        Self { report, reference }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference
    }

    /// Percentage of days in `[reference - lookback_days, reference]` on which the close
    /// was above the chosen moving average.
    ///
    /// Days without a defined MA are left out of both counts. `None` when no day in
    /// range has one.
    pub fn pct_days_above_ma(&self, asset: Asset, ma: MaKind, lookback_days: u32) -> Option<f64> {
        let from = self
            .reference
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        let (above, counted) = self
            .report
            .rows(asset)
            .iter()
            .filter(|row| row.date >= from && row.date <= self.reference)
            .filter_map(|row| row.ma(ma).map(|value| row.close > value))
            .fold((0usize, 0usize), |(above, counted), is_above| {
                (above + usize::from(is_above), counted + 1)
            });

        if counted == 0 {
            return None;
        }
        Some(above as f64 / counted as f64 * 100.0)
    }

    /// The drawdown from the all-time high at the reference date.
    pub fn drawdown_from_peak(&self, asset: Asset) -> Result<f64, AnalyticsError> {
        self.row(asset, "drawdown").map(|row| row.drawdown_pct)
    }

    /// The annualized volatility at the reference date.
    pub fn latest_volatility(&self, asset: Asset) -> Result<f64, AnalyticsError> {
        self.row(asset, "volatility")?
            .volatility
            .ok_or_else(|| self.insufficient(asset, "volatility"))
    }

    /// The rolling correlation at the reference date; `None` when there is no full
    /// window there or the window has zero variance.
    pub fn latest_correlation(&self) -> Option<f64> {
        self.report
            .correlation_at(self.reference)
            .and_then(|row| row.corr)
    }

    /// Like `latest_correlation`, but says why the value is missing.
    pub fn try_latest_correlation(&self) -> Result<f64, AnalyticsError> {
        let row = self.report.correlation_at(self.reference).ok_or_else(|| {
            AnalyticsError::NotEnoughData(format!(
                "no full correlation window ends at {}",
                self.reference
            ))
        })?;
        row.corr.ok_or_else(|| {
            AnalyticsError::UndefinedStatistic(format!(
                "zero-variance correlation window at {}",
                self.reference
            ))
        })
    }

    /// The volume trend at the reference date; `None` while the baseline is incomplete.
    pub fn volume_trend_delta(&self, asset: Asset) -> Option<f64> {
        self.report
            .row_at(asset, self.reference)
            .and_then(|row| row.volume_trend_pct)
    }

    /// Every statistic for both assets, for each lookback, in one value.
    ///
    /// Failing statistics become `None` here; call the individual methods to learn why.
    pub fn snapshot(&self, lookbacks_days: &[u32]) -> Snapshot {
        let assets = Asset::ALL
            .into_iter()
            .map(|asset| {
                let days_above_ma = lookbacks_days
                    .iter()
                    .flat_map(|lookback| {
                        [MaKind::Short, MaKind::Long].map(|ma| DaysAboveMa {
                            ma,
                            lookback_days: *lookback,
                            pct: self.pct_days_above_ma(asset, ma, *lookback),
                        })
                    })
                    .collect();

                AssetSnapshot {
                    asset,
                    close: self.report.row_at(asset, self.reference).map(|row| row.close),
                    drawdown_pct: self.drawdown_from_peak(asset).ok(),
                    volatility: self.latest_volatility(asset).ok(),
                    volume_trend_pct: self.volume_trend_delta(asset),
                    days_above_ma,
                }
            })
            .collect();

        Snapshot {
            reference_date: self.reference,
            correlation: self.latest_correlation(),
            assets,
        }
    }

    fn row(&self, asset: Asset, metric: &'static str) -> Result<&'a MetricRow, AnalyticsError> {
        self.report
            .row_at(asset, self.reference)
            .ok_or_else(|| self.insufficient(asset, metric))
    }

    fn insufficient(&self, asset: Asset, metric: &'static str) -> AnalyticsError {
        AnalyticsError::InsufficientHistory {
            asset,
            date: self.reference,
            metric,
        }
    }
}
