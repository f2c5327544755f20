use chrono::NaiveDate;
use core_types::{AlignedPair, Asset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Derived metrics for one asset on one date.
///
/// Fields backed by a trailing window are `None` until the window is full. They are
/// never zero-filled, so "no data yet" and "value is zero" stay distinguishable.
/// Window lengths come from `configuration::Windows` (7/30/30/7+30 by default).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub date: NaiveDate,
    pub asset: Asset,
    pub close: f64,
    pub volume: f64,
    /// Short price moving average (7 rows by default).
    pub ma_short: Option<f64>,
    /// Long price moving average (30 rows by default).
    pub ma_long: Option<f64>,
    /// Annualized sample standard deviation of daily log returns, as a fraction.
    pub volatility: Option<f64>,
    /// Percentage decline from the running all-time high. Always `<= 0`.
    pub drawdown_pct: f64,
    /// Short volume moving average.
    pub volume_ma_short: Option<f64>,
    /// Percentage difference between the short volume MA and the baseline window
    /// immediately preceding it.
    pub volume_trend_pct: Option<f64>,
}

impl MetricRow {
    pub fn ma(&self, kind: MaKind) -> Option<f64> {
        match kind {
            MaKind::Short => self.ma_short,
            MaKind::Long => self.ma_long,
        }
    }
}

/// Rolling correlation of the two assets' daily returns, ending at `date`.
///
/// A row exists only where a full window of aligned returns exists; `corr` is `None`
/// when either side of that window has zero variance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRow {
    pub date: NaiveDate,
    pub corr: Option<f64>,
}

/// Which moving average a summary statistic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaKind {
    Short,
    Long,
}

/// The complete output of one engine run.
///
/// Built from scratch on every run; there is no way to patch an existing report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    pub metrics: BTreeMap<Asset, Vec<MetricRow>>,
    pub aligned: AlignedPair,
    pub correlation: Vec<CorrelationRow>,
}

impl MetricReport {
    /// The metric stream of one asset, ascending by date.
    pub fn rows(&self, asset: Asset) -> &[MetricRow] {
        self.metrics.get(&asset).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn row_at(&self, asset: Asset, date: NaiveDate) -> Option<&MetricRow> {
        let rows = self.rows(asset);
        rows.binary_search_by_key(&date, |row| row.date)
            .ok()
            .map(|index| &rows[index])
    }

    pub fn correlation_at(&self, date: NaiveDate) -> Option<&CorrelationRow> {
        self.correlation
            .binary_search_by_key(&date, |row| row.date)
            .ok()
            .map(|index| &self.correlation[index])
    }

    /// The last `n` metric rows of an asset (fewer if the stream is shorter).
    pub fn tail(&self, asset: Asset, n: usize) -> &[MetricRow] {
        let rows = self.rows(asset);
        &rows[rows.len().saturating_sub(n)..]
    }

    /// The default reference date for summaries: the last aligned date, or the latest
    /// date in either metric stream when the assets share no dates.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.aligned.last_date().or_else(|| {
            self.metrics
                .values()
                .filter_map(|rows| rows.last().map(|row| row.date))
                .max()
        })
    }
}

/// Share of days above one moving average over one lookback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaysAboveMa {
    pub ma: MaKind,
    pub lookback_days: u32,
    /// Percentage in `[0, 100]`; `None` when no day in range has the MA defined.
    pub pct: Option<f64>,
}

/// Point-in-time statistics for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub asset: Asset,
    pub close: Option<f64>,
    pub drawdown_pct: Option<f64>,
    pub volatility: Option<f64>,
    pub volume_trend_pct: Option<f64>,
    pub days_above_ma: Vec<DaysAboveMa>,
}

/// The summary the narrative and dashboard layers report. Recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub reference_date: NaiveDate,
    pub correlation: Option<f64>,
    pub assets: Vec<AssetSnapshot>,
}

impl Snapshot {
    pub fn asset(&self, asset: Asset) -> Option<&AssetSnapshot> {
        self.assets.iter().find(|s| s.asset == asset)
    }
}
