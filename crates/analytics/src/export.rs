use crate::report::MetricReport;
use chrono::NaiveDate;
use core_types::Asset;
use serde::{Deserialize, Serialize};

/// One line of the downloadable table: every metric of one asset on one date, plus the
/// pair's correlation on that date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub date: NaiveDate,
    pub asset: Asset,
    pub close: f64,
    pub volume: f64,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
    pub volatility: Option<f64>,
    pub drawdown_pct: f64,
    pub volume_ma_short: Option<f64>,
    pub volume_trend_pct: Option<f64>,
    pub corr: Option<f64>,
}

/// Flattens a report into rows keyed by (date, asset), sorted by date then asset.
pub fn flatten(report: &MetricReport) -> Vec<ExportRow> {
    let mut rows: Vec<ExportRow> = report
        .metrics
        .values()
        .flatten()
        .map(|row| ExportRow {
            date: row.date,
            asset: row.asset,
            close: row.close,
            volume: row.volume,
            ma_short: row.ma_short,
            ma_long: row.ma_long,
            volatility: row.volatility,
            drawdown_pct: row.drawdown_pct,
            volume_ma_short: row.volume_ma_short,
            volume_trend_pct: row.volume_trend_pct,
            corr: report.correlation_at(row.date).and_then(|c| c.corr),
        })
        .collect();

    rows.sort_by_key(|row| (row.date, row.asset));
    rows
}
