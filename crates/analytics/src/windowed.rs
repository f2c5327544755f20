use crate::report::MetricRow;
use crate::stats::{log_returns, mean, sample_std_dev, trailing};
use configuration::Windows;
use core_types::AssetSeries;

/// A stateless calculator for the single-asset rolling metrics.
///
/// Windows are counted in available rows: a missing calendar day is simply not part of
/// the series, so a 7-row window that spans a gap reaches one row further back in time.
#[derive(Debug, Clone)]
pub struct WindowedMetrics {
    windows: Windows,
}

impl WindowedMetrics {
    pub fn new(windows: Windows) -> Self {
        Self { windows }
    }

    /// Computes one `MetricRow` per observation in the series.
    pub fn compute(&self, series: &AssetSeries) -> Vec<MetricRow> {
        let closes = series.closes();
        let volumes = series.volumes();
        let returns = log_returns(&closes);
        let annualization = self.windows.annualization_days.sqrt();

        let mut running_max = f64::MIN;
        let mut rows = Vec::with_capacity(closes.len());

        for (i, observation) in series.observations().iter().enumerate() {
            // Peak-to-date over the whole history, not a window.
            running_max = running_max.max(observation.close);
            let drawdown_pct = (observation.close - running_max) / running_max * 100.0;

            rows.push(MetricRow {
                date: observation.date,
                asset: series.asset(),
                close: observation.close,
                volume: observation.volume,
                ma_short: trailing(&closes, i, self.windows.ma_short).and_then(mean),
                ma_long: trailing(&closes, i, self.windows.ma_long).and_then(mean),
                volatility: self.volatility(&returns, i).map(|sd| sd * annualization),
                drawdown_pct,
                volume_ma_short: trailing(&volumes, i, self.windows.volume_short).and_then(mean),
                volume_trend_pct: self.volume_trend(&volumes, i),
            });
        }

        tracing::debug!(asset = %series.asset(), rows = rows.len(), "Windowed metrics computed.");
        rows
    }

    /// Sample standard deviation of the trailing log returns ending at price index `i`.
    /// Return `k` spans prices `k` and `k + 1`, so price `i` closes return `i - 1`.
    fn volatility(&self, returns: &[f64], i: usize) -> Option<f64> {
        let end = i.checked_sub(1)?;
        trailing(returns, end, self.windows.volatility_window).and_then(sample_std_dev)
    }

    /// Short volume MA against the baseline window that ends just before it.
    fn volume_trend(&self, volumes: &[f64], i: usize) -> Option<f64> {
        let short = trailing(volumes, i, self.windows.volume_short).and_then(mean)?;
        let baseline_end = i.checked_sub(self.windows.volume_short)?;
        let baseline =
            trailing(volumes, baseline_end, self.windows.volume_baseline).and_then(mean)?;

        // An all-zero baseline has no meaningful percentage change.
        if baseline <= 0.0 {
            return None;
        }
        Some((short - baseline) / baseline * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use core_types::{Asset, Observation};

    const EPS: f64 = 1e-9;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn daily(closes: &[f64], volumes: &[f64]) -> AssetSeries {
        AssetSeries::from_observations(
            Asset::Btc,
            closes.iter().zip(volumes).enumerate().map(|(i, (c, v))| {
                Observation::new(start() + Duration::days(i as i64), *c, *v).unwrap()
            }),
        )
        .unwrap()
    }

    fn metrics() -> WindowedMetrics {
        WindowedMetrics::new(Windows::default())
    }

    #[test]
    fn constant_price_has_flat_averages_and_zero_risk() {
        let series = daily(&[100.0; 31], &[5.0; 31]);
        let rows = metrics().compute(&series);

        assert_eq!(rows.len(), 31);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.drawdown_pct, 0.0);
            assert_eq!(row.ma_short.is_some(), i >= 6);
            assert_eq!(row.ma_long.is_some(), i >= 29);
            assert_eq!(row.volatility.is_some(), i >= 30);
            if let Some(ma) = row.ma_short {
                assert!((ma - 100.0).abs() < EPS);
            }
            if let Some(ma) = row.ma_long {
                assert!((ma - 100.0).abs() < EPS);
            }
        }
        assert_eq!(rows[30].volatility, Some(0.0));
    }

    #[test]
    fn moving_averages_match_the_literal_window() {
        let closes: Vec<f64> = (1..=40).map(|v| v as f64).collect();
        let rows = metrics().compute(&daily(&closes, &[1.0; 40]));

        // Mean of 4..=10 and 1..=30.
        assert!((rows[9].ma_short.unwrap() - 7.0).abs() < EPS);
        assert!((rows[29].ma_long.unwrap() - 15.5).abs() < EPS);
        assert!((rows[39].ma_long.unwrap() - 25.5).abs() < EPS);
        assert_eq!(rows[5].ma_short, None);
        assert_eq!(rows[28].ma_long, None);
    }

    #[test]
    fn volatility_is_annualized_sample_std_of_log_returns() {
        // Alternate +10% / -10% moves so the log returns are not constant.
        let mut closes = vec![100.0];
        for i in 0..30 {
            let last = *closes.last().unwrap();
            closes.push(if i % 2 == 0 { last * 1.1 } else { last * 0.9 });
        }
        let rows = metrics().compute(&daily(&closes, &[1.0; 31]));

        let returns: Vec<f64> = closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
        let mean = returns.iter().sum::<f64>() / 30.0;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 29.0;
        let expected = var.sqrt() * 365f64.sqrt();

        assert_eq!(rows[29].volatility, None);
        assert!((rows[30].volatility.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn drawdown_tracks_the_all_time_high() {
        let rows = metrics().compute(&daily(&[100.0, 120.0, 90.0, 60.0, 130.0, 65.0], &[1.0; 6]));
        let drawdowns: Vec<f64> = rows.iter().map(|r| r.drawdown_pct).collect();

        assert_eq!(drawdowns[0], 0.0);
        assert_eq!(drawdowns[1], 0.0);
        assert!((drawdowns[2] + 25.0).abs() < EPS);
        assert!((drawdowns[3] + 50.0).abs() < EPS);
        assert_eq!(drawdowns[4], 0.0);
        assert!((drawdowns[5] + 50.0).abs() < EPS);
        assert!(drawdowns.iter().all(|d| *d <= 0.0));
    }

    #[test]
    fn price_doubling_resets_drawdown_and_lifts_the_short_average() {
        let mut closes = vec![100.0; 10];
        closes.extend(vec![200.0; 20]);
        let rows = metrics().compute(&daily(&closes, &[1.0; 30]));

        assert!(rows.iter().all(|r| r.drawdown_pct == 0.0));
        // Seven days after the jump the window is entirely at the new level.
        let ma: Vec<f64> = rows[9..=16].iter().map(|r| r.ma_short.unwrap()).collect();
        assert!(ma.windows(2).all(|w| w[1] >= w[0]));
        assert!((ma[0] - 100.0).abs() < EPS);
        assert!((ma[7] - 200.0).abs() < EPS);
    }

    #[test]
    fn volume_trend_compares_against_the_preceding_baseline() {
        // 30 baseline days at 100, then 7 days at 150.
        let mut volumes = vec![100.0; 30];
        volumes.extend(vec![150.0; 7]);
        let rows = metrics().compute(&daily(&[10.0; 37], &volumes));

        assert!(rows[..36].iter().all(|r| r.volume_trend_pct.is_none()));
        assert!((rows[36].volume_ma_short.unwrap() - 150.0).abs() < EPS);
        assert!((rows[36].volume_trend_pct.unwrap() - 50.0).abs() < EPS);
    }

    #[test]
    fn zero_volume_baseline_is_undefined_not_zero() {
        let mut volumes = vec![0.0; 30];
        volumes.extend(vec![10.0; 7]);
        let rows = metrics().compute(&daily(&[10.0; 37], &volumes));
        assert_eq!(rows[36].volume_trend_pct, None);
        assert_eq!(rows[36].volume_ma_short, Some(10.0));
    }

    #[test]
    fn windows_count_rows_across_calendar_gaps() {
        // Seven observations spread over nine calendar days.
        let days = [0, 1, 2, 4, 5, 7, 8];
        let series = AssetSeries::from_observations(
            Asset::Eth,
            days.iter().enumerate().map(|(i, d)| {
                Observation::new(start() + Duration::days(*d), (i + 1) as f64, 1.0).unwrap()
            }),
        )
        .unwrap();
        let rows = metrics().compute(&series);

        assert_eq!(rows.len(), 7);
        assert_eq!(rows[6].date, start() + Duration::days(8));
        assert!((rows[6].ma_short.unwrap() - 4.0).abs() < EPS);
    }
}
