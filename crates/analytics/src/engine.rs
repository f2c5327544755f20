use crate::aligner::align;
use crate::correlation::rolling_correlation;
use crate::report::MetricReport;
use crate::windowed::WindowedMetrics;
use configuration::Windows;
use core_types::{Asset, AssetSeries};
use series_store::StoreSnapshot;
use std::collections::BTreeMap;

/// A stateless calculator that turns two asset series into a full `MetricReport`.
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    windows: Windows,
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new(Windows::default())
    }
}

impl MetricsEngine {
    pub fn new(windows: Windows) -> Self {
        Self { windows }
    }

    pub fn windows(&self) -> &Windows {
        &self.windows
    }

    /// The main entry point: runs the whole pipeline over an immutable store snapshot.
    pub fn run(&self, snapshot: &StoreSnapshot) -> MetricReport {
        self.run_series(snapshot.series(Asset::Btc), snapshot.series(Asset::Eth))
    }

    /// Runs the pipeline over an explicit pair of series.
    ///
    /// Every stage is recomputed from scratch: a single new day moves the boundary of
    /// every rolling window.
    pub fn run_series(&self, a: &AssetSeries, b: &AssetSeries) -> MetricReport {
        let windowed = WindowedMetrics::new(self.windows.clone());

        let aligned = align(a, b);
        let mut metrics = BTreeMap::new();
        metrics.insert(a.asset(), windowed.compute(a));
        metrics.insert(b.asset(), windowed.compute(b));
        let correlation = rolling_correlation(&aligned, self.windows.correlation_window);

        tracing::info!(
            rows_a = a.len(),
            rows_b = b.len(),
            aligned = aligned.len(),
            correlation_rows = correlation.len(),
            "Metric report computed."
        );

        MetricReport {
            metrics,
            aligned,
            correlation,
        }
    }
}
