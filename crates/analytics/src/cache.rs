use crate::engine::MetricsEngine;
use crate::report::MetricReport;
use parking_lot::Mutex;
use series_store::StoreSnapshot;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Memoizes the last `MetricReport`, keyed by the source store and revisions of the
/// snapshot it was computed from.
///
/// The wrapped engine stays pure; this type only decides whether to call it. Any
/// revision change triggers a full recomputation, never a patch.
type CacheKey = (u64, Vec<u64>);

#[derive(Debug)]
pub struct CachedEngine {
    engine: MetricsEngine,
    last: Mutex<Option<(CacheKey, Arc<MetricReport>)>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedEngine {
    pub fn new(engine: MetricsEngine) -> Self {
        Self {
            engine,
            last: Mutex::new(None),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn engine(&self) -> &MetricsEngine {
        &self.engine
    }

    /// Returns the cached report if `snapshot` comes from the same store at the same
    /// revisions, otherwise runs the engine and replaces the cache entry.
    pub fn run(&self, snapshot: &StoreSnapshot) -> Arc<MetricReport> {
        let key = (snapshot.source_id(), snapshot.revisions());

        if let Some((cached_key, report)) = self.last.lock().as_ref() {
            if *cached_key == key {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Arc::clone(report);
            }
        }

        // Computed outside the lock so concurrent runs do not serialize on it.
        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(?key, "Metric cache miss; recomputing.");
        let report = Arc::new(self.engine.run(snapshot));
        *self.last.lock() = Some((key, Arc::clone(&report)));
        report
    }

    pub fn invalidate(&self) {
        *self.last.lock() = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Asset, AssetSeries, Observation};
    use series_store::SeriesStore;

    fn obs(date: &str, close: f64) -> Observation {
        Observation::parse(date, close, 10.0).unwrap()
    }

    #[test]
    fn unchanged_store_reuses_the_report() {
        let store = SeriesStore::new();
        store.upsert(Asset::Btc, obs("2024-01-01", 100.0)).unwrap();
        let cached = CachedEngine::new(MetricsEngine::default());

        let first = cached.run(&store.snapshot());
        let second = cached.run(&store.snapshot());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!((cached.hits(), cached.misses()), (1, 1));
    }

    #[test]
    fn any_write_forces_a_full_recompute() {
        let store = SeriesStore::new();
        store.upsert(Asset::Btc, obs("2024-01-01", 100.0)).unwrap();
        let cached = CachedEngine::new(MetricsEngine::default());
        let first = cached.run(&store.snapshot());

        store.upsert(Asset::Eth, obs("2024-01-01", 5.0)).unwrap();
        let second = cached.run(&store.snapshot());
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.aligned.len(), 1);
        assert_eq!(*second, cached.engine().run(&store.snapshot()));

        cached.invalidate();
        let third = cached.run(&store.snapshot());
        assert!(!Arc::ptr_eq(&second, &third));
        assert_eq!(cached.misses(), 3);
    }

    #[test]
    fn equal_revisions_from_different_sources_are_not_confused() {
        let cached = CachedEngine::new(MetricsEngine::default());

        let short = AssetSeries::from_observations(
            Asset::Btc,
            (1..=5).map(|d| obs(&format!("2024-01-{d:02}"), 100.0)),
        )
        .unwrap();
        let long = AssetSeries::from_observations(
            Asset::Btc,
            (1..=28).map(|d| obs(&format!("2024-02-{d:02}"), 7.0)),
        )
        .unwrap();
        let first = cached.run(&StoreSnapshot::from_series([short]));
        let second = cached.run(&StoreSnapshot::from_series([long]));
        assert_eq!(first.rows(Asset::Btc).len(), 5);
        assert_eq!(second.rows(Asset::Btc).len(), 28);

        let store = SeriesStore::new();
        let other = SeriesStore::new();
        store.upsert(Asset::Btc, obs("2024-01-01", 100.0)).unwrap();
        other.upsert(Asset::Btc, obs("2024-03-01", 9.0)).unwrap();
        let from_store = cached.run(&store.snapshot());
        let from_other = cached.run(&other.snapshot());
        assert_eq!(from_store.rows(Asset::Btc)[0].close, 100.0);
        assert_eq!(from_other.rows(Asset::Btc)[0].close, 9.0);
        assert_eq!(cached.hits(), 0);
    }
}
