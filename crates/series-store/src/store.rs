use crate::error::StoreError;
use chrono::NaiveDate;
use core_types::{Asset, AssetSeries, Observation, RawObservation};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

fn next_source_id() -> u64 {
    NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
struct Slot {
    series: AssetSeries,
    revision: u64,
}

/// The `SeriesStore` holds the live observation history of both assets.
///
/// Cloning the store clones the handle, not the data; all clones see the same series.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    id: u64,
    slots: Arc<RwLock<BTreeMap<Asset, Slot>>>,
}

/// An immutable copy of both series taken at one instant.
///
/// `(source_id, revisions)` identifies the contents: two snapshots that agree on both
/// hold the same series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    source_id: u64,
    series: BTreeMap<Asset, AssetSeries>,
    revisions: BTreeMap<Asset, u64>,
}

/// One observation the store refused during a bulk ingest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejected {
    /// Position of the record in the ingested batch.
    pub index: usize,
    pub reason: String,
}

/// The outcome of `SeriesStore::ingest`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    /// Records written, including those that replaced an existing date.
    pub accepted: usize,
    /// Records that overwrote an earlier observation for the same date.
    pub replaced: usize,
    pub rejected: Vec<Rejected>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

impl Default for SeriesStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesStore {
    /// Creates a store with an empty series for every tracked asset.
    pub fn new() -> Self {
        let slots = Asset::ALL
            .into_iter()
            .map(|asset| {
                (
                    asset,
                    Slot {
                        series: AssetSeries::new(asset),
                        revision: 0,
                    },
                )
            })
            .collect();
        Self {
            id: next_source_id(),
            slots: Arc::new(RwLock::new(slots)),
        }
    }

    /// Inserts or replaces the observation for `asset` on `observation.date`.
    ///
    /// Returns `true` when an existing record for that date was overwritten.
    pub fn upsert(&self, asset: Asset, observation: Observation) -> Result<bool, StoreError> {
        let mut slots = self.slots.write();
        let slot = slot_mut(&mut slots, asset);
        let replaced = slot.series.upsert(observation)?;
        slot.revision += 1;

        tracing::debug!(%asset, date = %observation.date, replaced, "Observation upserted.");
        Ok(replaced)
    }

    /// Applies a batch of raw records in input order.
    ///
    /// Invalid records are rejected one by one and reported; they never abort the batch.
    /// Later records for a date overwrite earlier ones.
    pub fn ingest(
        &self,
        asset: Asset,
        records: impl IntoIterator<Item = RawObservation>,
    ) -> IngestReport {
        let mut report = IngestReport::default();

        let mut slots = self.slots.write();
        let slot = slot_mut(&mut slots, asset);

        for (index, raw) in records.into_iter().enumerate() {
            match raw.validate().and_then(|o| slot.series.upsert(o)) {
                Ok(replaced) => {
                    report.accepted += 1;
                    if replaced {
                        report.replaced += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(%asset, index, error = %e, "Skipping invalid observation.");
                    report.rejected.push(Rejected {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if report.accepted > 0 {
            slot.revision += 1;
        }

        tracing::info!(
            %asset,
            accepted = report.accepted,
            replaced = report.replaced,
            rejected = report.rejected.len(),
            rows = slot.series.len(),
            "Ingest complete."
        );
        report
    }

    /// Returns a copy of the asset's series.
    pub fn get(&self, asset: Asset) -> AssetSeries {
        let slots = self.slots.read();
        slot_ref(&slots, asset)
            .map(|slot| slot.series.clone())
            .unwrap_or_else(|| AssetSeries::new(asset))
    }

    /// Identifies this store (and its clones) among all stores in the process.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn revision(&self, asset: Asset) -> u64 {
        let slots = self.slots.read();
        slot_ref(&slots, asset).map_or(0, |slot| slot.revision)
    }

    /// Copies both series under a single read lock, so the pair is mutually consistent.
    pub fn snapshot(&self) -> StoreSnapshot {
        let slots = self.slots.read();
        let mut series = BTreeMap::new();
        let mut revisions = BTreeMap::new();
        for asset in Asset::ALL {
            let (copy, revision) = slot_ref(&slots, asset)
                .map(|slot| (slot.series.clone(), slot.revision))
                .unwrap_or_else(|| (AssetSeries::new(asset), 0));
            series.insert(asset, copy);
            revisions.insert(asset, revision);
        }
        StoreSnapshot {
            source_id: self.id,
            series,
            revisions,
        }
    }
}

fn slot_ref(slots: &BTreeMap<Asset, Slot>, asset: Asset) -> Option<&Slot> {
    slots.get(&asset)
}

fn slot_mut(slots: &mut BTreeMap<Asset, Slot>, asset: Asset) -> &mut Slot {
    slots.entry(asset).or_insert_with(|| Slot {
        series: AssetSeries::new(asset),
        revision: 0,
    })
}

impl StoreSnapshot {
    /// Builds a snapshot directly from series, for callers that never had a store.
    ///
    /// Every call gets a fresh source id, so no two such snapshots share a cache entry.
    pub fn from_series(series: impl IntoIterator<Item = AssetSeries>) -> Self {
        let mut snapshot = Self {
            source_id: next_source_id(),
            series: Asset::ALL
                .into_iter()
                .map(|asset| (asset, AssetSeries::new(asset)))
                .collect(),
            revisions: Asset::ALL.into_iter().map(|asset| (asset, 0)).collect(),
        };
        for s in series {
            snapshot.series.insert(s.asset(), s);
        }
        snapshot
    }

    pub fn series(&self, asset: Asset) -> &AssetSeries {
        // Both constructors populate every asset.
        &self.series[&asset]
    }

    /// The id of the store this snapshot was taken from.
    pub fn source_id(&self) -> u64 {
        self.source_id
    }

    pub fn revision(&self, asset: Asset) -> u64 {
        self.revisions.get(&asset).copied().unwrap_or(0)
    }

    /// The revision of every asset, in `Asset::ALL` order.
    pub fn revisions(&self) -> Vec<u64> {
        Asset::ALL.iter().map(|a| self.revision(*a)).collect()
    }

    /// The most recent date across both series.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.series
            .values()
            .filter_map(|s| s.last().map(|o| o.date))
            .max()
    }

    pub fn into_series(self) -> BTreeMap<Asset, AssetSeries> {
        self.series
    }
}
