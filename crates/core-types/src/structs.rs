use crate::enums::Asset;
use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The date format accepted at the input boundary.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single validated daily record for one asset.
///
/// Construct through `Observation::new` or `RawObservation::validate`; both reject
/// non-positive prices and negative volumes instead of clamping them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, close: f64, volume: f64) -> Result<Self, CoreError> {
        let observation = Self { date, close, volume };
        observation.validate()?;
        Ok(observation)
    }

    /// Parses a `YYYY-MM-DD` date and validates the record.
    pub fn parse(date: &str, close: f64, volume: f64) -> Result<Self, CoreError> {
        let parsed = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).map_err(|e| {
            CoreError::InvalidObservation {
                date: date.to_string(),
                reason: format!("not a valid calendar day ({e})"),
            }
        })?;
        Self::new(parsed, close, volume)
    }

    /// Checks the value invariants. `Deserialize` bypasses `new`, so the store calls this
    /// again on every upsert.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.close.is_finite() || self.close <= 0.0 {
            return Err(CoreError::invalid(
                self.date,
                format!("close price must be positive, got {}", self.close),
            ));
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(CoreError::invalid(
                self.date,
                format!("volume must be non-negative, got {}", self.volume),
            ));
        }
        Ok(())
    }
}

/// An unvalidated record as delivered by the acquisition layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub date: String,
    pub close: f64,
    pub volume: f64,
}

impl RawObservation {
    pub fn validate(&self) -> Result<Observation, CoreError> {
        Observation::parse(&self.date, self.close, self.volume)
    }
}

/// The observation history of one asset, strictly increasing by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSeries {
    asset: Asset,
    observations: Vec<Observation>,
}

impl AssetSeries {
    pub fn new(asset: Asset) -> Self {
        Self {
            asset,
            observations: Vec::new(),
        }
    }

    /// Builds a series from records in any order. Later duplicates of a date replace
    /// earlier ones; the first invalid record fails the whole construction.
    pub fn from_observations(
        asset: Asset,
        observations: impl IntoIterator<Item = Observation>,
    ) -> Result<Self, CoreError> {
        let mut series = Self::new(asset);
        for observation in observations {
            series.upsert(observation)?;
        }
        Ok(series)
    }

    /// Inserts the observation at its sorted position, or replaces the existing record
    /// for the same date. Returns `true` when a record was replaced.
    pub fn upsert(&mut self, observation: Observation) -> Result<bool, CoreError> {
        observation.validate()?;

        // Appending in date order is the common case for daily refreshes.
        if self
            .observations
            .last()
            .is_none_or(|last| last.date < observation.date)
        {
            self.observations.push(observation);
            return Ok(false);
        }

        match self
            .observations
            .binary_search_by_key(&observation.date, |o| o.date)
        {
            Ok(index) => {
                self.observations[index] = observation;
                Ok(true)
            }
            Err(index) => {
                self.observations.insert(index, observation);
                Ok(false)
            }
        }
    }

    pub fn asset(&self) -> Asset {
        self.asset
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&Observation> {
        self.observations
            .binary_search_by_key(&date, |o| o.date)
            .ok()
            .map(|index| &self.observations[index])
    }

    pub fn closes(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.volume).collect()
    }
}

/// One date on which both assets have an observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub price_a: f64,
    pub price_b: f64,
    pub volume_a: f64,
    pub volume_b: f64,
}

/// The date-joined view of two series. Derived data with no identity of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPair {
    pub asset_a: Asset,
    pub asset_b: Asset,
    pub rows: Vec<AlignedRow>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|row| row.date)
    }

    /// Projects the `a` side back into a series.
    pub fn series_a(&self) -> AssetSeries {
        AssetSeries {
            asset: self.asset_a,
            observations: self
                .rows
                .iter()
                .map(|row| Observation {
                    date: row.date,
                    close: row.price_a,
                    volume: row.volume_a,
                })
                .collect(),
        }
    }

    /// Projects the `b` side back into a series.
    pub fn series_b(&self) -> AssetSeries {
        AssetSeries {
            asset: self.asset_b,
            observations: self
                .rows
                .iter()
                .map(|row| Observation {
                    date: row.date,
                    close: row.price_b,
                    volume: row.volume_b,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn rejects_non_positive_price_and_negative_volume() {
        assert!(Observation::new(day(1), 0.0, 1.0).is_err());
        assert!(Observation::new(day(1), -5.0, 1.0).is_err());
        assert!(Observation::new(day(1), f64::NAN, 1.0).is_err());
        assert!(Observation::new(day(1), 10.0, -1.0).is_err());
        assert!(Observation::new(day(1), 10.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_impossible_calendar_days() {
        let err = Observation::parse("2023-02-29", 10.0, 1.0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidObservation { .. }));
        assert!(Observation::parse("2024-02-29", 10.0, 1.0).is_ok());
        assert!(Observation::parse("29/02/2024", 10.0, 1.0).is_err());
    }

    #[test]
    fn deserialized_records_are_still_validated() {
        let raw: RawObservation =
            serde_json::from_str(r#"{"date":"2024-01-03","close":-1.0,"volume":5.0}"#).unwrap();
        assert!(raw.validate().is_err());
    }

    #[test]
    fn upsert_keeps_dates_sorted_and_unique() {
        let mut series = AssetSeries::new(Asset::Btc);
        series.upsert(Observation::new(day(3), 3.0, 1.0).unwrap()).unwrap();
        series.upsert(Observation::new(day(1), 1.0, 1.0).unwrap()).unwrap();
        series.upsert(Observation::new(day(2), 2.0, 1.0).unwrap()).unwrap();
        let replaced = series
            .upsert(Observation::new(day(2), 20.0, 1.0).unwrap())
            .unwrap();

        assert!(replaced);
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![1.0, 20.0, 3.0]);
        assert!(series
            .observations()
            .windows(2)
            .all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn gaps_are_preserved() {
        let series = AssetSeries::from_observations(
            Asset::Eth,
            [
                Observation::new(day(1), 1.0, 1.0).unwrap(),
                Observation::new(day(5), 5.0, 1.0).unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.get(day(3)).is_none());
        assert_eq!(series.get(day(5)).map(|o| o.close), Some(5.0));
    }
}
