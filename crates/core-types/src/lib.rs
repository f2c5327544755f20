//! # Market Health Core Types
//!
//! The shared vocabulary of the metrics engine. Every other crate in the workspace
//! depends on this one; it depends on nothing but `serde`, `chrono` and `thiserror`.
//!
//! - `Asset`: which of the two tracked assets a series belongs to.
//! - `Observation`: one validated daily (date, close, volume) record.
//! - `AssetSeries`: a date-sorted, date-unique sequence of observations.
//! - `AlignedPair`: the inner join of two series on date.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::Asset;
pub use error::CoreError;
pub use structs::{AlignedPair, AlignedRow, AssetSeries, Observation, RawObservation};
