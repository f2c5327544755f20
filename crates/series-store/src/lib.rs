//! # Market Health Series Store
//!
//! The in-memory home of the two raw asset series. It is the only place where series
//! data changes; everything downstream works on copies.
//!
//! ## Architectural Principles
//!
//! - **Copy-on-read:** `get` and `snapshot` hand out owned copies. An analysis run never
//!   holds the store lock while computing, so a concurrent refresh can never be observed
//!   half-applied.
//! - **Overwrite, never append duplicates:** an upsert for an existing date replaces that
//!   record in place, keeping each series strictly increasing by date.
//! - **Revisioned:** every accepted write bumps the asset's revision counter, which lets a
//!   caching layer decide whether a snapshot is stale.
//!
//! ## Public API
//!
//! - `SeriesStore`: the cloneable handle holding both series.
//! - `StoreSnapshot`: an immutable copy of both series and their revisions.
//! - `IngestReport`: the outcome of a bulk ingest from the acquisition layer.
//! - `StoreError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use error::StoreError;
pub use store::{IngestReport, Rejected, SeriesStore, StoreSnapshot};
