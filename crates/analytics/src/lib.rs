//! # Market Health Analytics Engine
//!
//! This crate turns two raw daily price/volume series into the derived indicators the
//! dashboard charts and narrates: moving averages, annualized volatility, drawdown,
//! volume trend and rolling cross-asset correlation.
//!
//! ## Architectural Principles
//!
//! - **Pure pipeline:** `MetricsEngine` takes immutable series and returns a fresh
//!   `MetricReport`. It keeps no state between runs; caching is a separate decorator
//!   (`CachedEngine`) around it.
//! - **Absence is explicit:** a metric whose window is not yet full, or whose statistic
//!   is undefined (zero variance, empty denominator), is `None`. `NaN` never escapes.
//! - **Row-counted windows:** every rolling window spans the last K available rows of a
//!   series. Missing calendar days are not interpolated.
//!
//! ## Public API
//!
//! - `align`: inner join of two series on date.
//! - `WindowedMetrics`: the single-asset rolling metrics.
//! - `rolling_correlation`: Pearson correlation of daily returns over the aligned view.
//! - `Summarizer`: point-in-time statistics at a reference date.
//! - `MetricsEngine` / `CachedEngine`: the full pipeline, plain and memoized.
//! - `export::flatten`: the flat (date, asset) table for download.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod aligner;
pub mod cache;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod export;
pub mod report;
pub mod stats;
pub mod summarizer;
pub mod windowed;

// Re-export the key components to create a clean, public-facing API.
pub use aligner::align;
pub use cache::CachedEngine;
pub use correlation::rolling_correlation;
pub use engine::MetricsEngine;
pub use error::AnalyticsError;
pub use export::{ExportRow, flatten};
pub use report::{
    AssetSnapshot, CorrelationRow, DaysAboveMa, MaKind, MetricReport, MetricRow, Snapshot,
};
pub use summarizer::Summarizer;
pub use windowed::WindowedMetrics;
