use crate::report::CorrelationRow;
use crate::stats::{pearson, simple_returns, trailing};
use core_types::AlignedPair;

/// Default number of daily returns per correlation window.
pub const DEFAULT_WINDOW: usize = 90;

/// Rolling Pearson correlation of the two assets' daily returns.
///
/// Returns are taken between consecutive aligned rows, so a day missing from either
/// asset is skipped by both. A row is emitted for every aligned date that closes a
/// full window of `window` returns, i.e. from aligned index `window` onward. Returns
/// rather than prices are correlated so that a shared trend does not inflate the
/// coefficient.
pub fn rolling_correlation(pair: &AlignedPair, window: usize) -> Vec<CorrelationRow> {
    let prices_a: Vec<f64> = pair.rows.iter().map(|row| row.price_a).collect();
    let prices_b: Vec<f64> = pair.rows.iter().map(|row| row.price_b).collect();
    let returns_a = simple_returns(&prices_a);
    let returns_b = simple_returns(&prices_b);

    let mut rows = Vec::with_capacity(pair.len().saturating_sub(window));
    let mut undefined = 0usize;

    // Return `k` closes at aligned row `k + 1`.
    for end in 0..returns_a.len() {
        let (Some(a), Some(b)) = (
            trailing(&returns_a, end, window),
            trailing(&returns_b, end, window),
        ) else {
            continue;
        };

        let corr = pearson(a, b);
        if corr.is_none() {
            undefined += 1;
        }
        rows.push(CorrelationRow {
            date: pair.rows[end + 1].date,
            corr,
        });
    }

    if undefined > 0 {
        tracing::debug!(undefined, "Zero-variance correlation windows left undefined.");
    }
    rows
}
