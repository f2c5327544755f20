use core_types::{AlignedPair, AlignedRow, AssetSeries};
use std::cmp::Ordering;

/// Inner-joins two series on date.
///
/// A date survives only if both series have it. Missing days are dropped from the
/// joined view, never forward-filled. Both inputs are strictly increasing by date, so
/// a single merge pass keeps the output ascending.
pub fn align(a: &AssetSeries, b: &AssetSeries) -> AlignedPair {
    let (left, right) = (a.observations(), b.observations());
    let mut rows = Vec::with_capacity(left.len().min(right.len()));
    let (mut i, mut j) = (0, 0);

    while i < left.len() && j < right.len() {
        match left[i].date.cmp(&right[j].date) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                rows.push(AlignedRow {
                    date: left[i].date,
                    price_a: left[i].close,
                    price_b: right[j].close,
                    volume_a: left[i].volume,
                    volume_b: right[j].volume,
                });
                i += 1;
                j += 1;
            }
        }
    }

    tracing::debug!(
        asset_a = %a.asset(),
        asset_b = %b.asset(),
        rows_a = left.len(),
        rows_b = right.len(),
        aligned = rows.len(),
        "Series aligned."
    );

    AlignedPair {
        asset_a: a.asset(),
        asset_b: b.asset(),
        rows,
    }
}
