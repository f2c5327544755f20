//! Small numeric kernels shared by the windowed and cross-asset metrics.
//!
//! Every function returns `None` instead of producing `NaN`.

/// Largest spread, relative to the values' magnitude (floored at 1), still treated as
/// a constant window. Steady compounding yields returns that differ only by rounding.
const CONSTANT_TOLERANCE: f64 = 1e-10;

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (N-1 denominator). `None` below two values.
///
/// A window of values equal up to rounding returns exactly `0.0`.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    if is_constant(values) {
        return Some(0.0);
    }
    let mean = mean(values)?;
    let sum_sq = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Pearson correlation coefficient of two equal-length samples.
///
/// `None` when the lengths differ, there are fewer than two points, or either side
/// has zero variance up to rounding.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 || is_constant(a) || is_constant(b) {
        return None;
    }
    let mean_a = mean(a)?;
    let mean_b = mean(b)?;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        let (dx, dy) = (x - mean_a, y - mean_b);
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denominator = (var_a * var_b).sqrt();
    if denominator <= 0.0 || !denominator.is_finite() {
        return None;
    }
    Some((cov / denominator).clamp(-1.0, 1.0))
}

/// `ln(p[t] / p[t-1])` for every consecutive pair; one shorter than the input.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}

/// `p[t] / p[t-1] - 1` for every consecutive pair; one shorter than the input.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// The trailing `len` values ending at and including `end`, if that many exist.
pub fn trailing(values: &[f64], end: usize, len: usize) -> Option<&[f64]> {
    if len == 0 || end >= values.len() || end + 1 < len {
        return None;
    }
    Some(&values[end + 1 - len..=end])
}

fn is_constant(values: &[f64]) -> bool {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let scale = max.abs().max(min.abs()).max(1.0);
    max - min <= CONSTANT_TOLERANCE * scale
}
