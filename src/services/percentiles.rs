/// Percentile helpers for already-sorted slices.
///
/// - Empty input => `None`.
/// - `percentile <= 0` => first element.
/// - `percentile >= 100` => last element.
/// - Otherwise the position `p / 100 * (len - 1)` is interpolated linearly
///   between the two closest ranks.

/// Returns the interpolated percentile of a slice sorted in ascending order.
pub fn interpolated_sorted(sorted_values: &[f64], percentile: f64) -> Option<f64> {
    let last = sorted_values.len().checked_sub(1)?;
    if percentile <= 0.0 {
        return sorted_values.first().copied();
    }
    if percentile >= 100.0 {
        return sorted_values.get(last).copied();
    }

    let position = (percentile / 100.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    let low = sorted_values[lower];
    let high = sorted_values[upper];
    // Rounding must not push the result past the upper rank.
    Some((low + (high - low) * fraction).min(high))
}

/// Sorts a copy of `values` and returns the requested percentiles.
pub fn percentiles_of(values: &[f64], percentiles: &[f64]) -> Option<Vec<f64>> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentiles
        .iter()
        .map(|percentile| interpolated_sorted(&sorted, *percentile))
        .collect()
}
