//! Energy cost scaling.

/// Scale `values` toward [0, 1] against a known floor `min` and ceiling `max`.
///
/// Computes `(v - min) / max - min` for each value. With the usual floor of
/// zero this is `v / max`. When `min == max` the range is degenerate and
/// every cost is treated as maximal (all ones) instead of dividing by zero.
pub fn min_max_scale(values: &[f64], min: f64, max: f64) -> Vec<f64> {
    if min == max {
        return vec![1.0; values.len()];
    }
    values.iter().map(|v| (v - min) / max - min).collect()
}
