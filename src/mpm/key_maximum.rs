/// A local maximum of the NSDF between a positive and a negative zero
/// crossing, refined with a parabolic fit through its neighbors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyMaximum {
    /// The lag index at which the maximum NSDF value occurs.
    pub lag_index: usize,
    /// The NSDF value at `lag_index`.
    pub value_at_lag_index: f64,
    /// The interpolated maximum value.
    pub value: f64,
    /// The interpolated lag, in fractional samples.
    pub lag: f64,
}

impl KeyMaximum {
    pub(crate) fn new(nsdf: &[f64], lag_index: usize) -> Self {
        let value_at_lag_index = nsdf[lag_index];
        // A parabolic fit needs both neighbors.
        if lag_index == 0 || lag_index + 1 >= nsdf.len() {
            return KeyMaximum {
                lag_index,
                value_at_lag_index,
                value: value_at_lag_index,
                lag: lag_index as f64,
            };
        }

        let left = nsdf[lag_index - 1];
        let right = nsdf[lag_index + 1];
        let denominator = left - 2.0 * value_at_lag_index + right;
        if denominator >= 0.0 {
            // Not locally concave, keep the sample values.
            return KeyMaximum {
                lag_index,
                value_at_lag_index,
                value: value_at_lag_index,
                lag: lag_index as f64,
            };
        }

        let adjustment = 0.5 * (left - right) / denominator;
        KeyMaximum {
            lag_index,
            value_at_lag_index,
            value: value_at_lag_index - 0.25 * (left - right) * adjustment,
            lag: lag_index as f64 + adjustment,
        }
    }
}
