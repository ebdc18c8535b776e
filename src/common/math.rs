/// The [root mean square](https://en.wikipedia.org/wiki/Root_mean_square)
/// level of a buffer. Zero for an empty buffer.
pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f64).sqrt()
}

/// Refines a discrete extremum by fitting a parabola through the extremum
/// and its two neighbors, returning the sub-sample index of the vertex.
///
/// Works for minima and maxima alike. Falls back to `peak_index` at the
/// array edges, for a degenerate (flat) parabola, and when the vertex lands
/// more than one sample away from the extremum, which only happens on
/// numerically meaningless input.
pub fn parabolic_interpolation(values: &[f64], peak_index: usize) -> f64 {
    if peak_index == 0 || peak_index + 1 >= values.len() {
        return peak_index as f64;
    }

    let left = values[peak_index - 1];
    let center = values[peak_index];
    let right = values[peak_index + 1];

    let denominator = left - 2.0 * center + right;
    if denominator.abs() < 1e-10 {
        return peak_index as f64;
    }

    let adjustment = 0.5 * (left - right) / denominator;
    if adjustment.abs() > 1.0 {
        return peak_index as f64;
    }

    peak_index as f64 + adjustment
}

/// The interval between two frequencies in cents (1200 cents per octave).
pub fn cents_between(f1: f64, f2: f64) -> f64 {
    1200.0 * (f1 / f2).log2()
}

/// Shifts a frequency by the given number of cents.
pub fn add_cents(frequency: f64, cents: f64) -> f64 {
    (cents / 1200.0).exp2() * frequency
}
