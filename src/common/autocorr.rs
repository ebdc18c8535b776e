use crate::common::fft::{inverse_real_fft, next_pow2, real_fft};

/// Computes the autocorrelation
///
/// r(τ) = Σ x[j] · x[j + τ], 0 <= j < n - τ
///
/// for all lags 0 <= τ < n, using the FFT of the zero-padded input to
/// avoid the O(n²) time domain sum.
pub fn autocorrelation(samples: &[f64]) -> Vec<f64> {
    let n = samples.len();
    let fft_size = next_pow2(2 * n);
    let mut spectrum = real_fft(samples, fft_size);
    for bin in spectrum.iter_mut() {
        let power = bin.norm_sqr();
        bin.re = power;
        bin.im = 0.0;
    }
    let mut result = inverse_real_fft(&mut spectrum, fft_size);
    result.truncate(n);
    let scale = 1.0 / fft_size as f64;
    for value in result.iter_mut() {
        *value *= scale;
    }
    result
}

/// Computes m'(τ), the sum of the energies of the two windows entering the
/// normalized square difference at lag τ:
///
/// m'(τ) = Σ x[j]² + Σ x[j + τ]², 0 <= j < n - τ
///
/// Computed incrementally from m'(0) = 2 r(0) by peeling one sample off
/// each end per lag step.
pub fn m_prime(samples: &[f64], autocorr_at_lag_zero: f64) -> Vec<f64> {
    let n = samples.len();
    let mut result = vec![0.0; n];
    result[0] = 2.0 * autocorr_at_lag_zero;
    for lag in 1..n {
        result[lag] = result[lag - 1]
            - samples[n - lag] * samples[n - lag]
            - samples[lag - 1] * samples[lag - 1];
    }
    result
}

/// Computes the difference function
///
/// d(τ) = Σ (x[j] - x[j + τ])², 0 <= j < w
///
/// over a window of w = n / 2 samples, for lags 0 <= τ < w. Expanding the
/// square gives d(τ) = p(0) + p(τ) - 2 c(τ) where p(τ) is the running
/// window energy and c(τ) is the cross correlation of the buffer with its
/// first half, which an FFT computes for all lags at once.
pub fn difference_function(samples: &[f64]) -> Vec<f64> {
    let n = samples.len();
    let w = n / 2;
    if w == 0 {
        return Vec::new();
    }

    // c(τ) for all lags. No wraparound: j + τ < n <= fft_size.
    let fft_size = next_pow2(n);
    let signal_spectrum = real_fft(samples, fft_size);
    let head_spectrum = real_fft(&samples[..w], fft_size);
    let mut cross_spectrum: Vec<_> = signal_spectrum
        .iter()
        .zip(head_spectrum.iter())
        .map(|(signal_bin, head_bin)| head_bin.conj() * signal_bin)
        .collect();
    let cross_correlation = inverse_real_fft(&mut cross_spectrum, fft_size);
    let scale = 1.0 / fft_size as f64;

    let energy_at_lag_zero: f64 = samples[..w].iter().map(|x| x * x).sum();
    let mut lagged_energy = energy_at_lag_zero;

    let mut result = vec![0.0; w];
    for lag in 0..w {
        if lag > 0 {
            lagged_energy += samples[lag + w - 1] * samples[lag + w - 1]
                - samples[lag - 1] * samples[lag - 1];
        }
        let difference =
            energy_at_lag_zero + lagged_energy - 2.0 * scale * cross_correlation[lag];
        result[lag] = difference.max(0.0);
    }
    result
}
