//! McLeod pitch method (MPM).
//!
//! Computes the normalized square difference function (NSDF), gathers its
//! key maxima, i.e. the highest point between each pair of positive and
//! negative zero crossings, and picks the lowest lag maximum that is
//! comparable in height to the strongest one. The NSDF value at the chosen
//! maximum doubles as the clarity of the detection.

mod key_maximum;

pub use key_maximum::KeyMaximum;

use crate::common::autocorr::{autocorrelation, m_prime};
use crate::config::FrequencyWindow;
use crate::error::{validate_input, Error};
use crate::result::PitchDetectionResult;
use crate::yin::WINDOW_SLACK_CENTS;

/// A key maximum must reach this NSDF value to be considered a pitch.
const PEAK_THRESHOLD: f64 = 0.5;

/// A lower lag maximum wins over the global maximum if it reaches this
/// fraction of the global maximum value. Keeps the fundamental from losing
/// to a stronger harmonic at a higher lag.
const KEY_MAXIMUM_FRACTION: f64 = 0.5;

const MAX_KEY_MAXIMA_COUNT: usize = 16;

/// Computes the NSDF
///
/// nsdf(τ) = 2 r(τ) / m'(τ)
///
/// for all lags 0 <= τ < n. Lags where m'(τ) vanishes map to zero.
pub fn normalized_square_difference(samples: &[f64]) -> Vec<f64> {
    let r = autocorrelation(samples);
    let m = m_prime(samples, r[0]);
    r.iter()
        .zip(m.iter())
        .map(|(r_tau, m_tau)| if *m_tau > 0.0 { 2.0 * r_tau / m_tau } else { 0.0 })
        .collect()
}

/// Collects the key maxima of `nsdf`: for every stretch between a positive
/// going and the following negative going zero crossing, the highest value
/// in between. A stretch still open at the end of the buffer contributes
/// its running maximum. At most [`MAX_KEY_MAXIMA_COUNT`] maxima are kept.
pub fn key_maxima(nsdf: &[f64]) -> Vec<KeyMaximum> {
    let mut result: Vec<KeyMaximum> = Vec::new();
    let mut is_detecting = false;
    let mut max_index = 0;

    // Skip the trivial maximum at lag 0 by waiting for the NSDF to first
    // go negative.
    for lag in 1..nsdf.len() {
        if result.len() == MAX_KEY_MAXIMA_COUNT {
            break;
        }
        let positive_crossing = nsdf[lag - 1] <= 0.0 && nsdf[lag] > 0.0;
        let negative_crossing = nsdf[lag - 1] > 0.0 && nsdf[lag] <= 0.0;
        if is_detecting {
            if nsdf[lag] > nsdf[max_index] {
                max_index = lag;
            }
            if negative_crossing {
                result.push(KeyMaximum::new(nsdf, max_index));
                is_detecting = false;
            }
        } else if positive_crossing {
            is_detecting = true;
            max_index = lag;
        }
    }

    if is_detecting && result.len() < MAX_KEY_MAXIMA_COUNT {
        result.push(KeyMaximum::new(nsdf, max_index));
    }

    result
}

/// Picks the pitch candidate among `maxima`: the lowest lag maximum whose
/// value reaches both [`PEAK_THRESHOLD`] and [`KEY_MAXIMUM_FRACTION`] of
/// the strongest maximum.
fn select_key_maximum(maxima: &[KeyMaximum]) -> Option<KeyMaximum> {
    let strongest = maxima
        .iter()
        .map(|m| m.value)
        .fold(f64::NEG_INFINITY, f64::max);
    let cutoff = (KEY_MAXIMUM_FRACTION * strongest).max(PEAK_THRESHOLD);
    maxima.iter().find(|m| m.value >= cutoff).copied()
}

/// Runs MPM pitch detection on `samples`.
pub fn detect(
    samples: &[f64],
    sample_rate: u32,
    window: &FrequencyWindow,
) -> Result<PitchDetectionResult, Error> {
    validate_input(samples, sample_rate)?;

    let nsdf = normalized_square_difference(samples);
    let min_lag = ((sample_rate as f64 / window.max_frequency()).floor() as usize).max(2);
    let max_lag = ((sample_rate as f64 / window.min_frequency()).ceil() as usize)
        .min(nsdf.len().saturating_sub(1));
    if min_lag >= max_lag {
        return Ok(PitchDetectionResult::none());
    }

    // Gather maxima over the whole NSDF so a crossing just below the lag
    // range still terminates correctly, then keep those in range.
    let in_range: Vec<KeyMaximum> = key_maxima(&nsdf)
        .into_iter()
        .filter(|m| m.lag_index >= min_lag && m.lag_index <= max_lag)
        .collect();

    let chosen = match select_key_maximum(&in_range) {
        Some(max) => max,
        None => return Ok(PitchDetectionResult::none()),
    };

    let pitch = sample_rate as f64 / chosen.lag;
    let confidence = chosen.value.clamp(0.0, 1.0);
    Ok(match window.admit(pitch, WINDOW_SLACK_CENTS) {
        Some(admitted) => PitchDetectionResult::new(admitted, confidence),
        None => PitchDetectionResult::none(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frequency: f64, sample_rate: u32, length: usize, amplitude: f64) -> Vec<f64> {
        (0..length)
            .map(|i| {
                amplitude
                    * (2.0 * std::f64::consts::PI * frequency * i as f64 / sample_rate as f64)
                        .sin()
            })
            .collect()
    }

    #[test]
    fn nsdf_is_one_at_lag_zero() {
        let signal = sine(440.0, 44100, 1024, 0.7);
        let nsdf = normalized_square_difference(&signal);
        assert!((nsdf[0] - 1.0).abs() < 1e-9);
        assert!(nsdf.iter().all(|v| *v <= 1.0 + 1e-9));
    }

    #[test]
    fn key_maxima_find_the_period_peaks() {
        let signal = sine(441.0, 44100, 2048, 0.7);
        let nsdf = normalized_square_difference(&signal);
        let maxima = key_maxima(&nsdf);
        assert!(!maxima.is_empty());
        // First key maximum sits at the 100 sample period.
        assert!((maxima[0].lag - 100.0).abs() < 1.0);
        assert!(maxima[0].value > 0.9);
    }

    #[test]
    fn detects_a_pure_tone() {
        let window = FrequencyWindow::default();
        let signal = sine(440.0, 44100, 4096, 0.8);
        let result = detect(&signal, 44100, &window).unwrap();
        assert!(result.is_pitch_detected());
        assert!((result.pitch - 440.0).abs() < 0.5);
        assert!(result.confidence > 0.9);
    }

    #[test]
    fn detects_a_high_tone_whose_first_crossing_precedes_the_lag_range() {
        let window = FrequencyWindow::default();
        let signal = sine(4500.0, 44100, 4096, 0.8);
        let result = detect(&signal, 44100, &window).unwrap();
        assert!(result.is_pitch_detected());
        let error_cents = crate::common::math::cents_between(result.pitch, 4500.0).abs();
        assert!(error_cents < 20.0, "{} cents off", error_cents);
    }

    #[test]
    fn the_stronger_tone_wins_a_two_tone_mix() {
        let window = FrequencyWindow::default();
        let sample_rate = 44100;
        let mut signal = sine(934.6, sample_rate, 4096, 1.0);
        for (sample, weak) in signal.iter_mut().zip(sine(460.0, sample_rate, 4096, 0.3)) {
            *sample += weak;
        }
        let result = detect(&signal, sample_rate, &window).unwrap();
        assert!(result.is_pitch_detected());
        assert!((result.pitch - 934.6).abs() / 934.6 < 0.01);
    }

    #[test]
    fn rejects_silence() {
        let window = FrequencyWindow::default();
        let result = detect(&vec![0.0; 4096], 44100, &window).unwrap();
        assert!(!result.is_pitch_detected());
    }

    #[test]
    fn zero_sample_rate_is_an_error() {
        let window = FrequencyWindow::default();
        let signal = sine(440.0, 44100, 1024, 0.5);
        assert!(matches!(
            detect(&signal, 0, &window),
            Err(Error::ZeroSampleRate)
        ));
    }
}
