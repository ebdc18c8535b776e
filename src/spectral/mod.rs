//! FFT based pitch detection.
//!
//! Looks for the lowest frequency spectral peak that clears a level
//! dependent threshold and refines its bin with parabolic interpolation.
//! Picking the lowest qualifying peak rather than the tallest keeps the
//! fundamental from losing to a stronger harmonic.

use crate::common::fft::{magnitude_spectrum, next_pow2};
use crate::common::math::parabolic_interpolation;
use crate::config::FrequencyWindow;
use crate::error::{validate_input, Error};
use crate::result::PitchDetectionResult;
use crate::yin::WINDOW_SLACK_CENTS;

/// Buffers are zero-padded to at least this FFT size so short inputs still
/// get usable bin resolution.
pub const MIN_FFT_SIZE: usize = 2048;

/// Above this frequency the peak threshold is halved. High reeds ring with
/// less energy than low ones and would otherwise be missed.
const RELAXED_THRESHOLD_FREQUENCY: f64 = 300.0;

/// Peak magnitudes this many times the in-window mean count as a clear
/// detection; anything higher saturates the confidence at 1.
const FULL_CONFIDENCE_SNR: f64 = 10.0;

/// Runs spectral pitch detection on `samples`.
pub fn detect(
    samples: &[f64],
    sample_rate: u32,
    window: &FrequencyWindow,
) -> Result<PitchDetectionResult, Error> {
    validate_input(samples, sample_rate)?;
    let fft_size = next_pow2(samples.len()).max(MIN_FFT_SIZE);
    let spectrum = magnitude_spectrum(samples, fft_size);
    Ok(detect_from_spectrum(&spectrum, fft_size, sample_rate, window))
}

/// Picks a pitch out of an already computed magnitude spectrum. Shared
/// with the hybrid detector, which reuses its band energy spectrum here.
pub(crate) fn detect_from_spectrum(
    spectrum: &[f64],
    fft_size: usize,
    sample_rate: u32,
    window: &FrequencyWindow,
) -> PitchDetectionResult {
    let hz_per_bin = sample_rate as f64 / fft_size as f64;
    let min_bin = ((window.min_frequency() / hz_per_bin).ceil() as usize).max(1);
    let max_bin = ((window.max_frequency() / hz_per_bin).floor() as usize)
        .min(spectrum.len().saturating_sub(2));
    if min_bin > max_bin {
        return PitchDetectionResult::none();
    }

    // Normalize against the whole spectrum, not just the window: a tone
    // outside the window must not get its leakage sidelobes scaled up into
    // an in-window detection.
    let max_magnitude = spectrum
        .iter()
        .skip(1)
        .fold(0.0_f64, |acc, m| acc.max(*m));
    if max_magnitude <= 0.0 {
        return PitchDetectionResult::none();
    }
    let band = &spectrum[min_bin..=max_bin];
    let mean_magnitude = band.iter().sum::<f64>() / band.len() as f64;
    let threshold = (1.2 * mean_magnitude / max_magnitude).max(0.1);

    for bin in min_bin..=max_bin {
        let magnitude = spectrum[bin] / max_magnitude;
        let bin_threshold = if bin as f64 * hz_per_bin > RELAXED_THRESHOLD_FREQUENCY {
            0.5 * threshold
        } else {
            threshold
        };
        let is_local_peak = spectrum[bin] >= spectrum[bin - 1] && spectrum[bin] >= spectrum[bin + 1];
        if magnitude >= bin_threshold && is_local_peak {
            let refined_bin = parabolic_interpolation(spectrum, bin);
            let pitch = refined_bin * hz_per_bin;
            let snr = spectrum[bin] / mean_magnitude;
            let confidence = (snr / FULL_CONFIDENCE_SNR).min(1.0);
            return match window.admit(pitch, WINDOW_SLACK_CENTS) {
                Some(admitted) => PitchDetectionResult::new(admitted, confidence),
                None => PitchDetectionResult::none(),
            };
        }
    }

    PitchDetectionResult::none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand_pcg::Pcg32;

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
    fn detects_a_pure_tone() {
        let window = FrequencyWindow::default();
        let signal = sine(1000.0, 44100, 16384, 0.8);
        let result = detect(&signal, 44100, &window).unwrap();
        assert!(result.is_pitch_detected());
        let error_cents = crate::common::math::cents_between(result.pitch, 1000.0).abs();
        assert!(error_cents < 10.0, "{} cents off", error_cents);
        assert!(result.confidence > 0.9);
    }

    #[test]
    fn detects_a_high_tone() {
        let window = FrequencyWindow::default();
        let signal = sine(4835.0, 44100, 44100, 0.8);
        let result = detect(&signal, 44100, &window).unwrap();
        assert!(result.is_pitch_detected());
        let error_cents = crate::common::math::cents_between(result.pitch, 4835.0).abs();
        assert!(error_cents < 5.0, "{} cents off", error_cents);
    }

    #[test]
    fn favors_the_fundamental_over_a_stronger_harmonic() {
        let window = FrequencyWindow::default();
        let sample_rate = 44100;
        let mut signal = sine(400.0, sample_rate, 16384, 0.5);
        for (sample, harmonic) in signal.iter_mut().zip(sine(800.0, sample_rate, 16384, 0.8)) {
            *sample += harmonic;
        }
        let result = detect(&signal, sample_rate, &window).unwrap();
        assert!(result.is_pitch_detected());
        let error_cents = crate::common::math::cents_between(result.pitch, 400.0).abs();
        assert!(error_cents < 10.0, "{} cents off", error_cents);
    }

    #[test]
    fn tracks_an_abrupt_transition_across_sub_windows() {
        let window = FrequencyWindow::default();
        let sample_rate = 44100;
        let chunk = 4096;
        let mut signal = sine(1000.0, sample_rate, 4 * chunk, 0.8);
        signal.extend(sine(1800.0, sample_rate, 4 * chunk, 0.8));
        for (index, sub) in signal.chunks(chunk).enumerate() {
            let result = detect(sub, sample_rate, &window).unwrap();
            assert!(result.is_pitch_detected(), "no pitch in sub-window {}", index);
            let expected = if index < 4 { 1000.0 } else { 1800.0 };
            assert!(
                (result.pitch - expected).abs() < 10.0,
                "sub-window {} reported {} Hz, expected {} Hz",
                index,
                result.pitch,
                expected
            );
        }
    }

    #[test]
    fn follows_a_sweep_across_sub_windows() {
        let window = FrequencyWindow::default();
        let sample_rate = 44100;
        let total = 44100;
        let (start, end) = (800.0, 1600.0);
        let mut phase = 0.0f64;
        let signal: Vec<f64> = (0..total)
            .map(|i| {
                let frequency = start + (end - start) * i as f64 / total as f64;
                phase += 2.0 * std::f64::consts::PI * frequency / sample_rate as f64;
                0.8 * phase.sin()
            })
            .collect();
        let chunk = 4410;
        for (index, sub) in signal.chunks(chunk).enumerate() {
            let result = detect(sub, sample_rate, &window).unwrap();
            assert!(result.is_pitch_detected(), "no pitch in sub-window {}", index);
            let span_start = start + (end - start) * (index * chunk) as f64 / total as f64;
            let span_end = span_start + (end - start) * chunk as f64 / total as f64;
            assert!(
                result.pitch > span_start - 20.0 && result.pitch < span_end + 20.0,
                "sub-window {} reported {} Hz for the {:.0} to {:.0} Hz span",
                index,
                result.pitch,
                span_start,
                span_end
            );
        }
    }

    #[test]
    fn noise_gets_low_confidence() {
        let window = FrequencyWindow::default();
        let mut rng = Pcg32::new(0xcafe_f00d_d15e_a5e5, 0x0a02_bdbf_7bb3_c0a7);
        let signal: Vec<f64> = (0..16384).map(|_| rng.gen_range(-0.5..0.5)).collect();
        let result = detect(&signal, 44100, &window).unwrap();
        assert!(result.confidence < 0.5);
    }

    #[test]
    fn rejects_silence() {
        let window = FrequencyWindow::default();
        let result = detect(&vec![0.0; 4096], 44100, &window).unwrap();
        assert!(!result.is_pitch_detected());
    }

    #[test]
    fn empty_input_is_an_error() {
        let window = FrequencyWindow::default();
        assert!(matches!(detect(&[], 44100, &window), Err(Error::EmptyBuffer)));
    }
}
