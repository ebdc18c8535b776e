//! Multi-pitch (chord) detection.
//!
//! Collects the prominent spectral peaks of a buffer, discards the ones
//! that look like harmonics of a stronger lower peak, prefers lower
//! fundamentals when magnitudes are lopsided and merges near-coincident
//! peaks. A spectral flatness gate rejects noise before any peak picking
//! happens.

use log::debug;

use crate::common::fft::{magnitude_spectrum, next_pow2};
use crate::common::math::{cents_between, parabolic_interpolation};
use crate::config::FrequencyWindow;
use crate::error::{validate_input, Error};
use crate::result::ChordDetectionResult;

/// The maximum number of simultaneous pitches reported.
pub const MAX_PITCHES: usize = 4;

const MIN_FFT_SIZE: usize = 1024;

/// Peaks must reach this fraction of the strongest spectral magnitude.
const PEAK_THRESHOLD: f64 = 0.05;

/// Peaks closer than this are merged into one.
const MIN_PEAK_DISTANCE_HZ: f64 = 25.0;

/// Buffers whose in-window spectrum is flatter than this are treated as
/// noise and yield an empty result.
const SPECTRAL_FLATNESS_THRESHOLD: f64 = 0.4;

/// How close to an exact integer multiple a peak must sit to count as a
/// harmonic of a lower peak.
const HARMONIC_TOLERANCE_CENTS: f64 = 50.0;

/// A harmonic candidate is only collapsed when it is this much weaker than
/// the peak it is a multiple of; a strong peak at a multiple is taken to be
/// a genuinely played note.
const HARMONIC_MAGNITUDE_FACTOR: f64 = 0.3;

/// A higher peak must reach this fraction of every accepted lower peak's
/// magnitude to be kept.
const LOW_PITCH_PRIORITY_FACTOR: f64 = 0.6;

const MAX_HARMONIC_MULTIPLE: usize = 5;

/// The substitution boundary for chord detection. [`SpectralChordDetector`]
/// is the DSP implementation; alternative detectors (e.g. a learned model)
/// plug in behind this trait.
pub trait ChordDetector {
    fn detect_chord(
        &self,
        samples: &[f64],
        sample_rate: u32,
        window: &FrequencyWindow,
    ) -> Result<ChordDetectionResult, Error>;
}

/// Spectral peak picking chord detection.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpectralChordDetector;

impl ChordDetector for SpectralChordDetector {
    fn detect_chord(
        &self,
        samples: &[f64],
        sample_rate: u32,
        window: &FrequencyWindow,
    ) -> Result<ChordDetectionResult, Error> {
        detect(samples, sample_rate, window)
    }
}

#[derive(Debug, Clone, Copy)]
struct Peak {
    frequency: f64,
    /// Magnitude normalized to the strongest spectral bin.
    magnitude: f64,
}

/// The ratio of the geometric to the arithmetic mean of the band
/// magnitudes: 1 for white noise, near 0 for a line spectrum.
fn spectral_flatness(band: &[f64]) -> f64 {
    let arithmetic_mean = band.iter().sum::<f64>() / band.len() as f64;
    if arithmetic_mean <= 0.0 {
        return 0.0;
    }
    let log_mean = band.iter().map(|m| (m + 1e-12).ln()).sum::<f64>() / band.len() as f64;
    log_mean.exp() / arithmetic_mean
}

fn is_harmonic_of_stronger_peak(peak: &Peak, peaks: &[Peak]) -> bool {
    peaks.iter().any(|other| {
        if other.frequency >= peak.frequency
            || peak.magnitude >= HARMONIC_MAGNITUDE_FACTOR * other.magnitude
        {
            return false;
        }
        // The double is exempt: an octave is a legal double stop, so only
        // the third and higher multiples are collapsed.
        (3..=MAX_HARMONIC_MULTIPLE).any(|multiple| {
            cents_between(peak.frequency, multiple as f64 * other.frequency).abs()
                <= HARMONIC_TOLERANCE_CENTS
        })
    })
}

/// Runs chord detection on `samples`.
///
/// Silence and noise yield an empty result. Surviving pitches are reported
/// in ascending frequency order, at most [`MAX_PITCHES`] of them with the
/// lowest kept when more survive.
pub fn detect(
    samples: &[f64],
    sample_rate: u32,
    window: &FrequencyWindow,
) -> Result<ChordDetectionResult, Error> {
    validate_input(samples, sample_rate)?;

    let fft_size = next_pow2(samples.len()).max(MIN_FFT_SIZE);
    let spectrum = magnitude_spectrum(samples, fft_size);
    let hz_per_bin = sample_rate as f64 / fft_size as f64;
    let min_bin = ((window.min_frequency() / hz_per_bin).ceil() as usize).max(1);
    let max_bin = ((window.max_frequency() / hz_per_bin).floor() as usize)
        .min(spectrum.len().saturating_sub(2));
    if min_bin > max_bin {
        return Ok(ChordDetectionResult::empty());
    }

    // Global maximum for the same reason as in the spectral detector: an
    // out-of-window tone's sidelobes must stay below the peak threshold.
    let max_magnitude = spectrum
        .iter()
        .skip(1)
        .fold(0.0_f64, |acc, m| acc.max(*m));
    if max_magnitude <= 0.0 {
        return Ok(ChordDetectionResult::empty());
    }
    let band = &spectrum[min_bin..=max_bin];

    let flatness = spectral_flatness(band);
    if flatness > SPECTRAL_FLATNESS_THRESHOLD {
        debug!(
            "chord: spectral flatness {:.3} > {:.3}, treating buffer as noise",
            flatness, SPECTRAL_FLATNESS_THRESHOLD
        );
        return Ok(ChordDetectionResult::empty());
    }

    // Prominent local maxima, ascending by frequency.
    let mut peaks: Vec<Peak> = Vec::new();
    for bin in min_bin..=max_bin {
        let magnitude = spectrum[bin] / max_magnitude;
        let is_local_peak = spectrum[bin] >= spectrum[bin - 1] && spectrum[bin] >= spectrum[bin + 1];
        if magnitude >= PEAK_THRESHOLD && is_local_peak {
            let frequency = parabolic_interpolation(&spectrum, bin) * hz_per_bin;
            if window.contains(frequency) {
                peaks.push(Peak {
                    frequency,
                    magnitude,
                });
            }
        }
    }
    debug!("chord: {} candidate peaks", peaks.len());

    let collapsed: Vec<Peak> = peaks
        .iter()
        .filter(|peak| !is_harmonic_of_stronger_peak(peak, &peaks))
        .copied()
        .collect();

    // Lower fundamentals win: a higher peak survives only while it holds
    // its own against everything accepted below it.
    let mut accepted: Vec<Peak> = Vec::new();
    for peak in collapsed {
        let outweighed = accepted
            .iter()
            .any(|lower| peak.magnitude < LOW_PITCH_PRIORITY_FACTOR * lower.magnitude);
        if !outweighed {
            accepted.push(peak);
        }
    }

    // Merge peaks too close to be separate reeds.
    let mut merged: Vec<Peak> = Vec::new();
    for peak in accepted {
        if let Some(last) = merged.last_mut() {
            if peak.frequency - last.frequency < MIN_PEAK_DISTANCE_HZ {
                let total = last.magnitude + peak.magnitude;
                last.frequency =
                    (last.frequency * last.magnitude + peak.frequency * peak.magnitude) / total;
                last.magnitude = last.magnitude.max(peak.magnitude);
                continue;
            }
        }
        merged.push(peak);
    }
    merged.truncate(MAX_PITCHES);

    if merged.is_empty() {
        return Ok(ChordDetectionResult::empty());
    }
    let confidence =
        merged.iter().map(|p| p.magnitude).sum::<f64>() / merged.len() as f64;
    let pitches = merged.iter().map(|p| p.frequency).collect();
    Ok(ChordDetectionResult::new(pitches, confidence))
}
