//! Hybrid pitch detection.
//!
//! Routes each buffer to the engine that handles its register best. A
//! single spectral pass yields a rough pitch estimate plus the low and
//! high band energy fractions; YIN takes buffers whose rough estimate and
//! energy both sit at the bottom of the window, the spectral result is
//! kept when both sit at the top, MPM takes everything in between. When
//! the routed engine comes up empty the rough spectral result stands in.

use log::debug;

use crate::common::fft::{magnitude_spectrum, next_pow2};
use crate::config::FrequencyWindow;
use crate::error::{validate_input, Error};
use crate::result::PitchDetectionResult;
use crate::spectral::{detect_from_spectrum, MIN_FFT_SIZE};
use crate::{mpm, yin};

pub const DEFAULT_LOW_BAND_ENERGY_THRESHOLD: f64 = 0.5;
pub const DEFAULT_LOW_BAND_FREQUENCY: f64 = 325.0;
pub const DEFAULT_HIGH_BAND_ENERGY_THRESHOLD: f64 = 0.5;
pub const DEFAULT_HIGH_BAND_FREQUENCY: f64 = 1000.0;

/// Routing tunables for [`detect`].
///
/// The two band edges split the frequency window into a low, a mid and a
/// high band. The thresholds are fractions (0 to 1) of the total in-window
/// spectral energy a band must hold for its engine to be picked.
///
/// Invariant: `0 < low_band_frequency < high_band_frequency`, thresholds
/// within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridConfig {
    low_band_energy_threshold: f64,
    low_band_frequency: f64,
    high_band_energy_threshold: f64,
    high_band_frequency: f64,
}

impl Default for HybridConfig {
    fn default() -> Self {
        HybridConfig {
            low_band_energy_threshold: DEFAULT_LOW_BAND_ENERGY_THRESHOLD,
            low_band_frequency: DEFAULT_LOW_BAND_FREQUENCY,
            high_band_energy_threshold: DEFAULT_HIGH_BAND_ENERGY_THRESHOLD,
            high_band_frequency: DEFAULT_HIGH_BAND_FREQUENCY,
        }
    }
}

impl HybridConfig {
    pub fn low_band_energy_threshold(&self) -> f64 {
        self.low_band_energy_threshold
    }

    pub fn low_band_frequency(&self) -> f64 {
        self.low_band_frequency
    }

    pub fn high_band_energy_threshold(&self) -> f64 {
        self.high_band_energy_threshold
    }

    pub fn high_band_frequency(&self) -> f64 {
        self.high_band_frequency
    }

    pub fn set_low_band_energy_threshold(&mut self, threshold: f64) -> Result<(), Error> {
        Self::validate_threshold("low_band_energy_threshold", threshold)?;
        self.low_band_energy_threshold = threshold;
        Ok(())
    }

    pub fn set_high_band_energy_threshold(&mut self, threshold: f64) -> Result<(), Error> {
        Self::validate_threshold("high_band_energy_threshold", threshold)?;
        self.high_band_energy_threshold = threshold;
        Ok(())
    }

    /// Moves the low band's upper edge. Must stay below the high band edge.
    pub fn set_low_band_frequency(&mut self, frequency: f64) -> Result<(), Error> {
        if !(frequency > 0.0) || frequency >= self.high_band_frequency {
            return Err(Error::InvalidTunable {
                name: "low_band_frequency",
                value: frequency,
            });
        }
        self.low_band_frequency = frequency;
        Ok(())
    }

    /// Moves the high band's lower edge. Must stay above the low band edge.
    pub fn set_high_band_frequency(&mut self, frequency: f64) -> Result<(), Error> {
        if !frequency.is_finite() || frequency <= self.low_band_frequency {
            return Err(Error::InvalidTunable {
                name: "high_band_frequency",
                value: frequency,
            });
        }
        self.high_band_frequency = frequency;
        Ok(())
    }

    fn validate_threshold(name: &'static str, threshold: f64) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidTunable {
                name,
                value: threshold,
            });
        }
        Ok(())
    }
}

/// The fractions of the in-window spectral energy below the low band edge
/// and above the high band edge. Both zero for a silent spectrum.
fn band_energy_fractions(
    spectrum: &[f64],
    fft_size: usize,
    sample_rate: u32,
    window: &FrequencyWindow,
    config: &HybridConfig,
) -> (f64, f64) {
    let hz_per_bin = sample_rate as f64 / fft_size as f64;
    let min_bin = ((window.min_frequency() / hz_per_bin).ceil() as usize).max(1);
    let max_bin = ((window.max_frequency() / hz_per_bin).floor() as usize)
        .min(spectrum.len().saturating_sub(1));
    if min_bin > max_bin {
        return (0.0, 0.0);
    }

    let mut total = 0.0;
    let mut low = 0.0;
    let mut high = 0.0;
    for bin in min_bin..=max_bin {
        let energy = spectrum[bin] * spectrum[bin];
        let frequency = bin as f64 * hz_per_bin;
        total += energy;
        if frequency <= config.low_band_frequency {
            low += energy;
        }
        if frequency >= config.high_band_frequency {
            high += energy;
        }
    }
    if total <= 0.0 {
        return (0.0, 0.0);
    }
    (low / total, high / total)
}

/// Runs hybrid pitch detection on `samples`.
pub fn detect(
    samples: &[f64],
    sample_rate: u32,
    window: &FrequencyWindow,
    config: &HybridConfig,
) -> Result<PitchDetectionResult, Error> {
    validate_input(samples, sample_rate)?;

    let fft_size = next_pow2(samples.len()).max(MIN_FFT_SIZE);
    let spectrum = magnitude_spectrum(samples, fft_size);
    let rough = detect_from_spectrum(&spectrum, fft_size, sample_rate, window);

    if !rough.is_pitch_detected() {
        // No rough estimate to route on. Try the time-domain engines in
        // the order the window makes plausible.
        debug!("hybrid: no rough spectral estimate, trying time-domain engines");
        if window.min_frequency() < config.low_band_frequency {
            let result = yin::detect(samples, sample_rate, window)?;
            if result.is_pitch_detected() {
                return Ok(result);
            }
        }
        return mpm::detect(samples, sample_rate, window);
    }

    let (low_fraction, high_fraction) =
        band_energy_fractions(&spectrum, fft_size, sample_rate, window, config);

    if rough.pitch < config.low_band_frequency
        && low_fraction >= config.low_band_energy_threshold
    {
        debug!(
            "hybrid: rough estimate {:.1} Hz, low band fraction {:.3}, using YIN",
            rough.pitch, low_fraction
        );
        let result = yin::detect(samples, sample_rate, window)?;
        if result.is_pitch_detected() {
            return Ok(result);
        }
        return Ok(rough);
    }

    if rough.pitch > config.high_band_frequency
        && high_fraction >= config.high_band_energy_threshold
    {
        debug!(
            "hybrid: rough estimate {:.1} Hz, high band fraction {:.3}, keeping spectral",
            rough.pitch, high_fraction
        );
        return Ok(rough);
    }

    debug!("hybrid: rough estimate {:.1} Hz, using MPM", rough.pitch);
    let result = mpm::detect(samples, sample_rate, window)?;
    if result.is_pitch_detected() {
        return Ok(result);
    }
    Ok(rough)
}
