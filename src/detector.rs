use std::fmt;
use std::str::FromStr;

use crate::chord::{ChordDetector, SpectralChordDetector};
use crate::config::{FrequencyWindow, DEFAULT_MAX_FREQUENCY, DEFAULT_MIN_FREQUENCY};
use crate::error::Error;
use crate::hybrid::HybridConfig;
use crate::result::{ChordDetectionResult, PitchDetectionResult};
use crate::{chord, hybrid, mpm, spectral, yin};

/// The available single-pitch detection algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Yin,
    Mpm,
    Spectral,
    Hybrid,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Yin => "yin",
            Algorithm::Mpm => "mpm",
            Algorithm::Spectral => "spectral",
            Algorithm::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Error> {
        match name.to_ascii_lowercase().as_str() {
            "yin" => Ok(Algorithm::Yin),
            "mpm" => Ok(Algorithm::Mpm),
            "spectral" | "fft" => Ok(Algorithm::Spectral),
            "hybrid" => Ok(Algorithm::Hybrid),
            _ => Err(Error::UnknownAlgorithm(name.to_string())),
        }
    }
}

/// The top level entry point: a frequency window, the hybrid routing
/// tunables and a pluggable chord detector behind one facade.
///
/// ```
/// use harp_pitch::PitchDetector;
///
/// let sample_rate = 44100;
/// let samples: Vec<f64> = (0..4096)
///     .map(|i| (2.0 * std::f64::consts::PI * 440.0 * i as f64 / sample_rate as f64).sin())
///     .collect();
///
/// let detector = PitchDetector::new();
/// let result = detector.detect_pitch_hybrid(&samples, sample_rate).unwrap();
/// assert!(result.is_pitch_detected());
/// assert!((result.pitch - 440.0).abs() < 1.0);
/// ```
pub struct PitchDetector {
    window: FrequencyWindow,
    hybrid_config: HybridConfig,
    chord_detector: Box<dyn ChordDetector + Send + Sync>,
}

impl Default for PitchDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PitchDetector {
    /// A detector with the default frequency window, default hybrid
    /// tunables and the spectral chord detector.
    pub fn new() -> Self {
        Self::with_chord_detector(Box::new(SpectralChordDetector))
    }

    /// A detector with a caller-supplied chord detection implementation.
    pub fn with_chord_detector(chord_detector: Box<dyn ChordDetector + Send + Sync>) -> Self {
        PitchDetector {
            window: FrequencyWindow::default(),
            hybrid_config: HybridConfig::default(),
            chord_detector,
        }
    }

    /// The factory default lower bound of the frequency window, in Hz.
    pub fn default_min_frequency() -> f64 {
        DEFAULT_MIN_FREQUENCY
    }

    /// The factory default upper bound of the frequency window, in Hz.
    pub fn default_max_frequency() -> f64 {
        DEFAULT_MAX_FREQUENCY
    }

    pub fn window(&self) -> &FrequencyWindow {
        &self.window
    }

    pub fn min_frequency(&self) -> f64 {
        self.window.min_frequency()
    }

    pub fn max_frequency(&self) -> f64 {
        self.window.max_frequency()
    }

    pub fn set_min_frequency(&mut self, min_frequency: f64) -> Result<(), Error> {
        self.window.set_min_frequency(min_frequency)
    }

    pub fn set_max_frequency(&mut self, max_frequency: f64) -> Result<(), Error> {
        self.window.set_max_frequency(max_frequency)
    }

    pub fn hybrid_config(&self) -> &HybridConfig {
        &self.hybrid_config
    }

    pub fn hybrid_config_mut(&mut self) -> &mut HybridConfig {
        &mut self.hybrid_config
    }

    pub fn detect_pitch_yin(
        &self,
        samples: &[f64],
        sample_rate: u32,
    ) -> Result<PitchDetectionResult, Error> {
        yin::detect(samples, sample_rate, &self.window)
    }

    pub fn detect_pitch_mpm(
        &self,
        samples: &[f64],
        sample_rate: u32,
    ) -> Result<PitchDetectionResult, Error> {
        mpm::detect(samples, sample_rate, &self.window)
    }

    pub fn detect_pitch_spectral(
        &self,
        samples: &[f64],
        sample_rate: u32,
    ) -> Result<PitchDetectionResult, Error> {
        spectral::detect(samples, sample_rate, &self.window)
    }

    pub fn detect_pitch_hybrid(
        &self,
        samples: &[f64],
        sample_rate: u32,
    ) -> Result<PitchDetectionResult, Error> {
        hybrid::detect(samples, sample_rate, &self.window, &self.hybrid_config)
    }

    /// Dispatches to the named algorithm.
    pub fn detect_pitch_with(
        &self,
        algorithm: Algorithm,
        samples: &[f64],
        sample_rate: u32,
    ) -> Result<PitchDetectionResult, Error> {
        match algorithm {
            Algorithm::Yin => self.detect_pitch_yin(samples, sample_rate),
            Algorithm::Mpm => self.detect_pitch_mpm(samples, sample_rate),
            Algorithm::Spectral => self.detect_pitch_spectral(samples, sample_rate),
            Algorithm::Hybrid => self.detect_pitch_hybrid(samples, sample_rate),
        }
    }

    /// Runs the configured chord detector.
    pub fn detect_chord(
        &self,
        samples: &[f64],
        sample_rate: u32,
    ) -> Result<ChordDetectionResult, Error> {
        self.chord_detector
            .detect_chord(samples, sample_rate, &self.window)
    }
}

/// Convenience free function: chord detection with the default window and
/// the spectral implementation.
pub fn detect_chord(
    samples: &[f64],
    sample_rate: u32,
) -> Result<ChordDetectionResult, Error> {
    chord::detect(samples, sample_rate, &FrequencyWindow::default())
}
