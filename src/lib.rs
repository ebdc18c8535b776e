//! Pitch and chord estimation for harmonica audio.
//!
//! Four single-pitch engines and one multi-pitch detector operate on plain
//! `f64` sample buffers:
//!
//! * [`yin`]: time domain detection via the cumulative mean normalized
//!   difference function. Strong at the bottom of the range.
//! * [`mpm`]: the McLeod pitch method, peak picking on the normalized
//!   square difference function. The general purpose workhorse.
//! * [`spectral`]: FFT peak picking with parabolic bin refinement. Strong
//!   at the top of the range, where time domain lags get too short.
//! * [`hybrid`]: routes each buffer to one of the above based on where its
//!   spectral energy sits, with fallbacks.
//! * [`chord`]: multi-pitch detection for double stops and chords, up to
//!   four simultaneous notes.
//!
//! The [`PitchDetector`] facade bundles a [`FrequencyWindow`], the hybrid
//! routing tunables and a pluggable [`ChordDetector`] implementation:
//!
//! ```
//! use harp_pitch::PitchDetector;
//!
//! let sample_rate = 44100;
//! let samples: Vec<f64> = (0..4096)
//!     .map(|i| (2.0 * std::f64::consts::PI * 523.25 * i as f64 / sample_rate as f64).sin())
//!     .collect();
//!
//! let detector = PitchDetector::new();
//! let result = detector.detect_pitch_mpm(&samples, sample_rate).unwrap();
//! assert!(result.is_pitch_detected());
//! assert!((result.pitch - 523.25).abs() < 1.0);
//! ```
//!
//! Detection failure (silence, noise, nothing in the window) is reported
//! through sentinel results, not errors; [`Error`] is reserved for
//! malformed input and configuration. The engines are stateless functions,
//! so one buffer can be analyzed by several engines, or several buffers in
//! parallel, without shared state.

pub mod chord;
pub mod common;
mod config;
mod detector;
mod error;
pub mod hybrid;
pub mod mpm;
mod result;
pub mod spectral;
pub mod yin;

pub use chord::{ChordDetector, SpectralChordDetector, MAX_PITCHES};
pub use config::{FrequencyWindow, DEFAULT_MAX_FREQUENCY, DEFAULT_MIN_FREQUENCY};
pub use detector::{detect_chord, Algorithm, PitchDetector};
pub use error::Error;
pub use hybrid::HybridConfig;
pub use result::{ChordDetectionResult, PitchDetectionResult, NO_DETECTED_PITCH};
