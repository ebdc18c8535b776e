use crate::common::add_cents;
use crate::error::Error;

/// The default minimum detectable frequency in Hz, just below the lowest
/// note of a low-tuned diatonic harmonica.
pub const DEFAULT_MIN_FREQUENCY: f64 = 80.0;

/// The default maximum detectable frequency in Hz, just above the highest
/// overblow of a high-tuned diatonic harmonica.
pub const DEFAULT_MAX_FREQUENCY: f64 = 4835.0;

/// The frequency band the detectors search for a fundamental.
///
/// A window is an ordinary value passed by reference into every detection
/// call, deliberately not process-wide state. A window that *is* shared
/// across threads (e.g. behind a lock) must not be mutated while another
/// thread is mid-detection, or the two calls may observe different bounds.
///
/// Invariant: `0 < min_frequency < max_frequency`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyWindow {
    min_frequency: f64,
    max_frequency: f64,
}

impl Default for FrequencyWindow {
    fn default() -> Self {
        FrequencyWindow {
            min_frequency: DEFAULT_MIN_FREQUENCY,
            max_frequency: DEFAULT_MAX_FREQUENCY,
        }
    }
}

impl FrequencyWindow {
    /// Creates a window with the given bounds.
    pub fn new(min_frequency: f64, max_frequency: f64) -> Result<Self, Error> {
        Self::validate(min_frequency, max_frequency)?;
        Ok(FrequencyWindow {
            min_frequency,
            max_frequency,
        })
    }

    /// The lower bound in Hz.
    pub fn min_frequency(&self) -> f64 {
        self.min_frequency
    }

    /// The upper bound in Hz.
    pub fn max_frequency(&self) -> f64 {
        self.max_frequency
    }

    /// Moves the lower bound, keeping the invariant `min < max`.
    pub fn set_min_frequency(&mut self, min_frequency: f64) -> Result<(), Error> {
        Self::validate(min_frequency, self.max_frequency)?;
        self.min_frequency = min_frequency;
        Ok(())
    }

    /// Moves the upper bound, keeping the invariant `min < max`.
    pub fn set_max_frequency(&mut self, max_frequency: f64) -> Result<(), Error> {
        Self::validate(self.min_frequency, max_frequency)?;
        self.max_frequency = max_frequency;
        Ok(())
    }

    /// Whether `frequency` lies inside the window (bounds included).
    pub fn contains(&self, frequency: f64) -> bool {
        frequency >= self.min_frequency && frequency <= self.max_frequency
    }

    /// Admits a pitch estimate into the window.
    ///
    /// Estimates inside the window pass through unchanged. An estimate that
    /// misses the window by at most `slack_cents` (search ranges extend
    /// slightly past the window, so an edge tone may refine to just outside
    /// it) is clamped onto the nearest bound. Anything further out is
    /// rejected.
    pub(crate) fn admit(&self, pitch: f64, slack_cents: f64) -> Option<f64> {
        if self.contains(pitch) {
            return Some(pitch);
        }
        if pitch > 0.0
            && pitch >= add_cents(self.min_frequency, -slack_cents)
            && pitch <= add_cents(self.max_frequency, slack_cents)
        {
            return Some(pitch.clamp(self.min_frequency, self.max_frequency));
        }
        None
    }

    fn validate(min: f64, max: f64) -> Result<(), Error> {
        if !(min > 0.0) || !(max > min) || !max.is_finite() {
            return Err(Error::InvalidFrequencyWindow { min, max });
        }
        Ok(())
    }
}
