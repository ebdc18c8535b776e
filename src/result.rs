/// The pitch value reported when no fundamental frequency was detected.
pub const NO_DETECTED_PITCH: f64 = -1.0;

/// A single-pitch detection result.
///
/// `pitch` is either [`NO_DETECTED_PITCH`] or a frequency inside the
/// [`FrequencyWindow`](crate::FrequencyWindow) that was active for the call.
/// `confidence` is between 0 and 1 (inclusive); values close to 1 indicate
/// pure tones, 0 means nothing discernable was found. It is an estimator
/// certainty, not a probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchDetectionResult {
    /// The estimated fundamental frequency in Hz.
    pub pitch: f64,
    /// Estimator certainty between 0 and 1 (inclusive).
    pub confidence: f64,
}

impl PitchDetectionResult {
    pub fn new(pitch: f64, confidence: f64) -> Self {
        PitchDetectionResult { pitch, confidence }
    }

    /// The result reported when no pitch was detected.
    pub fn none() -> Self {
        PitchDetectionResult {
            pitch: NO_DETECTED_PITCH,
            confidence: 0.0,
        }
    }

    /// Indicates whether a pitch was detected.
    pub fn is_pitch_detected(&self) -> bool {
        self.pitch != NO_DETECTED_PITCH
    }
}

/// A multi-pitch (chord) detection result.
///
/// `pitches` holds the surviving fundamentals in ascending frequency order,
/// at most [`MAX_PITCHES`](crate::chord::MAX_PITCHES) of them. Silence and
/// noise yield an empty result rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordDetectionResult {
    /// The detected fundamental frequencies in Hz, ascending.
    pub pitches: Vec<f64>,
    /// Aggregate spectral peak clarity between 0 and 1 (inclusive).
    pub confidence: f64,
}

impl ChordDetectionResult {
    pub fn new(pitches: Vec<f64>, confidence: f64) -> Self {
        ChordDetectionResult {
            pitches,
            confidence,
        }
    }

    /// The result reported when no pitches were detected.
    pub fn empty() -> Self {
        ChordDetectionResult {
            pitches: Vec::new(),
            confidence: 0.0,
        }
    }

    /// Indicates whether at least one pitch was detected.
    pub fn has_pitches(&self) -> bool {
        !self.pitches.is_empty()
    }

    /// The number of detected pitches.
    pub fn pitch_count(&self) -> usize {
        self.pitches.len()
    }

    /// The strongest single-pitch view of this chord: the lowest surviving
    /// fundamental with the chord's confidence, or the sentinel result when
    /// the chord is empty.
    pub fn dominant_pitch(&self) -> PitchDetectionResult {
        match self.pitches.first() {
            Some(&pitch) => PitchDetectionResult::new(pitch, self.confidence),
            None => PitchDetectionResult::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_result_has_no_pitch() {
        let result = PitchDetectionResult::none();
        assert_eq!(result.pitch, NO_DETECTED_PITCH);
        assert_eq!(result.confidence, 0.0);
        assert!(!result.is_pitch_detected());
    }

    #[test]
    fn chord_result_accessors() {
        let empty = ChordDetectionResult::empty();
        assert!(!empty.has_pitches());
        assert_eq!(empty.pitch_count(), 0);
        assert!(!empty.dominant_pitch().is_pitch_detected());

        let chord = ChordDetectionResult::new(vec![261.63, 329.63, 392.0], 0.9);
        assert!(chord.has_pitches());
        assert_eq!(chord.pitch_count(), 3);
        let dominant = chord.dominant_pitch();
        assert_eq!(dominant.pitch, 261.63);
        assert_eq!(dominant.confidence, 0.9);
    }
}
