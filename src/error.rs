use thiserror::Error;

/// Errors for malformed input.
///
/// A detection *failure* (silence, noise, no discernable pitch) is not an
/// error: it yields a sentinel [`PitchDetectionResult`](crate::PitchDetectionResult)
/// or an empty chord result. Only input that violates the call contract is
/// rejected with one of these variants.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("audio buffer is empty")]
    EmptyBuffer,
    #[error("sample rate must be greater than zero")]
    ZeroSampleRate,
    #[error("invalid frequency window: min {min} Hz must be positive and less than max {max} Hz")]
    InvalidFrequencyWindow { min: f64, max: f64 },
    #[error("invalid value {value} for tunable `{name}`")]
    InvalidTunable { name: &'static str, value: f64 },
    #[error("unknown pitch detection algorithm `{0}`")]
    UnknownAlgorithm(String),
}

/// Checks the input contract shared by all detection entry points.
pub(crate) fn validate_input(samples: &[f64], sample_rate: u32) -> Result<(), Error> {
    if samples.is_empty() {
        return Err(Error::EmptyBuffer);
    }
    if sample_rate == 0 {
        return Err(Error::ZeroSampleRate);
    }
    Ok(())
}
