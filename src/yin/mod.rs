//! YIN pitch detection.
//!
//! Searches the cumulative mean normalized difference function (CMNDF) of
//! the input for the first lag that dips below an RMS dependent threshold,
//! refines that lag with parabolic interpolation and converts it to a
//! frequency. The threshold is derived from the buffer's RMS level but
//! saturates at its cap for any signal in the nominal [-1, 1] range, so
//! in practice detection runs at the cap.

use crate::common::autocorr::difference_function;
use crate::common::math::{parabolic_interpolation, rms};
use crate::config::FrequencyWindow;
use crate::error::{validate_input, Error};
use crate::result::PitchDetectionResult;

/// How far outside the frequency window a raw estimate may land and still
/// be clamped to the nearest bound instead of being rejected.
pub(crate) const WINDOW_SLACK_CENTS: f64 = 25.0;

const BASE_THRESHOLD: f64 = 0.4;
const MAX_THRESHOLD: f64 = 0.5;

/// Computes the CMNDF of `samples` over a window of half the buffer length.
///
/// The value at lag 0 is defined as 1; for silent stretches where the
/// running mean is zero the normalized value is also pinned to 1 so that
/// silence never crosses the detection threshold.
pub fn cumulative_mean_normalized_difference(samples: &[f64]) -> Vec<f64> {
    let difference = difference_function(samples);
    let mut result = vec![1.0; difference.len()];
    let mut running_sum = 0.0;
    for (lag, d) in difference.iter().enumerate().skip(1) {
        running_sum += d;
        if running_sum > 0.0 {
            result[lag] = d * lag as f64 / running_sum;
        }
    }
    result
}

/// The CMNDF threshold for a buffer with the given RMS level. The RMS
/// scaling only pulls the threshold below the cap once the level exceeds
/// roughly 1.2, so normalized audio always detects at [`MAX_THRESHOLD`].
fn detection_threshold(rms_level: f64) -> f64 {
    (BASE_THRESHOLD * (1.0 + 0.3 / (rms_level + 0.01))).min(MAX_THRESHOLD)
}

/// Runs YIN pitch detection on `samples`.
///
/// Returns [`PitchDetectionResult::none`] when no lag in the window's
/// period range crosses the threshold, or when the refined estimate falls
/// outside the window by more than [`WINDOW_SLACK_CENTS`].
pub fn detect(
    samples: &[f64],
    sample_rate: u32,
    window: &FrequencyWindow,
) -> Result<PitchDetectionResult, Error> {
    validate_input(samples, sample_rate)?;

    let cmndf = cumulative_mean_normalized_difference(samples);
    let threshold = detection_threshold(rms(samples));

    let min_lag = ((sample_rate as f64 / window.max_frequency()).floor() as usize).max(2);
    let max_lag = ((sample_rate as f64 / window.min_frequency()).ceil() as usize)
        .min(cmndf.len().saturating_sub(1));
    if min_lag >= max_lag {
        return Ok(PitchDetectionResult::none());
    }

    let mut lag = min_lag;
    while lag <= max_lag {
        if cmndf[lag] < threshold {
            // Descend to the local minimum of the dip.
            while lag + 1 <= max_lag && cmndf[lag + 1] < cmndf[lag] {
                lag += 1;
            }
            let refined_lag = parabolic_interpolation(&cmndf, lag);
            let pitch = sample_rate as f64 / refined_lag;

            let ratio = cmndf[lag] / threshold;
            let confidence = (1.0 - ratio * ratio).clamp(0.0, 1.0);

            return Ok(match window.admit(pitch, WINDOW_SLACK_CENTS) {
                Some(admitted) => PitchDetectionResult::new(admitted, confidence),
                None => PitchDetectionResult::none(),
            });
        }
        lag += 1;
    }

    Ok(PitchDetectionResult::none())
}
