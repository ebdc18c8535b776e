//! Shared DSP building blocks used by the detection engines.

pub mod autocorr;
pub mod fft;
pub mod math;

pub use math::{add_cents, cents_between, parabolic_interpolation, rms};
