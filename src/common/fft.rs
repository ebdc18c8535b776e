use realfft::RealFftPlanner;
use rustfft::num_complex::Complex;

/// The smallest power of two that is >= `n` (and >= 16, realfft sizes below
/// that are not worth planning).
pub fn next_pow2(n: usize) -> usize {
    let mut result: usize = 16;
    while result < n {
        result <<= 1;
    }
    result
}

/// Forward real FFT of `input` zero-padded to `fft_size`.
///
/// Returns the `fft_size / 2 + 1` non-redundant bins.
///
/// # Panics
/// If `input` is longer than `fft_size`.
pub fn real_fft(input: &[f64], fft_size: usize) -> Vec<Complex<f64>> {
    if input.len() > fft_size {
        panic!(
            "FFT input of length {} does not fit fft size {}",
            input.len(),
            fft_size
        );
    }

    let fft = RealFftPlanner::<f64>::new().plan_fft_forward(fft_size);
    let mut buffer = fft.make_input_vec();
    buffer[..input.len()].copy_from_slice(input);

    let mut spectrum = fft.make_output_vec();
    fft.process(&mut buffer, &mut spectrum)
        .expect("buffer lengths match the planned FFT size");
    spectrum
}

/// Inverse real FFT. `spectrum` must hold `fft_size / 2 + 1` bins; the
/// output is *not* scaled, i.e. a forward/inverse round trip gains a factor
/// of `fft_size`.
pub fn inverse_real_fft(spectrum: &mut [Complex<f64>], fft_size: usize) -> Vec<f64> {
    // The DC and Nyquist bins of a real signal's spectrum are real; zero
    // any rounding residue in their imaginary parts, which realfft rejects.
    if let Some(first) = spectrum.first_mut() {
        first.im = 0.0;
    }
    if let Some(last) = spectrum.last_mut() {
        last.im = 0.0;
    }
    let ifft = RealFftPlanner::<f64>::new().plan_fft_inverse(fft_size);
    let mut output = ifft.make_output_vec();
    ifft.process(spectrum, &mut output)
        .expect("buffer lengths match the planned FFT size");
    output
}

/// Applies a Hann window in place, tapering the buffer to zero at both ends
/// to reduce spectral leakage.
pub fn apply_hann_window(buffer: &mut [f64]) {
    let n = buffer.len();
    if n < 2 {
        return;
    }
    let scale = 2.0 * std::f64::consts::PI / (n - 1) as f64;
    for (i, sample) in buffer.iter_mut().enumerate() {
        *sample *= 0.5 * (1.0 - (scale * i as f64).cos());
    }
}

/// Computes the magnitude spectrum of `samples`: Hann window, zero-pad to
/// `fft_size`, forward FFT, per-bin magnitude. The result has
/// `fft_size / 2 + 1` bins with a resolution of `sample_rate / fft_size` Hz
/// per bin.
pub fn magnitude_spectrum(samples: &[f64], fft_size: usize) -> Vec<f64> {
    let mut windowed = samples.to_vec();
    apply_hann_window(&mut windowed);
    real_fft(&windowed, fft_size)
        .iter()
        .map(|bin| bin.norm())
        .collect()
}
