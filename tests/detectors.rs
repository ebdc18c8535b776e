use harp_pitch::{detect_chord, Algorithm, PitchDetector};
use rand::Rng;
use rand_pcg::Pcg32;

const SAMPLE_RATE: u32 = 44100;

fn sine(frequency: f64, length: usize, amplitude: f64) -> Vec<f64> {
    (0..length)
        .map(|i| {
            amplitude
                * (2.0 * std::f64::consts::PI * frequency * i as f64 / SAMPLE_RATE as f64).sin()
        })
        .collect()
}

fn mix(components: &[(f64, f64)], length: usize) -> Vec<f64> {
    let mut buffer = vec![0.0; length];
    for (frequency, amplitude) in components {
        for (sample, tone) in buffer.iter_mut().zip(sine(*frequency, length, *amplitude)) {
            *sample += tone;
        }
    }
    buffer
}

fn cents_off(detected: f64, expected: f64) -> f64 {
    (1200.0 * (detected / expected).log2()).abs()
}

#[test]
fn every_engine_masks_a_tone_below_the_window() {
    let mut detector = PitchDetector::new();
    detector.set_min_frequency(200.0).unwrap();
    detector.set_max_frequency(1000.0).unwrap();

    let rumble = sine(100.0, 8192, 0.8);
    for algorithm in [
        Algorithm::Yin,
        Algorithm::Mpm,
        Algorithm::Spectral,
        Algorithm::Hybrid,
    ] {
        let result = detector
            .detect_pitch_with(algorithm, &rumble, SAMPLE_RATE)
            .unwrap();
        assert!(
            !result.is_pitch_detected(),
            "{} reported {} Hz for an out-of-window tone",
            algorithm,
            result.pitch
        );
    }
}

#[test]
fn the_louder_tone_of_a_two_tone_mix_wins() {
    let detector = PitchDetector::new();

    // Strong high tone over a weak low one.
    let buffer = mix(&[(934.6, 1.0), (460.0, 0.3)], 8192);
    for algorithm in [Algorithm::Mpm, Algorithm::Hybrid] {
        let result = detector
            .detect_pitch_with(algorithm, &buffer, SAMPLE_RATE)
            .unwrap();
        assert!(result.is_pitch_detected());
        assert!(
            cents_off(result.pitch, 934.6) < 20.0,
            "{} reported {} Hz",
            algorithm,
            result.pitch
        );
    }

    // Same pair with the amplitudes swapped.
    let buffer = mix(&[(934.6, 0.3), (460.0, 1.0)], 8192);
    for algorithm in [Algorithm::Mpm, Algorithm::Hybrid] {
        let result = detector
            .detect_pitch_with(algorithm, &buffer, SAMPLE_RATE)
            .unwrap();
        assert!(result.is_pitch_detected());
        assert!(
            cents_off(result.pitch, 460.0) < 20.0,
            "{} reported {} Hz",
            algorithm,
            result.pitch
        );
    }
}

#[test]
fn engines_agree_on_pure_tones() {
    let detector = PitchDetector::new();
    for frequency in [200.0, 440.0, 880.0] {
        let buffer = sine(frequency, 8192, 0.8);
        for algorithm in [
            Algorithm::Yin,
            Algorithm::Mpm,
            Algorithm::Spectral,
            Algorithm::Hybrid,
        ] {
            let result = detector
                .detect_pitch_with(algorithm, &buffer, SAMPLE_RATE)
                .unwrap();
            assert!(result.is_pitch_detected());
            assert!(
                cents_off(result.pitch, frequency) < 15.0,
                "{} reported {} Hz for {} Hz",
                algorithm,
                result.pitch,
                frequency
            );
        }
    }
}

#[test]
fn c_major_chord_through_the_facade() {
    let detector = PitchDetector::new();
    let buffer = mix(&[(261.63, 0.5), (329.63, 0.5), (392.0, 0.5)], 16384);
    let result = detector.detect_chord(&buffer, SAMPLE_RATE).unwrap();
    assert_eq!(result.pitch_count(), 3, "got {:?}", result.pitches);
    for (detected, expected) in result.pitches.iter().zip([261.63, 329.63, 392.0]) {
        assert!(
            (detected - expected).abs() < 2.0,
            "detected {} Hz, expected {} Hz",
            detected,
            expected
        );
    }
    assert!(result.confidence > 0.8, "confidence {}", result.confidence);
    assert_eq!(result.dominant_pitch().pitch, result.pitches[0]);
}

#[test]
fn yin_rides_out_a_noisy_take() {
    let detector = PitchDetector::new();
    let mut rng = Pcg32::new(0x4d59_5df4_d0f3_3173, 0x9fb2_1c65_1a93_31be);
    let mut buffer = sine(934.6, 44100, 0.8);
    for sample in buffer.iter_mut() {
        *sample += rng.gen_range(-0.08..0.08);
    }
    let result = detector.detect_pitch_yin(&buffer, SAMPLE_RATE).unwrap();
    assert!(result.is_pitch_detected());
    assert!(
        (result.pitch - 934.6).abs() < 0.5,
        "reported {} Hz",
        result.pitch
    );
    assert!(result.confidence > 0.6, "confidence {}", result.confidence);
}

#[test]
fn free_function_chord_detection_uses_the_default_window() {
    let buffer = mix(&[(440.0, 0.6), (554.37, 0.6)], 16384);
    let result = detect_chord(&buffer, SAMPLE_RATE).unwrap();
    assert_eq!(result.pitch_count(), 2, "got {:?}", result.pitches);
    assert!((result.pitches[0] - 440.0).abs() < 2.0);
    assert!((result.pitches[1] - 554.37).abs() < 2.0);
}

#[test]
fn hybrid_stays_accurate_while_the_tunables_move() {
    let mut detector = PitchDetector::new();
    for threshold in [0.0, 0.5, 1.0] {
        detector
            .hybrid_config_mut()
            .set_low_band_energy_threshold(threshold)
            .unwrap();
        detector
            .hybrid_config_mut()
            .set_high_band_energy_threshold(threshold)
            .unwrap();
        for frequency in [150.0, 630.0, 2000.0] {
            let buffer = sine(frequency, 8192, 0.8);
            let result = detector.detect_pitch_hybrid(&buffer, SAMPLE_RATE).unwrap();
            assert!(result.is_pitch_detected());
            assert!(
                cents_off(result.pitch, frequency) < 1.0,
                "{} Hz reported for {} Hz at threshold {}",
                result.pitch,
                frequency,
                threshold
            );
        }
    }
}
