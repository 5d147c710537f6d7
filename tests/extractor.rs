use approx::assert_abs_diff_eq;
use vocalyzer::{analyze_features, AnalysisConfig, AudioData, FeatureExtractor};

const SAMPLE_RATE: u32 = 22_050;

fn sine_clip(freq: f64, seconds: f64, amplitude: f32) -> Vec<f32> {
    let total = (SAMPLE_RATE as f64 * seconds) as usize;
    (0..total)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE as f64;
            ((2.0 * std::f64::consts::PI * freq * t).sin() as f32) * amplitude
        })
        .collect()
}

#[test]
fn silence_yields_the_full_fallback_feature_set() {
    let samples = vec![0.0f32; SAMPLE_RATE as usize * 3];
    let report = analyze_features(&samples, SAMPLE_RATE, true);

    assert_abs_diff_eq!(report.duration_seconds, 3.0, epsilon = 1e-9);

    // Neutral pitch profile: no voiced frames exist in silence.
    assert_abs_diff_eq!(report.avg_pitch_hz, 200.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.pitch_std_hz, 50.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.pitch_min_hz, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.pitch_max_hz, 400.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.pitch_accuracy_cents, 30.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.high_note_stability, 0.7, epsilon = 1e-9);
    assert_abs_diff_eq!(report.high_threshold_hz, 300.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.low_threshold_hz, 150.0, epsilon = 1e-9);

    // A flat signal has no dynamics, no pulse, and no phrases.
    assert_abs_diff_eq!(report.dynamic_range_db, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.dynamic_score, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.rhythm_offset_ms, 50.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.tempo_bpm, 120.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.breath_phrase_length_seconds, 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.breath_support_score, 1.0 / 6.0, epsilon = 1e-9);

    // An empty spectrum reads as maximally warm and minimally clear.
    assert_abs_diff_eq!(report.spectral_centroid_hz, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(report.warmth_score, 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(report.articulation_clarity, 0.0, epsilon = 1e-6);

    assert!(!report.is_intentional_vibrato);

    let series = report.time_series.expect("time series was requested");
    assert_eq!(series.waveform.len(), samples.len());
    assert_eq!(series.f0_hz.len(), series.f0_times.len());
    assert_eq!(series.rms.len(), series.rms_times.len());
    assert_eq!(series.rms.len(), series.rms_db.len());
    assert_eq!(series.centroid_hz.len(), series.centroid_times.len());
    assert_eq!(series.zcr.len(), series.zcr_times.len());
}

#[test]
fn short_and_empty_input_do_not_panic() {
    let report = analyze_features(&[], SAMPLE_RATE, true);
    assert_abs_diff_eq!(report.duration_seconds, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(report.avg_pitch_hz, 200.0, epsilon = 1e-9);

    let report = analyze_features(&[0.1, -0.1, 0.05], SAMPLE_RATE, false);
    assert_abs_diff_eq!(report.rhythm_offset_ms, 50.0, epsilon = 1e-9);
    assert!(report.time_series.is_none());
}

#[test]
fn steady_tone_recovers_its_frequency() {
    let samples = sine_clip(220.0, 3.0, 0.4);
    let report = analyze_features(&samples, SAMPLE_RATE, false);

    // 220 Hz sits exactly on A3, so both the mean and the cents error
    // should land close to the grid.
    assert!(
        (report.avg_pitch_hz - 220.0).abs() < 10.0,
        "avg_pitch_hz={}",
        report.avg_pitch_hz
    );
    assert!(report.pitch_std_hz < 10.0, "pitch_std_hz={}", report.pitch_std_hz);
    assert!(
        report.pitch_accuracy_cents < 25.0,
        "accuracy={}",
        report.pitch_accuracy_cents
    );
    assert!(report.pitch_range_semitones < 2.0);
    assert!(report.voiced_ratio > 0.5);

    // A dead-steady tone is stability, not vibrato.
    assert!(!report.is_intentional_vibrato);
    assert!(report.vibrato_ratio < 0.5, "ratio={}", report.vibrato_ratio);
}

#[test]
fn identical_input_yields_identical_reports() {
    let samples = sine_clip(330.0, 2.0, 0.3);
    let first = analyze_features(&samples, SAMPLE_RATE, true);
    let second = analyze_features(&samples, SAMPLE_RATE, true);
    assert_eq!(first, second);
}

#[test]
fn custom_config_thresholds_flow_through() {
    let mut config = AnalysisConfig::default();
    config.breath_floor_seconds = 0.0;
    config.breath_ceiling_seconds = 3.0;
    let extractor = FeatureExtractor::with_config(config);

    let audio = AudioData {
        samples: vec![0.0f32; SAMPLE_RATE as usize],
        sample_rate: SAMPLE_RATE,
    };
    let report = extractor.extract(&audio, false);
    // Neutral 3 s phrase length against a 0-3 s band saturates the score.
    assert_abs_diff_eq!(report.breath_support_score, 1.0, epsilon = 1e-9);
}
