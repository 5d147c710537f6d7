//! Pitch tracking and voiced-pitch statistics

use aus::analysis;

use crate::analysis::stats::{hz_to_midi, mean, percentile, population_std};
use crate::config::AnalysisConfig;

// Neutral profile substituted when no voiced frames were detected. The
// values describe an unremarkable mid-range vocal take so downstream
// scoring stays in bounds on silent or non-vocal input.
const NEUTRAL_MEAN_HZ: f64 = 200.0;
const NEUTRAL_STD_HZ: f64 = 50.0;
const NEUTRAL_MIN_HZ: f64 = 100.0;
const NEUTRAL_MAX_HZ: f64 = 400.0;
const NEUTRAL_RANGE_SEMITONES: f64 = 20.0;
const NEUTRAL_ACCURACY_CENTS: f64 = 30.0;
const NEUTRAL_TENDENCY: f64 = 0.3;
const NEUTRAL_REGISTER_RATIO: f64 = 0.2;
const NEUTRAL_HIGH_STABILITY: f64 = 0.7;
const SPARSE_HIGH_STABILITY: f64 = 0.6;
const NEUTRAL_HIGH_THRESHOLD_HZ: f64 = 300.0;
const NEUTRAL_LOW_THRESHOLD_HZ: f64 = 150.0;
const NEUTRAL_VOICED_RATIO: f64 = 0.7;

const EPSILON: f64 = 1e-6;

/// Fundamental-frequency track over the whole recording.
///
/// Frames where no pitch was confidently detected keep their slot as `None`
/// so the time axis stays aligned with the recording.
#[derive(Debug, Clone, Default)]
pub(crate) struct PitchTrack {
    pub f0_hz: Vec<Option<f64>>,
    pub times: Vec<f64>,
    pub voiced_hz: Vec<f64>,
    pub frames_per_second: f64,
}

impl PitchTrack {
    /// Fraction of frames carrying a confident pitch. Defaults to a neutral
    /// ratio when the track itself is empty.
    pub(crate) fn voiced_ratio(&self) -> f64 {
        if self.f0_hz.is_empty() {
            return NEUTRAL_VOICED_RATIO;
        }
        self.voiced_hz.len() as f64 / self.f0_hz.len() as f64
    }
}

/// Run the pyin estimator constrained to the vocal range.
pub(crate) fn track_pitch(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> PitchTrack {
    let fallback_fps = config.frames_per_second();
    if samples.len() < config.pitch_frame_size || sample_rate == 0 {
        return PitchTrack {
            frames_per_second: fallback_fps,
            ..PitchTrack::default()
        };
    }

    let audio: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
    let (_timestamps, pitches, voiced_flags, _confidence) = analysis::pyin_pitch_estimator(
        &audio,
        sample_rate,
        config.pitch_min_hz,
        config.pitch_max_hz,
        config.pitch_frame_size,
    );

    let f0_hz: Vec<Option<f64>> = pitches
        .iter()
        .zip(voiced_flags.iter())
        .map(|(&pitch, &flag)| (flag && pitch.is_finite() && pitch > 0.0).then_some(pitch))
        .collect();
    let voiced_hz: Vec<f64> = f0_hz.iter().flatten().copied().collect();

    // The estimator owns its internal hop, so derive the frame rate from
    // how many frames it produced instead of assuming one.
    let duration = samples.len() as f64 / sample_rate as f64;
    let frames_per_second = if !f0_hz.is_empty() && duration > 0.0 {
        f0_hz.len() as f64 / duration
    } else {
        fallback_fps
    };
    let times = (0..f0_hz.len())
        .map(|i| i as f64 / frames_per_second)
        .collect();

    PitchTrack {
        f0_hz,
        times,
        voiced_hz,
        frames_per_second,
    }
}

/// Scalar pitch statistics over the voiced frames of one recording.
#[derive(Debug, Clone)]
pub(crate) struct PitchStats {
    pub mean_hz: f64,
    pub std_hz: f64,
    pub min_hz: f64,
    pub max_hz: f64,
    pub range_semitones: f64,
    pub accuracy_cents: f64,
    pub stability: f64,
    pub flat_tendency: f64,
    pub sharp_tendency: f64,
    pub high_ratio: f64,
    pub low_ratio: f64,
    pub high_note_stability: f64,
    pub high_threshold_hz: f64,
    pub low_threshold_hz: f64,
    pub errors_cents: Vec<f64>,
}

pub(crate) fn pitch_statistics(voiced_hz: &[f64], config: &AnalysisConfig) -> PitchStats {
    if voiced_hz.is_empty() {
        return neutral_stats();
    }

    let mean_hz = mean(voiced_hz);
    let std_hz = population_std(voiced_hz);
    let min_hz = voiced_hz.iter().copied().fold(f64::INFINITY, f64::min);
    let max_hz = voiced_hz.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range_semitones = hz_to_midi(max_hz) - hz_to_midi(min_hz);

    // Signed deviation from the nearest equal-tempered note, in cents.
    let errors_cents: Vec<f64> = voiced_hz
        .iter()
        .map(|&hz| {
            let midi = hz_to_midi(hz);
            (midi - midi.round()) * 100.0
        })
        .collect();
    let accuracy_cents = mean(&errors_cents.iter().map(|e| e.abs()).collect::<Vec<_>>());
    let frame_count = errors_cents.len() as f64;
    let flat_tendency = errors_cents
        .iter()
        .filter(|&&e| e < -config.cents_tolerance)
        .count() as f64
        / frame_count;
    let sharp_tendency = errors_cents
        .iter()
        .filter(|&&e| e > config.cents_tolerance)
        .count() as f64
        / frame_count;

    let high_threshold_hz = percentile(voiced_hz, config.high_register_percentile);
    let low_threshold_hz = percentile(voiced_hz, config.low_register_percentile);
    let high_ratio = voiced_hz.iter().filter(|&&hz| hz > high_threshold_hz).count() as f64
        / voiced_hz.len() as f64;
    let low_ratio = voiced_hz.iter().filter(|&&hz| hz < low_threshold_hz).count() as f64
        / voiced_hz.len() as f64;

    let high_notes_midi: Vec<f64> = voiced_hz
        .iter()
        .filter(|&&hz| hz > high_threshold_hz)
        .map(|&hz| hz_to_midi(hz))
        .collect();
    let high_note_stability = if high_notes_midi.len() > config.high_note_min_frames {
        stability_from_spread(population_std(&high_notes_midi), config)
    } else {
        SPARSE_HIGH_STABILITY
    };

    PitchStats {
        mean_hz,
        std_hz,
        min_hz,
        max_hz,
        range_semitones,
        accuracy_cents,
        stability: 1.0 - std_hz / (mean_hz + EPSILON),
        flat_tendency,
        sharp_tendency,
        high_ratio,
        low_ratio,
        high_note_stability,
        high_threshold_hz,
        low_threshold_hz,
        errors_cents,
    }
}

/// Map the semitone spread of the high register onto [floor, 1].
///
/// Measured in semitones rather than Hz so a wobbly tenor and a wobbly
/// soprano score the same.
fn stability_from_spread(std_semitones: f64, config: &AnalysisConfig) -> f64 {
    let raw = 1.0 - std_semitones / config.high_note_stability_span;
    raw.clamp(config.high_note_stability_floor, 1.0)
}

fn neutral_stats() -> PitchStats {
    PitchStats {
        mean_hz: NEUTRAL_MEAN_HZ,
        std_hz: NEUTRAL_STD_HZ,
        min_hz: NEUTRAL_MIN_HZ,
        max_hz: NEUTRAL_MAX_HZ,
        range_semitones: NEUTRAL_RANGE_SEMITONES,
        accuracy_cents: NEUTRAL_ACCURACY_CENTS,
        stability: 1.0 - NEUTRAL_STD_HZ / (NEUTRAL_MEAN_HZ + EPSILON),
        flat_tendency: NEUTRAL_TENDENCY,
        sharp_tendency: NEUTRAL_TENDENCY,
        high_ratio: NEUTRAL_REGISTER_RATIO,
        low_ratio: NEUTRAL_REGISTER_RATIO,
        high_note_stability: NEUTRAL_HIGH_STABILITY,
        high_threshold_hz: NEUTRAL_HIGH_THRESHOLD_HZ,
        low_threshold_hz: NEUTRAL_LOW_THRESHOLD_HZ,
        errors_cents: vec![0.0],
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::{pitch_statistics, stability_from_spread};
    use crate::config::AnalysisConfig;

    #[test]
    fn empty_track_uses_neutral_profile() {
        let stats = pitch_statistics(&[], &AnalysisConfig::default());
        assert_abs_diff_eq!(stats.mean_hz, 200.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.std_hz, 50.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.high_note_stability, 0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.high_threshold_hz, 300.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.low_threshold_hz, 150.0, epsilon = 1e-12);
    }

    #[test]
    fn perfectly_tuned_notes_have_zero_error() {
        // A3 and A4 sit exactly on the equal-tempered grid.
        let voiced: Vec<f64> = std::iter::repeat(220.0)
            .take(30)
            .chain(std::iter::repeat(440.0).take(30))
            .collect();
        let stats = pitch_statistics(&voiced, &AnalysisConfig::default());
        assert!(stats.accuracy_cents < 1e-6);
        assert_abs_diff_eq!(stats.flat_tendency, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.sharp_tendency, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.range_semitones, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn stability_spread_is_clamped_to_floor() {
        let config = AnalysisConfig::default();
        assert_abs_diff_eq!(stability_from_spread(5.0, &config), 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(stability_from_spread(0.5, &config), 0.875, epsilon = 1e-12);
        assert_abs_diff_eq!(stability_from_spread(0.0, &config), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn sparse_high_register_defaults_to_neutral_stability() {
        // Ten or fewer frames above the 75th percentile is too little data.
        let mut voiced = vec![150.0; 30];
        voiced.extend([160.0, 160.0]);
        voiced.extend(vec![600.0; 8]);
        let stats = pitch_statistics(&voiced, &AnalysisConfig::default());
        assert_abs_diff_eq!(stats.high_note_stability, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn wild_high_register_hits_the_floor() {
        let mut voiced = vec![150.0; 75];
        voiced.extend((0..25).map(|k| 300.0 + 20.0 * k as f64));
        let stats = pitch_statistics(&voiced, &AnalysisConfig::default());
        assert_abs_diff_eq!(stats.high_note_stability, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn steady_high_register_scores_high() {
        let mut voiced = vec![150.0; 75];
        voiced.extend((0..25).map(|k| 330.0 + 0.2 * (k % 5) as f64));
        let stats = pitch_statistics(&voiced, &AnalysisConfig::default());
        assert!(stats.high_note_stability > 0.9);
    }
}
