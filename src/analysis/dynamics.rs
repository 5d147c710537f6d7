//! Short-time loudness contour and dynamic-range scoring

use crate::analysis::stats::{mean, percentile, population_std};
use crate::config::AnalysisConfig;

const EPSILON: f64 = 1e-6;

/// Frame-wise RMS loudness with both linear and dB views.
#[derive(Debug, Clone, Default)]
pub(crate) struct LoudnessContour {
    pub times: Vec<f64>,
    pub rms: Vec<f64>,
    pub rms_db: Vec<f64>,
    pub seconds_per_frame: f64,
}

pub(crate) fn loudness_contour(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> LoudnessContour {
    let seconds_per_frame = config.hop_size as f64 / sample_rate.max(1) as f64;
    let mut contour = LoudnessContour {
        seconds_per_frame,
        ..LoudnessContour::default()
    };
    if samples.is_empty() || sample_rate == 0 {
        return contour;
    }

    let mut start = 0usize;
    while start < samples.len() {
        let end = (start + config.frame_size).min(samples.len());
        let window = &samples[start..end];
        let energy: f64 = window.iter().map(|&s| (s as f64) * (s as f64)).sum();
        let rms = (energy / window.len() as f64).sqrt();
        contour.rms.push(rms);
        contour.rms_db.push(20.0 * (rms + config.db_floor).log10());
        contour.times.push(start as f64 / sample_rate as f64);
        start += config.hop_size;
    }
    contour
}

/// Scalar dynamics derived from the loudness contour.
#[derive(Debug, Clone)]
pub(crate) struct DynamicsStats {
    pub range_db: f64,
    pub score: f64,
    pub rms_db_max: f64,
    pub rms_db_mean: f64,
    pub rms_mean: f64,
    pub energy_variance: f64,
    pub climax_intensity: f64,
}

pub(crate) fn dynamics_statistics(
    contour: &LoudnessContour,
    config: &AnalysisConfig,
) -> DynamicsStats {
    if contour.rms.is_empty() {
        let silence_db = 20.0 * config.db_floor.log10();
        return DynamicsStats {
            range_db: 0.0,
            score: dynamic_score(0.0, config),
            rms_db_max: silence_db,
            rms_db_mean: silence_db,
            rms_mean: 0.0,
            energy_variance: 0.0,
            climax_intensity: 0.0,
        };
    }

    let rms_db_max = contour
        .rms_db
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    // The 10th percentile stands in for the quiet floor so a stretch of
    // near-silence cannot inflate the range.
    let range_db = rms_db_max - percentile(&contour.rms_db, 10.0);
    let rms_mean = mean(&contour.rms);
    let rms_max = contour.rms.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    DynamicsStats {
        range_db,
        score: dynamic_score(range_db, config),
        rms_db_max,
        rms_db_mean: mean(&contour.rms_db),
        rms_mean,
        energy_variance: population_std(&contour.rms),
        climax_intensity: rms_max / (rms_mean + EPSILON),
    }
}

/// Piecewise-linear map from dynamic range in dB to a 0-1 score.
///
/// 12-22 dB is the expressive sweet spot: below it the score climbs to 0.5,
/// inside it climbs to 1.0, and beyond it decays gently instead of clipping.
pub(crate) fn dynamic_score(range_db: f64, config: &AnalysisConfig) -> f64 {
    let low = config.dynamic_low_knee_db;
    let high = config.dynamic_high_knee_db;
    if range_db < low {
        (range_db / low) * 0.5
    } else if range_db <= high {
        0.5 + (range_db - low) / (high - low) * 0.5
    } else {
        (1.0 - (range_db - high) * config.dynamic_decay_per_db).max(config.dynamic_decay_floor)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::{dynamic_score, dynamics_statistics, loudness_contour};
    use crate::config::AnalysisConfig;

    #[test]
    fn score_hits_the_documented_checkpoints() {
        let config = AnalysisConfig::default();
        assert_abs_diff_eq!(dynamic_score(0.0, &config), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dynamic_score(6.0, &config), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(dynamic_score(12.0, &config), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(dynamic_score(17.0, &config), 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(dynamic_score(22.0, &config), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn score_is_monotone_up_to_the_high_knee_then_decays() {
        let config = AnalysisConfig::default();
        let mut previous = -1.0;
        for tenths in 0..=220 {
            let score = dynamic_score(tenths as f64 / 10.0, &config);
            assert!(score >= previous, "score regressed at {} dB", tenths as f64 / 10.0);
            previous = score;
        }
        assert_abs_diff_eq!(dynamic_score(25.0, &config), 0.94, epsilon = 1e-12);
        assert_abs_diff_eq!(dynamic_score(50.0, &config), 0.6, epsilon = 1e-12);
        assert!(dynamic_score(23.0, &config) <= dynamic_score(22.0, &config));
    }

    #[test]
    fn silence_yields_zero_range_and_score() {
        let config = AnalysisConfig::default();
        let contour = loudness_contour(&vec![0.0f32; 22_050], 22_050, &config);
        let stats = dynamics_statistics(&contour, &config);
        assert_abs_diff_eq!(stats.range_db, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.score, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.rms_db_max, -200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.climax_intensity, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn constant_tone_has_unit_climax_ratio() {
        let config = AnalysisConfig::default();
        let samples: Vec<f32> = (0..22_050)
            .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 22_050.0).sin() * 0.5)
            .collect();
        let contour = loudness_contour(&samples, 22_050, &config);
        let stats = dynamics_statistics(&contour, &config);
        assert!(stats.climax_intensity >= 1.0);
        assert!(stats.climax_intensity < 1.6);
    }

    #[test]
    fn contour_frame_count_covers_the_signal() {
        let config = AnalysisConfig::default();
        let contour = loudness_contour(&vec![0.1f32; 5000], 22_050, &config);
        assert_eq!(contour.rms.len(), 10); // ceil(5000 / 512)
        assert_abs_diff_eq!(contour.times[1] - contour.times[0], 512.0 / 22_050.0, epsilon = 1e-12);
    }
}
