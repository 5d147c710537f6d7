//! The feature-extraction core
//!
//! One synchronous pass transforms a decoded mono waveform into a complete
//! [`FeatureReport`]. The computation is stateless and total: every
//! statistic has a neutral fallback for degenerate input, so the extractor
//! never fails on silence, monotone pitch, or very short clips. Independent
//! waveforms can be analyzed in parallel without synchronization.

mod breath;
mod dynamics;
mod pitch;
mod rhythm;
mod spectral;
mod stats;
mod vibrato;

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::types::{AudioData, FeatureReport, TimeSeries};

/// Responsible for turning waveforms into feature reports.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: AnalysisConfig,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one waveform. Expects audio already resampled to the
    /// nominal analysis rate; see [`crate::audio::decoder::decode_at_rate`].
    pub fn extract(&self, audio: &AudioData, include_time_series: bool) -> FeatureReport {
        let config = &self.config;
        let duration_seconds = audio.duration_seconds();

        let track = pitch::track_pitch(&audio.samples, audio.sample_rate, config);
        let pitch_stats = pitch::pitch_statistics(&track.voiced_hz, config);
        debug!(
            frames = track.f0_hz.len(),
            voiced = track.voiced_hz.len(),
            mean_hz = pitch_stats.mean_hz,
            "pitch track complete"
        );

        let loudness = dynamics::loudness_contour(&audio.samples, audio.sample_rate, config);
        let dynamics_stats = dynamics::dynamics_statistics(&loudness, config);

        let spectral = spectral::spectral_analysis(&audio.samples, audio.sample_rate, config);
        let warmth_score = 1.0 - spectral.mean_centroid_hz / config.warmth_reference_hz;
        let articulation_clarity =
            spectral::articulation_clarity(spectral.mean_centroid_hz, spectral.mean_flux, config);

        let vibrato = vibrato::vibrato_analysis(
            &track.voiced_hz,
            track.frames_per_second,
            pitch_stats.mean_hz,
            pitch_stats.std_hz,
            config,
        );
        let rhythm = rhythm::rhythm_analysis(
            &spectral.onset_envelope,
            config.frames_per_second(),
            config,
        );
        debug!(
            tempo_bpm = rhythm.tempo_bpm,
            onsets = rhythm.onset_times.len(),
            beats = rhythm.beat_times.len(),
            intentional_vibrato = vibrato.is_intentional,
            "rhythm and vibrato complete"
        );

        let breath = breath::breath_analysis(&loudness.rms_db, loudness.seconds_per_frame, config);

        let time_series = include_time_series.then(|| {
            let (zcr_times, zcr) =
                spectral::zero_crossing_contour(&audio.samples, audio.sample_rate, config);
            TimeSeries {
                waveform: audio.samples.clone(),
                f0_hz: track.f0_hz.clone(),
                f0_times: track.times.clone(),
                voiced_f0_hz: track.voiced_hz.clone(),
                pitch_errors_cents: pitch_stats.errors_cents.clone(),
                rms: loudness.rms.clone(),
                rms_db: loudness.rms_db.clone(),
                rms_times: loudness.times.clone(),
                centroid_hz: spectral.centroid_hz.clone(),
                centroid_times: spectral.times.clone(),
                zcr,
                zcr_times,
            }
        });

        FeatureReport {
            duration_seconds,
            sample_rate: audio.sample_rate,
            avg_pitch_hz: pitch_stats.mean_hz,
            pitch_min_hz: pitch_stats.min_hz,
            pitch_max_hz: pitch_stats.max_hz,
            pitch_std_hz: pitch_stats.std_hz,
            pitch_range_semitones: pitch_stats.range_semitones,
            pitch_accuracy_cents: pitch_stats.accuracy_cents,
            pitch_stability: pitch_stats.stability,
            flat_tendency: pitch_stats.flat_tendency,
            sharp_tendency: pitch_stats.sharp_tendency,
            voiced_ratio: track.voiced_ratio(),
            high_note_ratio: pitch_stats.high_ratio,
            low_note_ratio: pitch_stats.low_ratio,
            high_note_stability: pitch_stats.high_note_stability,
            high_threshold_hz: pitch_stats.high_threshold_hz,
            low_threshold_hz: pitch_stats.low_threshold_hz,
            dynamic_range_db: dynamics_stats.range_db,
            dynamic_score: dynamics_stats.score,
            rms_db_max: dynamics_stats.rms_db_max,
            rms_db_mean: dynamics_stats.rms_db_mean,
            rms_mean: dynamics_stats.rms_mean,
            energy_variance: dynamics_stats.energy_variance,
            climax_intensity: dynamics_stats.climax_intensity,
            spectral_centroid_hz: spectral.mean_centroid_hz,
            warmth_score,
            articulation_clarity,
            vibrato_rate_hz: vibrato.rate_hz,
            vibrato_depth_semitones: vibrato.depth_semitones,
            vibrato_regularity: vibrato.regularity,
            is_intentional_vibrato: vibrato.is_intentional,
            vibrato_ratio: vibrato.ratio,
            tempo_bpm: rhythm.tempo_bpm,
            rhythm_offset_ms: rhythm.offset_ms,
            breath_phrase_length_seconds: breath.mean_phrase_seconds,
            breath_support_score: breath.support_score,
            time_series,
        }
    }
}

/// Analyze a waveform with the default configuration.
///
/// Convenience wrapper over [`FeatureExtractor`] for callers that do not
/// need to tune thresholds.
pub fn analyze_features(
    samples: &[f32],
    sample_rate: u32,
    include_time_series: bool,
) -> FeatureReport {
    let audio = AudioData {
        samples: samples.to_vec(),
        sample_rate,
    };
    FeatureExtractor::new().extract(&audio, include_time_series)
}
