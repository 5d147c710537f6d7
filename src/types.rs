//! Core types for the vocalyzer analysis pipeline

use serde::{Deserialize, Serialize};

/// Raw audio data representation (mono, f32 samples)
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Audio samples, normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g., 22050)
    pub sample_rate: u32,
}

impl AudioData {
    /// Duration of the buffer in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Complete per-recording feature set produced by one analysis pass.
///
/// Every field is always populated: degenerate input (silence, no detected
/// pitch, no rhythmic pulse) falls back to documented neutral values instead
/// of leaving holes, so downstream consumers never branch on missing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureReport {
    pub duration_seconds: f64,
    pub sample_rate: u32,

    // Pitch, computed over voiced frames only
    pub avg_pitch_hz: f64,
    pub pitch_min_hz: f64,
    pub pitch_max_hz: f64,
    pub pitch_std_hz: f64,
    pub pitch_range_semitones: f64,
    /// Mean absolute deviation from the nearest equal-tempered note, in cents.
    pub pitch_accuracy_cents: f64,
    pub pitch_stability: f64,
    /// Fraction of voiced frames more than 10 cents below the nearest note.
    pub flat_tendency: f64,
    /// Fraction of voiced frames more than 10 cents above the nearest note.
    pub sharp_tendency: f64,
    pub voiced_ratio: f64,

    // Register, thresholds are this recording's own percentiles
    pub high_note_ratio: f64,
    pub low_note_ratio: f64,
    pub high_note_stability: f64,
    pub high_threshold_hz: f64,
    pub low_threshold_hz: f64,

    // Dynamics
    pub dynamic_range_db: f64,
    pub dynamic_score: f64,
    pub rms_db_max: f64,
    pub rms_db_mean: f64,
    pub rms_mean: f64,
    pub energy_variance: f64,
    pub climax_intensity: f64,

    // Timbre
    pub spectral_centroid_hz: f64,
    pub warmth_score: f64,
    pub articulation_clarity: f64,

    // Vibrato
    pub vibrato_rate_hz: f64,
    pub vibrato_depth_semitones: f64,
    pub vibrato_regularity: f64,
    pub is_intentional_vibrato: bool,
    /// Backward-compatible scalar: depth and regularity for intentional
    /// vibrato, otherwise an instability proxy from raw pitch deviation.
    pub vibrato_ratio: f64,

    // Rhythm
    pub tempo_bpm: f64,
    /// Mean absolute distance from each detected onset to its nearest beat.
    pub rhythm_offset_ms: f64,

    // Breath
    pub breath_phrase_length_seconds: f64,
    pub breath_support_score: f64,

    /// Raw per-frame contours for charting consumers, populated on request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_series: Option<TimeSeries>,
}

/// Per-frame contours retained for visualization, never used by scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub waveform: Vec<f32>,
    /// Fundamental frequency per analysis frame; unvoiced frames stay `None`
    /// so charts can render gaps instead of interpolating through them.
    pub f0_hz: Vec<Option<f64>>,
    pub f0_times: Vec<f64>,
    pub voiced_f0_hz: Vec<f64>,
    pub pitch_errors_cents: Vec<f64>,
    pub rms: Vec<f64>,
    pub rms_db: Vec<f64>,
    pub rms_times: Vec<f64>,
    pub centroid_hz: Vec<f64>,
    pub centroid_times: Vec<f64>,
    pub zcr: Vec<f64>,
    pub zcr_times: Vec<f64>,
}
