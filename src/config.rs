//! Tunable parameters for vocal feature analysis
//!
//! Every perceptual threshold used by the analysis modules lives here so the
//! heuristics can be tuned and tested without touching signal-processing
//! code. Defaults encode the judgments the scoring was calibrated against:
//! a 12-22 dB expressive dynamic range, diction brightness centered near
//! 2000 Hz, and the 4-8 Hz band where trained vibrato sits.

/// Analysis configuration parameters
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Nominal analysis sample rate in Hz. Decoded audio is resampled to
    /// this rate before extraction regardless of the source file's rate.
    pub analysis_sample_rate: u32,

    /// STFT / RMS window length in samples (default: 2048)
    pub frame_size: usize,

    /// Hop between consecutive analysis frames in samples (default: 512,
    /// about 23 ms at 22050 Hz)
    pub hop_size: usize,

    // Pitch tracking
    /// Lowest fundamental considered vocal (default: 80 Hz)
    pub pitch_min_hz: f64,

    /// Highest fundamental considered vocal (default: 800 Hz)
    pub pitch_max_hz: f64,

    /// Window length in samples handed to the pyin estimator (default: 1024)
    pub pitch_frame_size: usize,

    /// Deviation beyond which a frame counts as flat or sharp (default: 10 cents)
    pub cents_tolerance: f64,

    // Register
    /// Voiced-pitch percentile marking the high register (default: 75)
    pub high_register_percentile: f64,

    /// Voiced-pitch percentile marking the low register (default: 25)
    pub low_register_percentile: f64,

    /// Minimum high-register frames before stability is measured rather
    /// than defaulted (default: 10)
    pub high_note_min_frames: usize,

    /// Semitone spread that maps high-register stability to zero (default: 4.0)
    pub high_note_stability_span: f64,

    /// Lowest stability reported no matter how wide the spread (default: 0.2)
    pub high_note_stability_floor: f64,

    // Dynamics
    /// Additive floor applied before taking log of RMS (default: 1e-10)
    pub db_floor: f64,

    /// Dynamic range mapped to score 0.5 (default: 12 dB)
    pub dynamic_low_knee_db: f64,

    /// Dynamic range mapped to score 1.0 (default: 22 dB)
    pub dynamic_high_knee_db: f64,

    /// Score lost per dB beyond the high knee (default: 0.02)
    pub dynamic_decay_per_db: f64,

    /// Lowest score an overdriven range decays to (default: 0.6)
    pub dynamic_decay_floor: f64,

    // Timbre
    /// Centroid at which warmth reaches zero (default: 3000 Hz)
    pub warmth_reference_hz: f64,

    /// Centroid of maximally clear diction (default: 2000 Hz)
    pub articulation_target_hz: f64,

    /// Mean squared spectral flux that saturates the flux term (default: 0.1)
    pub articulation_flux_reference: f64,

    /// Weight of the centroid term in articulation clarity (default: 0.6)
    pub articulation_centroid_weight: f64,

    /// Weight of the flux term in articulation clarity (default: 0.4)
    pub articulation_flux_weight: f64,

    // Vibrato
    /// Lower edge of the vibrato band (default: 4 Hz)
    pub vibrato_min_hz: f64,

    /// Upper edge of the vibrato band (default: 8 Hz)
    pub vibrato_max_hz: f64,

    /// Normalized autocorrelation peak above which oscillation counts as
    /// intentional vibrato rather than wander (default: 0.3)
    pub vibrato_peak_threshold: f64,

    /// Minimum voiced frames before the periodicity test runs (default: 50)
    pub vibrato_min_frames: usize,

    // Rhythm
    /// Slowest tempo considered (default: 60 BPM)
    pub tempo_min_bpm: f64,

    /// Fastest tempo considered (default: 180 BPM)
    pub tempo_max_bpm: f64,

    /// Tempo reported when the signal has no usable pulse (default: 120 BPM)
    pub neutral_tempo_bpm: f64,

    /// Onset threshold in standard deviations above the envelope mean
    /// (default: 1.0)
    pub onset_delta: f64,

    /// Minimum spacing between detected onsets (default: 0.05 s)
    pub onset_min_gap_seconds: f64,

    /// Offset reported when no beats or no onsets exist (default: 50.0 ms)
    pub neutral_rhythm_offset_ms: f64,

    // Breath
    /// Loudness percentile separating rest from singing (default: 25)
    pub phrase_rest_percentile: f64,

    /// Shortest run that counts as a phrase (default: 0.5 s)
    pub phrase_min_seconds: f64,

    /// Phrase length mapped to support score 0 (default: 2 s)
    pub breath_floor_seconds: f64,

    /// Phrase length mapped to support score 1 (default: 8 s)
    pub breath_ceiling_seconds: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analysis_sample_rate: 22_050,
            frame_size: 2048,
            hop_size: 512,
            pitch_min_hz: 80.0,
            pitch_max_hz: 800.0,
            pitch_frame_size: 1024,
            cents_tolerance: 10.0,
            high_register_percentile: 75.0,
            low_register_percentile: 25.0,
            high_note_min_frames: 10,
            high_note_stability_span: 4.0,
            high_note_stability_floor: 0.2,
            db_floor: 1e-10,
            dynamic_low_knee_db: 12.0,
            dynamic_high_knee_db: 22.0,
            dynamic_decay_per_db: 0.02,
            dynamic_decay_floor: 0.6,
            warmth_reference_hz: 3000.0,
            articulation_target_hz: 2000.0,
            articulation_flux_reference: 0.1,
            articulation_centroid_weight: 0.6,
            articulation_flux_weight: 0.4,
            vibrato_min_hz: 4.0,
            vibrato_max_hz: 8.0,
            vibrato_peak_threshold: 0.3,
            vibrato_min_frames: 50,
            tempo_min_bpm: 60.0,
            tempo_max_bpm: 180.0,
            neutral_tempo_bpm: 120.0,
            onset_delta: 1.0,
            onset_min_gap_seconds: 0.05,
            neutral_rhythm_offset_ms: 50.0,
            phrase_rest_percentile: 25.0,
            phrase_min_seconds: 0.5,
            breath_floor_seconds: 2.0,
            breath_ceiling_seconds: 8.0,
        }
    }
}

impl AnalysisConfig {
    /// Analysis frames per second implied by the STFT hop.
    pub fn frames_per_second(&self) -> f64 {
        self.analysis_sample_rate as f64 / self.hop_size as f64
    }
}
