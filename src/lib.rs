//! # vocalyzer
//!
//! Feature extraction for sung vocal performances. One pass over a decoded
//! mono waveform yields pitch, dynamics, timbre, vibrato, rhythm, and
//! breath statistics as a flat [`FeatureReport`], with optional per-frame
//! contours for charting.
//!
//! ```no_run
//! use vocalyzer::{analyze_features, AnalysisConfig};
//!
//! let samples = vec![0.0f32; 22_050 * 5];
//! let report = analyze_features(&samples, AnalysisConfig::default().analysis_sample_rate, false);
//! println!("mean pitch: {:.1} Hz", report.avg_pitch_hz);
//! ```

pub mod analysis;
pub mod audio;
pub mod config;
pub mod types;

pub use analysis::{analyze_features, FeatureExtractor};
pub use config::AnalysisConfig;
pub use types::{AudioData, FeatureReport, TimeSeries};
