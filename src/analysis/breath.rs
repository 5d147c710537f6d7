//! Phrase segmentation and breath-support scoring

use crate::analysis::stats::{mean, percentile};
use crate::config::AnalysisConfig;

/// Mean phrase length reported when nothing qualifies as a phrase.
const NEUTRAL_PHRASE_SECONDS: f64 = 3.0;

#[derive(Debug, Clone, Default)]
pub(crate) struct BreathAnalysis {
    pub phrase_lengths: Vec<f64>,
    pub mean_phrase_seconds: f64,
    pub support_score: f64,
}

/// Segment the loudness contour into sung phrases separated by rests.
///
/// A frame louder than the contour's own quiet percentile counts as
/// singing. Runs shorter than the minimum are treated as dynamic dips, not
/// phrases, and the run still open at end of signal is committed the same
/// way.
pub(crate) fn breath_analysis(
    rms_db: &[f64],
    seconds_per_frame: f64,
    config: &AnalysisConfig,
) -> BreathAnalysis {
    let mut phrase_lengths = Vec::new();
    if !rms_db.is_empty() && seconds_per_frame > 0.0 {
        let threshold = percentile(rms_db, config.phrase_rest_percentile);
        let mut current = 0.0;
        for &level in rms_db {
            if level > threshold {
                current += seconds_per_frame;
            } else {
                if current > config.phrase_min_seconds {
                    phrase_lengths.push(current);
                }
                current = 0.0;
            }
        }
        if current > config.phrase_min_seconds {
            phrase_lengths.push(current);
        }
    }

    let mean_phrase_seconds = if phrase_lengths.is_empty() {
        NEUTRAL_PHRASE_SECONDS
    } else {
        mean(&phrase_lengths)
    };

    BreathAnalysis {
        support_score: breath_support_score(mean_phrase_seconds, config),
        mean_phrase_seconds,
        phrase_lengths,
    }
}

/// Linear map from mean phrase length to a 0-1 support score.
pub(crate) fn breath_support_score(phrase_seconds: f64, config: &AnalysisConfig) -> f64 {
    let span = config.breath_ceiling_seconds - config.breath_floor_seconds;
    ((phrase_seconds - config.breath_floor_seconds) / span).clamp(0.0, 1.0)
}
