//! Onset picking, tempo estimation, and expressive timing offset
//!
//! The offset metric measures how loosely the singer tracks the implied
//! pulse: for every detected onset, the distance to the nearest beat of the
//! tracked grid, averaged in milliseconds. Direction is ignored on purpose;
//! rushing and dragging read the same here.

use crate::analysis::stats::{mean, population_std};
use crate::config::AnalysisConfig;

#[derive(Debug, Clone, Default)]
pub(crate) struct RhythmAnalysis {
    pub tempo_bpm: f64,
    pub beat_times: Vec<f64>,
    pub onset_times: Vec<f64>,
    pub offset_ms: f64,
}

pub(crate) fn rhythm_analysis(
    onset_envelope: &[f64],
    frames_per_second: f64,
    config: &AnalysisConfig,
) -> RhythmAnalysis {
    let onset_times = pick_onsets(onset_envelope, frames_per_second, config);
    let (tempo_bpm, period_frames) = estimate_tempo(onset_envelope, frames_per_second, config);
    let beat_times = match period_frames {
        Some(period) => beat_grid(onset_envelope, period, frames_per_second),
        None => Vec::new(),
    };
    let offset_ms = rhythm_offset_ms(&onset_times, &beat_times, config);

    RhythmAnalysis {
        tempo_bpm,
        beat_times,
        onset_times,
        offset_ms,
    }
}

/// Local maxima of the onset-strength envelope above an adaptive threshold.
fn pick_onsets(envelope: &[f64], frames_per_second: f64, config: &AnalysisConfig) -> Vec<f64> {
    if envelope.len() < 3 || frames_per_second <= 0.0 {
        return Vec::new();
    }
    let peak = envelope.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if peak <= 0.0 {
        return Vec::new();
    }

    let threshold = mean(envelope) + config.onset_delta * population_std(envelope);
    let min_gap = (config.onset_min_gap_seconds * frames_per_second).round() as usize;
    let mut onsets = Vec::new();
    let mut last_frame: Option<usize> = None;
    for i in 1..envelope.len() - 1 {
        let is_peak = envelope[i] >= envelope[i - 1] && envelope[i] > envelope[i + 1];
        if !is_peak || envelope[i] <= threshold {
            continue;
        }
        if let Some(last) = last_frame {
            if i - last < min_gap.max(1) {
                continue;
            }
        }
        last_frame = Some(i);
        onsets.push(i as f64 / frames_per_second);
    }
    onsets
}

/// Autocorrelation tempo estimate over the configured BPM band.
///
/// Returns the tempo and the winning lag in frames; the neutral tempo with
/// no lag when the envelope carries no usable pulse.
fn estimate_tempo(
    envelope: &[f64],
    frames_per_second: f64,
    config: &AnalysisConfig,
) -> (f64, Option<usize>) {
    let neutral = (config.neutral_tempo_bpm, None);
    if frames_per_second <= 0.0 || envelope.is_empty() {
        return neutral;
    }
    let center = mean(envelope);
    let centered: Vec<f64> = envelope.iter().map(|&v| v - center).collect();

    let lag_min = ((frames_per_second * 60.0 / config.tempo_max_bpm).round() as usize).max(1);
    let lag_max = ((frames_per_second * 60.0 / config.tempo_min_bpm).round() as usize)
        .min(centered.len() / 2);
    if lag_min >= lag_max {
        return neutral;
    }

    let mut best_lag = 0usize;
    let mut best_score = 0.0;
    for lag in lag_min..=lag_max {
        let score: f64 = centered[lag..]
            .iter()
            .zip(centered.iter())
            .map(|(a, b)| a * b)
            .sum();
        if score > best_score {
            best_score = score;
            best_lag = lag;
        }
    }
    if best_lag == 0 || best_score <= 0.0 {
        return neutral;
    }
    (60.0 * frames_per_second / best_lag as f64, Some(best_lag))
}

/// Lay the tempo period down at the phase that gathers the most energy.
fn beat_grid(envelope: &[f64], period: usize, frames_per_second: f64) -> Vec<f64> {
    if period == 0 || envelope.is_empty() || frames_per_second <= 0.0 {
        return Vec::new();
    }
    let peak = envelope.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if peak <= 0.0 {
        return Vec::new();
    }

    let mut best_phase = 0usize;
    let mut best_energy = f64::NEG_INFINITY;
    for phase in 0..period.min(envelope.len()) {
        let energy: f64 = envelope.iter().skip(phase).step_by(period).sum();
        if energy > best_energy {
            best_energy = energy;
            best_phase = phase;
        }
    }
    (best_phase..envelope.len())
        .step_by(period)
        .map(|frame| frame as f64 / frames_per_second)
        .collect()
}

fn rhythm_offset_ms(onset_times: &[f64], beat_times: &[f64], config: &AnalysisConfig) -> f64 {
    if onset_times.is_empty() || beat_times.is_empty() {
        return config.neutral_rhythm_offset_ms;
    }
    let total: f64 = onset_times
        .iter()
        .map(|&onset| {
            beat_times
                .iter()
                .map(|&beat| (onset - beat).abs())
                .fold(f64::INFINITY, f64::min)
        })
        .sum();
    total / onset_times.len() as f64 * 1000.0
}
