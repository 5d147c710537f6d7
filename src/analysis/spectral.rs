//! STFT-derived timbre features and the onset-strength envelope

use aus::spectrum;
use aus::WindowType;

use crate::config::AnalysisConfig;

const EPSILON: f64 = 1e-10;

/// Spectral features shared by the timbre and rhythm stages.
///
/// One STFT pass feeds three consumers: the centroid contour (brightness),
/// the grand mean of squared frame-to-frame flux (articulation), and the
/// half-wave rectified flux envelope (onset strength).
#[derive(Debug, Clone, Default)]
pub(crate) struct SpectralAnalysis {
    pub times: Vec<f64>,
    pub centroid_hz: Vec<f64>,
    pub mean_centroid_hz: f64,
    pub mean_flux: f64,
    pub onset_envelope: Vec<f64>,
}

pub(crate) fn spectral_analysis(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> SpectralAnalysis {
    if samples.len() < config.frame_size || sample_rate == 0 {
        return SpectralAnalysis::default();
    }

    let audio: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
    let stft = spectrum::rstft(
        &audio,
        config.frame_size,
        config.hop_size,
        WindowType::Hanning,
    );
    let (magnitude, _phase) = spectrum::complex_to_polar_rstft(&stft);
    if magnitude.is_empty() {
        return SpectralAnalysis::default();
    }
    let freqs = spectrum::rfftfreq(config.frame_size, sample_rate);

    let mut centroid_hz = Vec::with_capacity(magnitude.len());
    for frame in &magnitude {
        let total: f64 = frame.iter().sum();
        let weighted: f64 = frame
            .iter()
            .zip(freqs.iter())
            .map(|(&m, &f)| m * f)
            .sum();
        centroid_hz.push(weighted / (total + EPSILON));
    }

    // Flux in both flavors in one pass over the frame pairs: squared
    // differences for articulation, rectified sums for onset strength.
    let bins = magnitude[0].len();
    let mut onset_envelope = Vec::with_capacity(magnitude.len());
    onset_envelope.push(0.0);
    let mut squared_sum = 0.0;
    for pair in magnitude.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);
        let mut rectified = 0.0;
        for (&curr, &prev) in current.iter().zip(previous.iter()) {
            let diff = curr - prev;
            squared_sum += diff * diff;
            rectified += diff.max(0.0);
        }
        onset_envelope.push(rectified);
    }
    let pair_count = magnitude.len().saturating_sub(1);
    let mean_flux = if pair_count > 0 {
        squared_sum / (pair_count * bins) as f64
    } else {
        0.0
    };

    let mean_centroid_hz = centroid_hz.iter().sum::<f64>() / centroid_hz.len() as f64;
    let times = (0..magnitude.len())
        .map(|i| (i * config.hop_size) as f64 / sample_rate as f64)
        .collect();

    SpectralAnalysis {
        times,
        centroid_hz,
        mean_centroid_hz,
        mean_flux,
        onset_envelope,
    }
}

/// Combine centroid placement and spectral flux into a diction score.
///
/// Flux alone is noisy and centroid alone cannot separate clear diction
/// from a merely bright tone, so the two are blended 60/40.
pub(crate) fn articulation_clarity(
    mean_centroid_hz: f64,
    mean_flux: f64,
    config: &AnalysisConfig,
) -> f64 {
    let centroid_score = (1.0
        - (mean_centroid_hz - config.articulation_target_hz).abs()
            / config.articulation_target_hz)
        .max(0.0);
    let flux_score = (mean_flux / config.articulation_flux_reference).min(1.0);
    config.articulation_centroid_weight * centroid_score
        + config.articulation_flux_weight * flux_score
}

/// Per-frame zero-crossing rate, retained for charting only.
pub(crate) fn zero_crossing_contour(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> (Vec<f64>, Vec<f64>) {
    let mut times = Vec::new();
    let mut rates = Vec::new();
    if samples.is_empty() || sample_rate == 0 {
        return (times, rates);
    }
    let mut start = 0usize;
    while start < samples.len() {
        let end = (start + config.frame_size).min(samples.len());
        let window = &samples[start..end];
        let crossings = window
            .windows(2)
            .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
            .count();
        rates.push(crossings as f64 / window.len() as f64);
        times.push(start as f64 / sample_rate as f64);
        start += config.hop_size;
    }
    (times, rates)
}
