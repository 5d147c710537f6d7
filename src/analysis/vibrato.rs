//! Vibrato classification via autocorrelation of the cents contour
//!
//! Controlled vibrato is periodic; nervous pitch wander is not. A single
//! normalized autocorrelation peak inside the 4-8 Hz band separates the two
//! without a full periodicity detector.

use ndarray::Array1;

use crate::analysis::stats::population_std;
use crate::config::AnalysisConfig;

const EPSILON: f64 = 1e-6;
const NORMALIZATION_FLOOR: f64 = 1e-10;

#[derive(Debug, Clone, Default)]
pub(crate) struct VibratoAnalysis {
    pub rate_hz: f64,
    pub depth_semitones: f64,
    pub regularity: f64,
    pub is_intentional: bool,
    /// Legacy 0-1 scalar kept for downstream scoring tables.
    pub ratio: f64,
}

pub(crate) fn vibrato_analysis(
    voiced_hz: &[f64],
    frames_per_second: f64,
    pitch_mean_hz: f64,
    pitch_std_hz: f64,
    config: &AnalysisConfig,
) -> VibratoAnalysis {
    let mut result = VibratoAnalysis::default();

    if voiced_hz.len() > config.vibrato_min_frames && frames_per_second > 0.0 {
        // Work in cents relative to the recording's own mean so absolute
        // pitch drops out and only the oscillation shape remains.
        let cents: Vec<f64> = voiced_hz
            .iter()
            .map(|&hz| 1200.0 * (hz / (pitch_mean_hz + EPSILON)).log2())
            .collect();
        let center = cents.iter().sum::<f64>() / cents.len() as f64;
        let centered = Array1::from_iter(cents.iter().map(|&c| c - center));
        let autocorr = normalized_autocorrelation(&centered);

        let min_lag = (frames_per_second / config.vibrato_max_hz) as usize;
        let max_lag = (frames_per_second / config.vibrato_min_hz) as usize;
        if min_lag > 0 && min_lag < max_lag && max_lag < autocorr.len() {
            let band = &autocorr[min_lag..max_lag];
            if let Some((offset, &peak)) = band
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            {
                if peak > config.vibrato_peak_threshold {
                    let lag = min_lag + offset;
                    result.rate_hz = frames_per_second / lag as f64;
                    result.depth_semitones = population_std(&cents) / 100.0;
                    result.regularity = peak;
                    result.is_intentional = true;
                }
            }
        }
    }

    result.ratio = if result.is_intentional {
        (result.depth_semitones * result.regularity * 2.0).min(1.0)
    } else {
        (pitch_std_hz / (pitch_mean_hz + EPSILON) * 10.0).min(1.0)
    };
    result
}

/// Autocorrelation over non-negative lags, normalized by the zero-lag value.
fn normalized_autocorrelation(signal: &Array1<f64>) -> Vec<f64> {
    let n = signal.len();
    let mut autocorr = Vec::with_capacity(n);
    for lag in 0..n {
        let head = signal.slice(ndarray::s![..n - lag]);
        let tail = signal.slice(ndarray::s![lag..]);
        autocorr.push(head.dot(&tail));
    }
    let zero_lag = autocorr.first().copied().unwrap_or(0.0);
    autocorr
        .iter()
        .map(|&value| value / (zero_lag + NORMALIZATION_FLOOR))
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::vibrato_analysis;
    use crate::config::AnalysisConfig;

    const FPS: f64 = 43.0;

    fn modulated_contour(center_hz: f64, rate_hz: f64, depth_cents: f64, frames: usize) -> Vec<f64> {
        (0..frames)
            .map(|i| {
                let phase = 2.0 * std::f64::consts::PI * rate_hz * i as f64 / FPS;
                center_hz * 2f64.powf(depth_cents / 1200.0 * phase.sin())
            })
            .collect()
    }

    #[test]
    fn periodic_oscillation_is_classified_intentional() {
        let config = AnalysisConfig::default();
        let contour = modulated_contour(220.0, 6.0, 50.0, 215);
        let mean = contour.iter().sum::<f64>() / contour.len() as f64;
        let result = vibrato_analysis(&contour, FPS, mean, 3.0, &config);

        assert!(result.is_intentional);
        assert!((result.rate_hz - 6.0).abs() < 1.0, "rate={}", result.rate_hz);
        assert!(result.regularity > 0.3);
        // A sinusoid of amplitude 50 cents has sigma 50/sqrt(2).
        assert_abs_diff_eq!(result.depth_semitones, 0.354, epsilon = 0.05);
        assert!(result.ratio > 0.0);
    }

    #[test]
    fn constant_contour_is_not_vibrato() {
        let config = AnalysisConfig::default();
        let contour = vec![220.0; 215];
        let result = vibrato_analysis(&contour, FPS, 220.0, 0.0, &config);

        assert!(!result.is_intentional);
        assert_abs_diff_eq!(result.rate_hz, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.ratio, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn short_contours_skip_the_periodicity_test() {
        let config = AnalysisConfig::default();
        let contour = modulated_contour(220.0, 6.0, 50.0, 40);
        let mean = contour.iter().sum::<f64>() / contour.len() as f64;
        let result = vibrato_analysis(&contour, FPS, mean, 10.0, &config);

        assert!(!result.is_intentional);
        // Falls through to the instability proxy.
        assert_abs_diff_eq!(result.ratio, 10.0 / 220.0 * 10.0, epsilon = 1e-6);
    }

    #[test]
    fn wander_ratio_is_capped_at_one() {
        let config = AnalysisConfig::default();
        let result = vibrato_analysis(&[220.0; 10], FPS, 200.0, 50.0, &config);
        assert_abs_diff_eq!(result.ratio, 1.0, epsilon = 1e-12);
    }
}
