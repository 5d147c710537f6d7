//! Shared numeric helpers for the analysis modules

/// Arithmetic mean; 0.0 for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0.0 for an empty slice.
pub(crate) fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let center = mean(values);
    let variance = values
        .iter()
        .map(|v| (v - center) * (v - center))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Percentile with linear interpolation between order statistics.
///
/// `q` is in [0, 100]. Returns 0.0 for an empty slice.
pub(crate) fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let clamped = q.clamp(0.0, 100.0);
    let position = clamped / 100.0 * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = position - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

/// Frequency in Hz to fractional MIDI note number (A4 = 440 Hz = 69).
pub(crate) fn hz_to_midi(hz: f64) -> f64 {
    69.0 + 12.0 * (hz / 440.0).log2()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::{hz_to_midi, mean, percentile, population_std};

    #[test]
    fn percentile_interpolates_linearly() {
        let values = [0.0, 10.0, 20.0, 30.0];
        assert_abs_diff_eq!(percentile(&values, 25.0), 7.5, epsilon = 1e-12);
        assert_abs_diff_eq!(percentile(&values, 0.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(percentile(&values, 100.0), 30.0, epsilon = 1e-12);
    }

    #[test]
    fn percentile_is_order_independent() {
        let values = [30.0, 0.0, 20.0, 10.0];
        assert_abs_diff_eq!(percentile(&values, 50.0), 15.0, epsilon = 1e-12);
    }

    #[test]
    fn std_of_constant_signal_is_zero() {
        let values = [4.2; 16];
        assert_abs_diff_eq!(population_std(&values), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mean(&values), 4.2, epsilon = 1e-12);
    }

    #[test]
    fn reference_pitches_map_to_midi() {
        assert_abs_diff_eq!(hz_to_midi(440.0), 69.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hz_to_midi(220.0), 57.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_slices_fall_back_to_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_std(&[]), 0.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }
}
