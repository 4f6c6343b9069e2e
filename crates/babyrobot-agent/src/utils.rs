//! Utility functions shared by the planners and the Monte Carlo estimators

use ndarray::{Array, Dimension};
use serde::{Deserialize, Serialize};

/// How the change between two value tables is summarised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaType {
    /// Largest absolute change of any entry
    #[default]
    Max,
    /// Average absolute change over all entries
    Mean,
}

impl DeltaType {
    /// Summarise the change from `before` to `after`
    #[must_use]
    pub fn measure<D: Dimension>(self, before: &Array<f64, D>, after: &Array<f64, D>) -> f64 {
        match self {
            Self::Max => max_abs_diff(before, after),
            Self::Mean => mean_abs_diff(before, after),
        }
    }
}

/// Largest absolute element-wise difference
#[must_use]
pub fn max_abs_diff<D: Dimension>(a: &Array<f64, D>, b: &Array<f64, D>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Mean absolute element-wise difference; zero for empty tables
#[must_use]
pub fn mean_abs_diff<D: Dimension>(a: &Array<f64, D>, b: &Array<f64, D>) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let total: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum();
    #[allow(clippy::cast_precision_loss)]
    let count = a.len() as f64;
    total / count
}

/// Fold `sample` into a running mean that now covers `count` samples
#[must_use]
pub fn incremental_mean(mean: f64, count: u32, sample: f64) -> f64 {
    if count == 0 {
        return mean;
    }
    let inv = 1.0 / f64::from(count);
    (1.0 - inv) * mean + inv * sample
}

/// Relative closeness with no absolute floor
#[must_use]
#[allow(clippy::float_cmp)]
pub fn is_close(a: f64, b: f64, rel_tol: f64) -> bool {
    if a == b {
        return true;
    }
    (a - b).abs() <= rel_tol * a.abs().max(b.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn test_deltas() {
        let before = array![[0.0, -1.0], [2.0, 0.0]];
        let after = array![[0.5, -3.0], [2.0, 0.0]];
        assert_relative_eq!(DeltaType::Max.measure(&before, &after), 2.0);
        assert_relative_eq!(DeltaType::Mean.measure(&before, &after), 0.625);
    }

    #[test]
    fn test_incremental_mean_matches_average() {
        let samples = [-4.0, -6.0, -2.0, -9.0];
        let mut mean = 0.0;
        for (i, &sample) in samples.iter().enumerate() {
            mean = incremental_mean(mean, u32::try_from(i + 1).unwrap(), sample);
        }
        assert_relative_eq!(mean, -5.25);
    }

    #[test]
    fn test_is_close() {
        assert!(is_close(-10.0, -10.000_001, 1e-6));
        assert!(!is_close(-10.0, -10.1, 1e-6));
        assert!(!is_close(0.0, 1e-12, 1e-6));
        assert!(is_close(0.0, 0.0, 1e-6));
    }

    proptest! {
        #[test]
        fn incremental_mean_tracks_the_average(
            samples in prop::collection::vec(-100.0f64..100.0, 1..50)
        ) {
            let mut mean = 0.0;
            for (i, &sample) in samples.iter().enumerate() {
                mean = incremental_mean(mean, u32::try_from(i + 1).unwrap(), sample);
            }
            #[allow(clippy::cast_precision_loss)]
            let average = samples.iter().sum::<f64>() / samples.len() as f64;
            prop_assert!((mean - average).abs() < 1e-9);
        }

        #[test]
        fn mean_delta_never_exceeds_max_delta(
            pairs in prop::collection::vec((-10.0f64..10.0, -10.0f64..10.0), 1..30)
        ) {
            let before = ndarray::Array1::from_iter(pairs.iter().map(|p| p.0));
            let after = ndarray::Array1::from_iter(pairs.iter().map(|p| p.1));
            let max = DeltaType::Max.measure(&before, &after);
            let mean = DeltaType::Mean.measure(&before, &after);
            prop_assert!(mean <= max + 1e-12);
            prop_assert!(max >= 0.0);
        }
    }
}
