//! Threshold split (decision stump) weak learner
//!
//! Exact-greedy search over every distinct value of every feature column
//! for the single `(feature, threshold)` pair that minimises squared error
//! when each side predicts its mean residual.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Candidates leaving fewer rows than this on either side are rejected
pub const MIN_SAMPLES_PER_SIDE: usize = 2;

/// A fitted single-feature threshold split.
///
/// Rows whose chosen feature is `<= threshold` receive `left_value`, the
/// rest receive `right_value`. When no candidate is acceptable the split
/// stays at its zero default and predicts `0.0` everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThresholdSplit {
    pub feature_idx: usize,
    pub threshold: f64,
    pub left_value: f64,
    pub right_value: f64,
}

/// Running best candidate during the search
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    split: ThresholdSplit,
    score: f64,
}

impl ThresholdSplit {
    /// Fit a split against per-row residual targets.
    ///
    /// Candidates are visited feature by feature in ascending threshold
    /// order; only a strictly better score replaces the current best, so
    /// ties resolve to the lowest feature index and threshold.
    pub fn fit<R: AsRef<[f64]>>(rows: &[R], residuals: &[f64]) -> Self {
        assert_eq!(rows.len(), residuals.len(), "one residual per row");

        let feature_count = rows.first().map_or(0, |row| row.as_ref().len());

        let mut best: Option<SplitCandidate> = None;
        for feature_idx in 0..feature_count {
            if let Some(candidate) = Self::best_split_for_feature(rows, residuals, feature_idx) {
                best = match best {
                    Some(current) if candidate.score <= current.score => Some(current),
                    _ => Some(candidate),
                };
            }
        }

        best.map(|c| c.split).unwrap_or_default()
    }

    /// Scan the distinct values of one feature column in ascending order.
    ///
    /// Each candidate's error is summed directly over the rows in their
    /// original order, so numerically tied thresholds compare equal.
    fn best_split_for_feature<R: AsRef<[f64]>>(
        rows: &[R],
        residuals: &[f64],
        feature_idx: usize,
    ) -> Option<SplitCandidate> {
        let column: Vec<f64> = rows.iter().map(|row| row.as_ref()[feature_idx]).collect();

        let mut thresholds = column.clone();
        thresholds.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        thresholds.dedup();

        let mut best: Option<SplitCandidate> = None;
        for threshold in thresholds {
            let (mut left_sum, mut left_count) = (0.0, 0usize);
            let (mut right_sum, mut right_count) = (0.0, 0usize);
            for (&value, &r) in column.iter().zip(residuals) {
                if value <= threshold {
                    left_sum += r;
                    left_count += 1;
                } else {
                    right_sum += r;
                    right_count += 1;
                }
            }
            if left_count < MIN_SAMPLES_PER_SIDE || right_count < MIN_SAMPLES_PER_SIDE {
                continue;
            }

            let left_mean = left_sum / left_count as f64;
            let right_mean = right_sum / right_count as f64;

            let sse: f64 = column
                .iter()
                .zip(residuals)
                .map(|(&value, &r)| {
                    let err = r - if value <= threshold { left_mean } else { right_mean };
                    err * err
                })
                .sum();
            let score = -sse;

            if best.map_or(true, |current| score > current.score) {
                best = Some(SplitCandidate {
                    split: ThresholdSplit {
                        feature_idx,
                        threshold,
                        left_value: left_mean,
                        right_value: right_mean,
                    },
                    score,
                });
            }
        }

        best
    }

    /// Predict a single row
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        match row.get(self.feature_idx) {
            Some(&value) if value > self.threshold => self.right_value,
            _ => self.left_value,
        }
    }

    /// Predict every row of a batch
    pub fn predict<R: AsRef<[f64]>>(&self, rows: &[R]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_row(row.as_ref())).collect()
    }

    /// Whether this split is the zero no-op fallback
    pub fn is_degenerate(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_obvious_split() {
        let rows = vec![
            vec![0.1, 5.0],
            vec![0.2, 5.0],
            vec![0.3, 5.0],
            vec![0.7, 5.0],
            vec![0.8, 5.0],
            vec![0.9, 5.0],
        ];
        let residuals = vec![-1.0, -1.0, -1.0, 1.0, 1.0, 1.0];

        let split = ThresholdSplit::fit(&rows, &residuals);
        assert_eq!(split.feature_idx, 0);
        assert_eq!(split.threshold, 0.3);
        assert_eq!(split.left_value, -1.0);
        assert_eq!(split.right_value, 1.0);
        assert_eq!(split.predict(&rows), residuals);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let split = ThresholdSplit {
            feature_idx: 1,
            threshold: 0.5,
            left_value: -2.0,
            right_value: 3.0,
        };
        assert_eq!(split.predict_row(&[9.0, 0.4]), -2.0);
        assert_eq!(split.predict_row(&[9.0, 0.5]), -2.0);
        assert_eq!(split.predict_row(&[9.0, 0.6]), 3.0);
    }

    #[test]
    fn test_rejects_single_row_partitions() {
        // The only cut isolating the outlier leaves one row on the right
        let rows = vec![vec![0.0], vec![0.0], vec![0.0], vec![1.0]];
        let residuals = vec![0.0, 0.0, 0.0, 10.0];

        let split = ThresholdSplit::fit(&rows, &residuals);
        assert!(split.is_degenerate());
        assert_eq!(split.predict(&rows), vec![0.0; 4]);
    }

    #[test]
    fn test_constant_features_fall_back_to_default() {
        let rows = vec![[1.0, 2.0]; 8];
        let residuals = vec![0.5, -0.5, 0.5, -0.5, 0.5, -0.5, 0.5, -0.5];
        let split = ThresholdSplit::fit(&rows, &residuals);
        assert_eq!(split, ThresholdSplit::default());
    }

    #[test]
    fn test_empty_batch() {
        let rows: Vec<Vec<f64>> = Vec::new();
        let split = ThresholdSplit::fit(&rows, &[]);
        assert!(split.is_degenerate());
        assert!(split.predict(&rows).is_empty());
    }

    #[test]
    fn test_prefers_lower_feature_on_tie() {
        // Both columns separate the targets identically
        let rows = vec![
            vec![1.0, 1.0],
            vec![2.0, 2.0],
            vec![3.0, 3.0],
            vec![4.0, 4.0],
        ];
        let residuals = vec![1.0, 1.0, -1.0, -1.0];

        let split = ThresholdSplit::fit(&rows, &residuals);
        assert_eq!(split.feature_idx, 0);
        assert_eq!(split.threshold, 2.0);
    }

    #[test]
    fn test_equal_error_keeps_lowest_threshold() {
        // Thresholds 1 and 3 leave the same squared error (0.9275)
        let rows = vec![[4.0], [3.0], [0.0], [1.0], [2.0], [5.0]];
        let residuals = vec![-0.4, 0.1, 0.0, -0.4, -1.0, -1.0];

        let split = ThresholdSplit::fit(&rows, &residuals);
        assert_eq!(split.feature_idx, 0);
        assert_eq!(split.threshold, 1.0);
        assert_eq!(split.left_value, -0.2);
        assert_eq!(split.right_value, -0.575);
    }

    #[test]
    fn test_picks_most_informative_feature() {
        let rows = vec![
            vec![0.0, 0.9],
            vec![1.0, 0.1],
            vec![0.0, 0.8],
            vec![1.0, 0.2],
            vec![0.0, 0.7],
            vec![1.0, 0.3],
        ];
        let residuals = vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0];

        let split = ThresholdSplit::fit(&rows, &residuals);
        assert_eq!(split.feature_idx, 0);
        assert_eq!(split.threshold, 0.0);
        assert_eq!(split.left_value, 1.0);
        assert_eq!(split.right_value, 0.0);
    }

    #[test]
    fn test_matches_brute_force_search() {
        let rows: Vec<[f64; 3]> = (0..20)
            .map(|i| {
                let x = i as f64;
                [(x * 7.0) % 5.0, (x * 3.0) % 11.0, (x * x) % 13.0]
            })
            .collect();
        let residuals: Vec<f64> = (0..20).map(|i| ((i * 17) % 7) as f64 - 3.0).collect();

        let split = ThresholdSplit::fit(&rows, &residuals);

        let sse = |s: &ThresholdSplit| -> f64 {
            rows.iter()
                .zip(&residuals)
                .map(|(row, r)| (r - s.predict_row(row)).powi(2))
                .sum()
        };
        let fitted = sse(&split);

        for feature_idx in 0..3 {
            for row in &rows {
                let threshold = row[feature_idx];
                let mut left = Vec::new();
                let mut right = Vec::new();
                for (other, &r) in rows.iter().zip(&residuals) {
                    if other[feature_idx] <= threshold {
                        left.push(r);
                    } else {
                        right.push(r);
                    }
                }
                if left.len() < 2 || right.len() < 2 {
                    continue;
                }
                let candidate = ThresholdSplit {
                    feature_idx,
                    threshold,
                    left_value: left.iter().sum::<f64>() / left.len() as f64,
                    right_value: right.iter().sum::<f64>() / right.len() as f64,
                };
                assert!(fitted <= sse(&candidate) + 1e-9);
            }
        }
    }
}
