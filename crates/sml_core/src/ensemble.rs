//! Multiclass boosted ensemble of threshold splits
//!
//! Each boosting round fits one [`ThresholdSplit`] per class against the
//! class residual `one_hot[:, c] - softmax(scores)[:, c]`, then adds the
//! learning-rate-scaled split output to that class's raw score. Classes are
//! boosted independently against a least-squares pseudo-residual; this is
//! the exact mechanic persisted artifacts were trained with.
//!
//! An ensemble only exists fitted: [`BoostedEnsemble::fit`] is the sole
//! constructor from data, and a fitted ensemble is never mutated. Refitting
//! builds a new instance.

use crate::errors::{Result, SmlError};
use crate::stump::ThresholdSplit;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Boosting hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Number of boosting rounds
    pub n_estimators: usize,
    /// Shrinkage applied to every split's output
    pub learning_rate: f64,
    /// Number of target classes
    pub n_classes: usize,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            n_estimators: 50,
            learning_rate: 0.1,
            n_classes: crate::case::NUM_VERDICTS,
        }
    }
}

impl EnsembleConfig {
    /// Reject parameters the boosting loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.n_classes == 0 {
            return Err(SmlError::InvalidParameters(
                "n_classes must be at least 1".to_string(),
            ));
        }
        if self.n_estimators == 0 {
            return Err(SmlError::InvalidParameters(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(SmlError::InvalidParameters(format!(
                "learning_rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Fitted multiclass ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedEnsemble {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub n_classes: usize,
    /// Empirical class priors of the training labels
    pub initial_scores: Vec<f64>,
    /// One split per class, per round
    pub rounds: Vec<Vec<ThresholdSplit>>,
}

impl BoostedEnsemble {
    /// Fit an ensemble on feature rows and class labels.
    ///
    /// Labels outside `0..n_classes` contribute an all-zero indicator row;
    /// callers are expected to filter them beforehand.
    pub fn fit<R: AsRef<[f64]>>(config: &EnsembleConfig, rows: &[R], labels: &[usize]) -> Result<Self> {
        config.validate()?;
        if rows.is_empty() {
            return Err(SmlError::InvalidParameters(
                "cannot fit an ensemble on an empty batch".to_string(),
            ));
        }
        if rows.len() != labels.len() {
            return Err(SmlError::InvalidParameters(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }

        let n = rows.len();
        let n_classes = config.n_classes;
        let one_hot = one_hot(labels, n_classes);

        // Class priors
        let mut initial_scores = vec![0.0; n_classes];
        for indicator in &one_hot {
            for (prior, value) in initial_scores.iter_mut().zip(indicator) {
                *prior += value;
            }
        }
        for prior in &mut initial_scores {
            *prior /= n as f64;
        }

        let mut scores = vec![initial_scores.clone(); n];
        let mut rounds = Vec::with_capacity(config.n_estimators);

        for round_idx in 0..config.n_estimators {
            let proba: Vec<Vec<f64>> = scores.iter().map(|row| softmax(row)).collect();

            let round: Vec<ThresholdSplit> = (0..n_classes)
                .map(|class| {
                    let residuals: Vec<f64> = one_hot
                        .iter()
                        .zip(&proba)
                        .map(|(indicator, p)| indicator[class] - p[class])
                        .collect();
                    ThresholdSplit::fit(rows, &residuals)
                })
                .collect();

            // Updates use the probabilities from the start of the round, so
            // class order within a round does not matter.
            for (row, row_scores) in rows.iter().zip(scores.iter_mut()) {
                for (score, split) in row_scores.iter_mut().zip(&round) {
                    *score += config.learning_rate * split.predict_row(row.as_ref());
                }
            }

            debug!(
                round = round_idx + 1,
                total = config.n_estimators,
                degenerate = round.iter().filter(|s| s.is_degenerate()).count(),
                "boosting round complete"
            );
            rounds.push(round);
        }

        Ok(Self {
            n_estimators: config.n_estimators,
            learning_rate: config.learning_rate,
            n_classes,
            initial_scores,
            rounds,
        })
    }

    /// Raw (pre-softmax) class scores for one row
    pub fn raw_scores(&self, row: &[f64]) -> Vec<f64> {
        let mut scores = self.initial_scores.clone();
        for round in &self.rounds {
            for (score, split) in scores.iter_mut().zip(round) {
                *score += self.learning_rate * split.predict_row(row);
            }
        }
        scores
    }

    /// Class probabilities for one row
    pub fn predict_proba_row(&self, row: &[f64]) -> Vec<f64> {
        softmax(&self.raw_scores(row))
    }

    /// Class probabilities for a batch; each row sums to one
    pub fn predict_proba<R: AsRef<[f64]>>(&self, rows: &[R]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|row| self.predict_proba_row(row.as_ref()))
            .collect()
    }

    /// Most probable class per row, lowest index on ties
    pub fn predict<R: AsRef<[f64]>>(&self, rows: &[R]) -> Vec<usize> {
        self.predict_proba(rows)
            .iter()
            .map(|proba| argmax(proba))
            .collect()
    }

    /// Total number of fitted splits
    pub fn num_splits(&self) -> usize {
        self.rounds.iter().map(Vec::len).sum()
    }

    /// Structural checks applied to artifacts read from storage
    pub fn validate(&self, feature_count: usize) -> std::result::Result<(), String> {
        if self.n_classes == 0 {
            return Err("ensemble has no classes".to_string());
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(format!("invalid learning rate: {}", self.learning_rate));
        }
        if self.initial_scores.len() != self.n_classes {
            return Err(format!(
                "expected {} initial scores, found {}",
                self.n_classes,
                self.initial_scores.len()
            ));
        }
        if self.initial_scores.iter().any(|s| !s.is_finite()) {
            return Err("initial scores must be finite".to_string());
        }
        if self.rounds.len() != self.n_estimators {
            return Err(format!(
                "expected {} rounds, found {}",
                self.n_estimators,
                self.rounds.len()
            ));
        }

        for (i, round) in self.rounds.iter().enumerate() {
            if round.len() != self.n_classes {
                return Err(format!(
                    "round {} holds {} splits, expected {}",
                    i,
                    round.len(),
                    self.n_classes
                ));
            }
            for (class, split) in round.iter().enumerate() {
                if split.feature_idx >= feature_count {
                    return Err(format!(
                        "round {} class {} splits on feature {} of {}",
                        i, class, split.feature_idx, feature_count
                    ));
                }
                if !(split.threshold.is_finite()
                    && split.left_value.is_finite()
                    && split.right_value.is_finite())
                {
                    return Err(format!("round {} class {} has non-finite values", i, class));
                }
            }
        }

        Ok(())
    }
}

/// Indicator matrix; out-of-range labels become all-zero rows
fn one_hot(labels: &[usize], n_classes: usize) -> Vec<Vec<f64>> {
    labels
        .iter()
        .map(|&label| {
            let mut row = vec![0.0; n_classes];
            if let Some(slot) = row.get_mut(label) {
                *slot = 1.0;
            }
            row
        })
        .collect()
}

/// Numerically stable softmax: shift by the row max before exponentiating
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the first maximum
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] {
            best = i;
        }
    }
    best
}
