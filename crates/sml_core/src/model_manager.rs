//! Model lifecycle: train, evaluate, persist, load, predict
//!
//! The manager owns at most one artifact. Training and prediction are
//! blocking, in-memory operations; disk I/O happens only at save/load.
//! Callers sharing a manager across threads must serialize `train`
//! themselves.

use crate::artifact::{load_artifact, remove_artifact, round_to, save_artifact, ModelArtifact};
use crate::case::{CaseRecord, Verdict, NUM_VERDICTS};
use crate::config::SmlConfig;
use crate::ensemble::{argmax, BoostedEnsemble};
use crate::errors::{Result, SmlError};
use crate::features::{extract_features, extract_labelled, FeatureVector, FEATURE_COUNT};
use crate::rationale::generate_rationale;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Version a manager reports before any model has been trained
pub const INITIAL_VERSION: u32 = 1;

/// Rationale returned when no model is available
pub const UNTRAINED_RATIONALE: &str = "model not trained yet";

/// Summary of a successful training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub version: u32,
    pub training_samples: usize,
    pub test_samples: usize,
    /// Held-out accuracy as a percentage, two decimals; `None` with an empty test split
    pub accuracy_percent: Option<f64>,
}

/// Training result in the shape published to external consumers
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TrainingOutcome {
    Success {
        status: &'static str,
        #[serde(flatten)]
        report: TrainingReport,
    },
    Failure {
        error: String,
    },
}

impl From<Result<TrainingReport>> for TrainingOutcome {
    fn from(result: Result<TrainingReport>) -> Self {
        match result {
            Ok(report) => Self::Success {
                status: "success",
                report,
            },
            Err(err) => Self::Failure {
                error: err.to_string(),
            },
        }
    }
}

/// Verdict suggestion for a single case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub verdict: Verdict,
    pub verdict_name: String,
    /// Probability of the predicted verdict as a truncated percentage
    pub confidence: u8,
    /// Verdict name to percentage, one decimal
    pub probabilities: BTreeMap<String, f64>,
    pub rationale: String,
    pub model_version: u32,
    /// Held-out accuracy at training time as a percentage, one decimal
    pub model_accuracy_percent: Option<f64>,
}

impl Prediction {
    /// Degraded result used when no model exists
    pub fn untrained(model_version: u32) -> Self {
        Self {
            verdict: Verdict::Pending,
            verdict_name: Verdict::Pending.name().to_string(),
            confidence: 0,
            probabilities: BTreeMap::new(),
            rationale: UNTRAINED_RATIONALE.to_string(),
            model_version,
            model_accuracy_percent: None,
        }
    }

    /// Whether this prediction came from a trained model
    pub fn is_model_backed(&self) -> bool {
        !self.probabilities.is_empty()
    }
}

/// Owns the model artifact and its lifecycle
#[derive(Debug)]
pub struct ModelManager {
    config: SmlConfig,
    artifact: Option<ModelArtifact>,
    version: u32,
}

impl ModelManager {
    pub fn new(config: SmlConfig) -> Self {
        Self {
            config,
            artifact: None,
            version: INITIAL_VERSION,
        }
    }

    /// Manager with default settings persisting to `path`
    pub fn with_model_path(path: impl AsRef<Path>) -> Self {
        Self::new(SmlConfig::with_model_path(path.as_ref()))
    }

    pub fn config(&self) -> &SmlConfig {
        &self.config
    }

    pub fn model_path(&self) -> &Path {
        &self.config.model_path
    }

    /// Current version counter
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The in-memory artifact, if any
    pub fn artifact(&self) -> Option<&ModelArtifact> {
        self.artifact.as_ref()
    }

    /// The in-memory artifact, or `ModelNotTrained`
    pub fn require_model(&self) -> Result<&ModelArtifact> {
        self.artifact.as_ref().ok_or(SmlError::ModelNotTrained)
    }

    /// Train using the configured test fraction and seed
    pub fn train(&mut self, records: &[CaseRecord]) -> Result<TrainingReport> {
        let test_fraction = self.config.training.test_fraction;
        let mut rng = match self.config.training.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.train_with_rng(records, test_fraction, &mut rng)
    }

    /// Train a fresh ensemble, evaluate it on a held-out split and persist it.
    ///
    /// Rows are permuted with `rng`; the first `round(n * test_fraction)`
    /// rows form the test set. Nothing in memory or on disk changes unless
    /// the whole run, including the save, succeeds.
    #[instrument(skip(self, records, rng), fields(records = records.len()))]
    pub fn train_with_rng<R: Rng + ?Sized>(
        &mut self,
        records: &[CaseRecord],
        test_fraction: f64,
        rng: &mut R,
    ) -> Result<TrainingReport> {
        let required = self.config.training.min_samples;
        if records.len() < required {
            warn!(available = records.len(), required, "not enough training records");
            return Err(SmlError::InsufficientData {
                available: records.len(),
                required,
            });
        }

        let (features, labels) = extract_labelled(records);
        if features.len() < required {
            warn!(
                available = features.len(),
                dropped = records.len() - features.len(),
                required,
                "not enough valid samples after label filtering"
            );
            return Err(SmlError::InsufficientData {
                available: features.len(),
                required,
            });
        }

        if !(0.0..1.0).contains(&test_fraction) {
            return Err(SmlError::InvalidParameters(format!(
                "test_fraction must be in [0, 1), got {}",
                test_fraction
            )));
        }

        if self.config.ensemble.n_classes != NUM_VERDICTS {
            return Err(SmlError::InvalidParameters(format!(
                "n_classes must be {} to map onto verdicts, got {}",
                NUM_VERDICTS, self.config.ensemble.n_classes
            )));
        }

        // Continue numbering from a persisted model when none is loaded yet.
        // An unreadable file stops training; discard_persisted replaces it.
        if self.artifact.is_none() {
            self.load()?;
        }

        let n = features.len();
        let n_test = (n as f64 * test_fraction).round() as usize;
        if n_test >= n {
            return Err(SmlError::InvalidParameters(format!(
                "test_fraction {} leaves no training rows out of {}",
                test_fraction, n
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(rng);
        let (test_idx, train_idx) = indices.split_at(n_test);

        let train_x: Vec<FeatureVector> = train_idx.iter().map(|&i| features[i]).collect();
        let train_y: Vec<usize> = train_idx.iter().map(|&i| labels[i]).collect();
        let test_x: Vec<FeatureVector> = test_idx.iter().map(|&i| features[i]).collect();
        let test_y: Vec<usize> = test_idx.iter().map(|&i| labels[i]).collect();

        debug!(
            train = train_x.len(),
            test = test_x.len(),
            dropped = records.len() - n,
            "dataset split"
        );

        let ensemble = BoostedEnsemble::fit(&self.config.ensemble, &train_x, &train_y)?;

        let accuracy = if test_x.is_empty() {
            None
        } else {
            let correct = ensemble
                .predict(&test_x)
                .iter()
                .zip(&test_y)
                .filter(|(predicted, actual)| predicted == actual)
                .count();
            Some(correct as f64 / test_x.len() as f64)
        };

        let artifact = ModelArtifact {
            version: self.version + 1,
            training_samples: train_x.len() as u64,
            accuracy,
            feature_count: FEATURE_COUNT as u64,
            ensemble,
        };
        save_artifact(&self.config.model_path, &artifact)?;

        let report = TrainingReport {
            version: artifact.version,
            training_samples: train_x.len(),
            test_samples: test_x.len(),
            accuracy_percent: artifact.accuracy_percent(2),
        };

        info!(
            version = report.version,
            training_samples = report.training_samples,
            test_samples = report.test_samples,
            accuracy_percent = ?report.accuracy_percent,
            "model trained"
        );

        self.version = artifact.version;
        self.artifact = Some(artifact);
        Ok(report)
    }

    /// Predict the verdict for one case.
    ///
    /// Loads the persisted artifact on first use. With no model anywhere the
    /// result is the pending/zero-confidence placeholder, not an error.
    pub fn predict(&mut self, case: &CaseRecord) -> Result<Prediction> {
        if self.artifact.is_none() {
            self.load()?;
        }

        let artifact = match &self.artifact {
            Some(artifact) => artifact,
            None => {
                debug!(case_id = %case.case_id, "prediction requested without a model");
                return Ok(Prediction::untrained(self.version));
            }
        };

        let proba = artifact.ensemble.predict_proba_row(&extract_features(case));
        let class = argmax(&proba);
        let verdict = Verdict::from_class_index(class).unwrap_or_default();
        let confidence = (proba[class] * 100.0).floor() as u8;

        let probabilities = Verdict::ALL
            .iter()
            .zip(&proba)
            .map(|(v, p)| (v.name().to_string(), round_to(p * 100.0, 1)))
            .collect();

        debug!(case_id = %case.case_id, verdict = %verdict, confidence, "prediction");

        Ok(Prediction {
            verdict,
            verdict_name: verdict.name().to_string(),
            confidence,
            probabilities,
            rationale: generate_rationale(case),
            model_version: artifact.version,
            model_accuracy_percent: artifact.accuracy_percent(1),
        })
    }

    /// Persist the in-memory artifact
    pub fn save(&self) -> Result<()> {
        let artifact = self.require_model()?;
        save_artifact(&self.config.model_path, artifact)?;
        Ok(())
    }

    /// Load the persisted artifact, replacing the in-memory one.
    ///
    /// Returns `false` when nothing is stored at the model path; the
    /// in-memory state is then left as it was.
    #[instrument(skip(self), fields(path = %self.config.model_path.display()))]
    pub fn load(&mut self) -> Result<bool> {
        let artifact = match load_artifact(&self.config.model_path)? {
            Some(artifact) => artifact,
            None => return Ok(false),
        };

        if artifact.feature_count as usize != FEATURE_COUNT {
            return Err(SmlError::CorruptArtifact(format!(
                "artifact expects {} features, cases produce {}",
                artifact.feature_count, FEATURE_COUNT
            )));
        }
        if artifact.ensemble.n_classes != Verdict::ALL.len() {
            return Err(SmlError::CorruptArtifact(format!(
                "artifact predicts {} classes, verdicts have {}",
                artifact.ensemble.n_classes,
                Verdict::ALL.len()
            )));
        }

        self.version = artifact.version;
        self.artifact = Some(artifact);
        Ok(true)
    }

    /// Delete whatever is stored at the model path, readable or not.
    ///
    /// The in-memory artifact and version are kept, so the next training run
    /// still numbers past them. Returns `false` when no file existed.
    pub fn discard_persisted(&mut self) -> Result<bool> {
        let removed = remove_artifact(&self.config.model_path)?;
        if removed {
            warn!(path = %self.config.model_path.display(), "persisted artifact discarded");
        }
        Ok(removed)
    }
}
