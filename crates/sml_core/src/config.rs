//! Engine configuration
//!
//! Loaded from TOML, optionally overridden from `DISPUTE_SML_*`
//! environment variables.

use crate::ensemble::EnsembleConfig;
use crate::errors::{Result, SmlError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "DISPUTE_SML_";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmlConfig {
    /// Location of the persisted model artifact
    pub model_path: PathBuf,
    /// Boosting hyperparameters
    pub ensemble: EnsembleConfig,
    /// Train/evaluate split settings
    pub training: TrainingConfig,
}

/// Training run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of usable rows held out for evaluation
    pub test_fraction: f64,
    /// Minimum usable rows, checked before and after label filtering
    pub min_samples: usize,
    /// Seed for the split permutation; fresh entropy when unset
    pub seed: Option<u64>,
}

impl Default for SmlConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/dispute_sml_model.bin"),
            ensemble: EnsembleConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            min_samples: 10,
            seed: None,
        }
    }
}

impl SmlConfig {
    /// Default configuration with a different artifact location
    pub fn with_model_path(path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: path.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content =
            std::fs::read_to_string(path).map_err(|e| SmlError::persistence(path, e))?;
        toml::from_str(&content)
            .map_err(|e| SmlError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Write configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| SmlError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| SmlError::persistence(path, e))
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a key lookup; unparsable values are ignored
    /// with a warning
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(val) = get("MODEL_PATH") {
            self.model_path = PathBuf::from(val);
        }
        if let Some(val) = get("N_ESTIMATORS") {
            override_parsed("N_ESTIMATORS", &val, &mut self.ensemble.n_estimators);
        }
        if let Some(val) = get("LEARNING_RATE") {
            override_parsed("LEARNING_RATE", &val, &mut self.ensemble.learning_rate);
        }
        if let Some(val) = get("TEST_FRACTION") {
            override_parsed("TEST_FRACTION", &val, &mut self.training.test_fraction);
        }
        if let Some(val) = get("MIN_SAMPLES") {
            override_parsed("MIN_SAMPLES", &val, &mut self.training.min_samples);
        }
        if let Some(val) = get("SEED") {
            match val.parse() {
                Ok(seed) => self.training.seed = Some(seed),
                Err(_) => warn!("Ignoring {}SEED={:?}: not a u64", ENV_PREFIX, val),
            }
        }
    }

    /// Validate configuration.
    ///
    /// Hard errors for values training cannot run with; warnings for
    /// values that run but are probably unintended.
    pub fn validate(&self) -> Result<Vec<String>> {
        self.ensemble.validate()?;

        let fraction = self.training.test_fraction;
        if !(0.0..1.0).contains(&fraction) {
            return Err(SmlError::InvalidParameters(format!(
                "test_fraction must be in [0, 1), got {}",
                fraction
            )));
        }

        if self.ensemble.n_classes != crate::case::NUM_VERDICTS {
            return Err(SmlError::InvalidParameters(format!(
                "n_classes must be {} to map onto verdicts, got {}",
                crate::case::NUM_VERDICTS,
                self.ensemble.n_classes
            )));
        }

        let mut warnings = Vec::new();
        if fraction == 0.0 {
            warnings.push("test_fraction is 0, accuracy will not be measured".to_string());
        }
        if self.ensemble.learning_rate > 1.0 {
            warnings.push("learning_rate above 1.0 may diverge".to_string());
        }
        if self.training.min_samples < 10 {
            warnings.push(format!(
                "min_samples is {}, below the recommended 10",
                self.training.min_samples
            ));
        }

        if warnings.is_empty() {
            info!("Configuration validation passed");
        } else {
            warn!("Configuration validation warnings: {:?}", warnings);
        }
        Ok(warnings)
    }
}

fn override_parsed<T: std::str::FromStr>(name: &str, raw: &str, slot: &mut T) {
    match raw.parse() {
        Ok(value) => *slot = value,
        Err(_) => warn!("Ignoring {}{}={:?}: invalid value", ENV_PREFIX, name, raw),
    }
}
