//! Dispute SML Trainer - offline tooling for the verdict model
//!
//! Loads case datasets, generates synthetic cases and drives the model
//! lifecycle from the command line.

pub mod dataset;
pub mod synthetic;

use anyhow::{Context, Result};
use dispute_sml_core::{ModelManager, SmlConfig, TrainingReport};
use std::path::Path;

pub use dataset::{load_cases, parse_cases, write_cases, DatasetStats};
pub use synthetic::{generate_cases, synthetic_case};

/// Train and persist a model directly from a dataset file
pub fn train_from_file(path: &Path, config: SmlConfig) -> Result<TrainingReport> {
    let cases = load_cases(path)?;
    let mut manager = ModelManager::new(config);
    manager
        .train(&cases)
        .with_context(|| format!("Training on {} failed", path.display()))
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
