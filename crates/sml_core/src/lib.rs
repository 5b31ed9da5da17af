//! Dispute SML Core - verdict prediction for marketplace disputes
//!
//! Trains a multiclass boosted ensemble of threshold splits on historical
//! dispute cases and serves verdict suggestions with a confidence score and
//! a rule-based rationale.
//!
//! Modules:
//! - `case`: Case records, dispute categories and verdict codes
//! - `features`: Fixed-order 12-feature extraction
//! - `stump`: Single-feature threshold split regressor
//! - `ensemble`: Multiclass boosting over threshold splits
//! - `artifact`: Versioned, hash-checked model artifact and its codec
//! - `model_manager`: Train / evaluate / persist / load / predict lifecycle
//! - `rationale`: Human-readable explanation rules
//! - `config`: TOML configuration with environment overrides
//! - `serde_canon`: Canonical JSON for hashing and audit export

pub mod artifact;
pub mod case;
pub mod config;
pub mod ensemble;
pub mod errors;
pub mod features;
pub mod model_manager;
pub mod rationale;
pub mod serde_canon;
pub mod stump;

pub use artifact::{load_artifact, save_artifact, ModelArtifact};
pub use case::{
    CaseRecord, DisputeCategory, Verdict, MAX_AMOUNT_TIER, MAX_EVIDENCE_QUALITY, NUM_VERDICTS,
};
pub use config::{SmlConfig, TrainingConfig};
pub use ensemble::{BoostedEnsemble, EnsembleConfig};
pub use errors::{Result, SmlError};
pub use features::{extract_features, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use model_manager::{ModelManager, Prediction, TrainingOutcome, TrainingReport};
pub use rationale::generate_rationale;
pub use stump::ThresholdSplit;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
