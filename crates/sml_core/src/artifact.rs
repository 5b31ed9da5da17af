//! Model artifact and its on-disk envelope
//!
//! The persisted blob is a bincode-encoded envelope:
//!
//! ```text
//! magic "DSML" | format_version u32 | model_hash (hex) | artifact
//! artifact = version, training_samples, accuracy?, feature_count,
//!            ensemble { n_estimators, learning_rate, n_classes,
//!                       initial_scores[n_classes],
//!                       rounds[n_estimators][n_classes] {feature_idx, threshold, left, right} }
//! ```
//!
//! The hash is BLAKE3 over the artifact's canonical JSON and is checked on
//! every load along with the ensemble's shape.

use crate::ensemble::BoostedEnsemble;
use crate::errors::{Result, SmlError};
use crate::serde_canon::{hash_canonical_hex, to_canonical_json_pretty};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Leading bytes of every persisted artifact
pub const ARTIFACT_MAGIC: [u8; 4] = *b"DSML";

/// Current envelope layout version
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// A trained ensemble plus its training metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Incremented on every successful training run
    pub version: u32,
    /// Rows the ensemble was fit on
    pub training_samples: u64,
    /// Held-out accuracy in [0, 1]; `None` when the test split was empty
    pub accuracy: Option<f64>,
    /// Width of the feature vectors the ensemble expects
    pub feature_count: u64,
    pub ensemble: BoostedEnsemble,
}

impl ModelArtifact {
    /// BLAKE3 hash of the canonical JSON form
    pub fn hash_hex(&self) -> Result<String> {
        Ok(hash_canonical_hex(self)?)
    }

    /// Indented canonical JSON, for audit exports
    pub fn to_canonical_json_pretty(&self) -> Result<String> {
        Ok(to_canonical_json_pretty(self)?)
    }

    /// Held-out accuracy as a percentage rounded to `decimals` places
    pub fn accuracy_percent(&self, decimals: i32) -> Option<f64> {
        self.accuracy.map(|acc| round_to(acc * 100.0, decimals))
    }

    /// Structural checks on a decoded artifact
    pub fn validate(&self) -> Result<()> {
        if let Some(acc) = self.accuracy {
            if !(0.0..=1.0).contains(&acc) {
                return Err(SmlError::CorruptArtifact(format!(
                    "accuracy {} outside [0, 1]",
                    acc
                )));
            }
        }
        self.ensemble
            .validate(self.feature_count as usize)
            .map_err(SmlError::CorruptArtifact)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct EnvelopeHeader {
    magic: [u8; 4],
    format_version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactEnvelope {
    magic: [u8; 4],
    format_version: u32,
    model_hash: String,
    artifact: ModelArtifact,
}

/// Encode an artifact into its persisted byte form
pub fn encode(artifact: &ModelArtifact) -> Result<Vec<u8>> {
    encode_with_hash(artifact).map(|(bytes, _)| bytes)
}

fn encode_with_hash(artifact: &ModelArtifact) -> Result<(Vec<u8>, String)> {
    let envelope = ArtifactEnvelope {
        magic: ARTIFACT_MAGIC,
        format_version: ARTIFACT_FORMAT_VERSION,
        model_hash: artifact.hash_hex()?,
        artifact: artifact.clone(),
    };
    let bytes = bincode::serialize(&envelope)?;
    Ok((bytes, envelope.model_hash))
}

/// Decode and verify a persisted artifact
pub fn decode(bytes: &[u8]) -> Result<ModelArtifact> {
    let header: EnvelopeHeader = bincode::deserialize(bytes)?;
    if header.magic != ARTIFACT_MAGIC {
        return Err(SmlError::CorruptArtifact(
            "not a dispute SML artifact".to_string(),
        ));
    }
    if header.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(SmlError::CorruptArtifact(format!(
            "unsupported artifact format version {}",
            header.format_version
        )));
    }

    let envelope: ArtifactEnvelope = bincode::deserialize(bytes)?;
    let expected = envelope.artifact.hash_hex()?;
    if envelope.model_hash != expected {
        return Err(SmlError::CorruptArtifact("model hash mismatch".to_string()));
    }

    envelope.artifact.validate()?;
    Ok(envelope.artifact)
}

/// Write an artifact, replacing whatever is stored at `path`
pub fn save_artifact(path: &Path, artifact: &ModelArtifact) -> Result<u64> {
    let (data, hash) = encode_with_hash(artifact)?;

    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|e| SmlError::persistence(parent, e))?;
            parent
        }
        None => Path::new("."),
    };

    // Uniquely named staging file in the target directory, then swap it in
    let mut staging = NamedTempFile::new_in(dir).map_err(|e| SmlError::persistence(dir, e))?;
    staging
        .write_all(&data)
        .and_then(|()| staging.as_file().sync_all())
        .map_err(|e| SmlError::persistence(staging.path(), e))?;
    staging
        .persist(path)
        .map_err(|e| SmlError::persistence(path, e.error))?;

    info!(
        path = %path.display(),
        bytes = data.len(),
        version = artifact.version,
        hash = %hash,
        "model artifact saved"
    );
    Ok(data.len() as u64)
}

/// Read the artifact at `path`; `Ok(None)` when nothing is stored there
pub fn load_artifact(path: &Path) -> Result<Option<ModelArtifact>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no persisted model artifact");
            return Ok(None);
        }
        Err(e) => return Err(SmlError::persistence(path, e)),
    };

    let artifact = decode(&bytes)?;
    info!(
        path = %path.display(),
        bytes = bytes.len(),
        version = artifact.version,
        "model artifact loaded"
    );
    Ok(Some(artifact))
}

/// Delete the artifact at `path`; `Ok(false)` when nothing was stored there
pub fn remove_artifact(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SmlError::persistence(path, e)),
    }
}

/// Round half away from zero to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
