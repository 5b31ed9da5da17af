//! Dispute SML Oracle - publishes verdict predictions for ledger submission
//!
//! Wraps a [`ModelManager`]: an external JSON case payload goes in, a flat
//! publication record comes out. Missing payload fields fall back to the
//! neutral values of a pending case.

pub mod errors;
pub mod payload;

use chrono::Utc;
use dispute_sml_core::{ModelManager, Prediction};
use tracing::{debug, info};

pub use errors::{OracleError, Result};
pub use payload::{CasePayload, OraclePublication};

/// Source of publication timestamps
pub trait Clock: Send + Sync {
    /// Current time in UNIX seconds
    fn unix_seconds(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn unix_seconds(&self) -> i64 {
        self.0
    }
}

/// Oracle front end over a model manager
pub struct OracleAdapter<C: Clock = SystemClock> {
    manager: ModelManager,
    clock: C,
}

impl OracleAdapter<SystemClock> {
    pub fn new(manager: ModelManager) -> Self {
        Self::with_clock(manager, SystemClock)
    }
}

impl<C: Clock> OracleAdapter<C> {
    pub fn with_clock(manager: ModelManager, clock: C) -> Self {
        Self { manager, clock }
    }

    pub fn manager(&self) -> &ModelManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ModelManager {
        &mut self.manager
    }

    /// Full prediction for a parsed payload
    pub fn predict_payload(&mut self, payload: CasePayload) -> Result<Prediction> {
        let case = payload.into_case_record()?;
        Ok(self.manager.predict(&case)?)
    }

    /// Publication record for a parsed payload
    pub fn publish(&mut self, payload: CasePayload) -> Result<OraclePublication> {
        let case_id = payload.case_id.clone().unwrap_or_default();
        let prediction = self.predict_payload(payload)?;

        let publication = OraclePublication {
            case_id,
            predicted_verdict: prediction.verdict,
            confidence: prediction.confidence,
            model_version: prediction.model_version,
            timestamp: self.clock.unix_seconds(),
        };

        if prediction.is_model_backed() {
            info!(
                case_id = %publication.case_id,
                verdict = %publication.predicted_verdict,
                confidence = publication.confidence,
                "oracle prediction published"
            );
        } else {
            debug!(case_id = %publication.case_id, "publishing placeholder, no model");
        }
        Ok(publication)
    }

    /// JSON in, JSON out
    pub fn prediction_for_case(&mut self, case_json: &str) -> Result<String> {
        let payload = CasePayload::from_json(case_json)?;
        let publication = self.publish(payload)?;
        Ok(serde_json::to_string(&publication)?)
    }
}
