//! Incoming case payloads and outgoing publication records

use crate::errors::{OracleError, Result};
use dispute_sml_core::{
    CaseRecord, DisputeCategory, Verdict, MAX_AMOUNT_TIER, MAX_EVIDENCE_QUALITY,
};
use serde::{Deserialize, Serialize};

/// Case payload as submitted by an external caller.
///
/// Every field is optional; absent fields take the neutral values a pending
/// case starts with. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CasePayload {
    pub case_id: Option<String>,
    pub job_category: Option<u16>,
    pub dispute_category: Option<u8>,
    pub amount_tier: Option<u8>,
    pub evidence_quality_a: Option<u8>,
    pub evidence_quality_b: Option<u8>,
    pub response_time_a: Option<u32>,
    pub response_time_b: Option<u32>,
    pub prior_disputes_a: Option<u32>,
    pub prior_disputes_b: Option<u32>,
}

impl CasePayload {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the case record fed to the model
    pub fn into_case_record(self) -> Result<CaseRecord> {
        let mut case = CaseRecord::pending(self.case_id.unwrap_or_default());

        if let Some(code) = self.dispute_category {
            case.dispute_category = DisputeCategory::try_from(code).map_err(|reason| {
                OracleError::InvalidField {
                    field: "dispute_category",
                    reason,
                }
            })?;
        }
        case.job_category = self.job_category.unwrap_or(case.job_category);
        case.amount_tier = bounded("amount_tier", self.amount_tier, MAX_AMOUNT_TIER)?
            .unwrap_or(case.amount_tier);
        case.evidence_quality_a =
            bounded("evidence_quality_a", self.evidence_quality_a, MAX_EVIDENCE_QUALITY)?
                .unwrap_or(case.evidence_quality_a);
        case.evidence_quality_b =
            bounded("evidence_quality_b", self.evidence_quality_b, MAX_EVIDENCE_QUALITY)?
                .unwrap_or(case.evidence_quality_b);
        case.response_time_a = self.response_time_a.unwrap_or(case.response_time_a);
        case.response_time_b = self.response_time_b.unwrap_or(case.response_time_b);
        case.prior_disputes_a = self.prior_disputes_a.unwrap_or(case.prior_disputes_a);
        case.prior_disputes_b = self.prior_disputes_b.unwrap_or(case.prior_disputes_b);

        Ok(case)
    }
}

fn bounded(field: &'static str, value: Option<u8>, max: u8) -> Result<Option<u8>> {
    match value {
        Some(v) if v > max => Err(OracleError::InvalidField {
            field,
            reason: format!("{} exceeds the maximum of {}", v, max),
        }),
        other => Ok(other),
    }
}

/// Flat record submitted to the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OraclePublication {
    pub case_id: String,
    /// Ledger verdict code
    pub predicted_verdict: Verdict,
    /// Truncated percentage, 0 when no model is available
    pub confidence: u8,
    pub model_version: u32,
    /// UNIX seconds
    pub timestamp: i64,
}
