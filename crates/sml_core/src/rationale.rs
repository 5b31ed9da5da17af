//! Rule-based explanations attached to predictions
//!
//! The notes come from fixed rules over the raw case fields, not from the
//! ensemble. Rules are evaluated in a fixed order and joined with `"; "`,
//! so the same case always yields the same text.

use crate::case::{CaseRecord, DisputeCategory};

/// Evidence quality gap (points) above which one side is called stronger
pub const EVIDENCE_GAP: i32 = 20;

/// Prior dispute gap above which one side's history is called out
pub const PRIOR_DISPUTE_GAP: i64 = 2;

pub const STRONGER_EVIDENCE_A: &str = "Party A has stronger evidence";
pub const STRONGER_EVIDENCE_B: &str = "Party B has stronger evidence";
pub const FASTER_RESPONSE_A: &str = "Party A responded more quickly";
pub const FASTER_RESPONSE_B: &str = "Party B responded more quickly";
pub const MORE_PRIORS_A: &str = "Party A has more prior disputes (negative signal)";
pub const MORE_PRIORS_B: &str = "Party B has more prior disputes (negative signal)";
pub const NON_DELIVERY_NOTE: &str = "Non-delivery cases typically favor claimant if evidence is clear";
pub const QUALITY_ISSUE_NOTE: &str = "Quality disputes often result in partial resolutions";
pub const BALANCED_NOTE: &str =
    "Case features are balanced; prediction based on similar historical cases";

/// Notes triggered by a case, in rule order
pub fn rationale_notes(case: &CaseRecord) -> Vec<&'static str> {
    let mut notes = Vec::new();

    let evidence_a = case.evidence_quality_a as i32;
    let evidence_b = case.evidence_quality_b as i32;
    if evidence_a > evidence_b + EVIDENCE_GAP {
        notes.push(STRONGER_EVIDENCE_A);
    } else if evidence_b > evidence_a + EVIDENCE_GAP {
        notes.push(STRONGER_EVIDENCE_B);
    }

    let response_a = case.response_time_a as f64;
    let response_b = case.response_time_b as f64;
    if response_a < response_b / 2.0 {
        notes.push(FASTER_RESPONSE_A);
    } else if response_b < response_a / 2.0 {
        notes.push(FASTER_RESPONSE_B);
    }

    let priors_a = case.prior_disputes_a as i64;
    let priors_b = case.prior_disputes_b as i64;
    if priors_a > priors_b + PRIOR_DISPUTE_GAP {
        notes.push(MORE_PRIORS_A);
    } else if priors_b > priors_a + PRIOR_DISPUTE_GAP {
        notes.push(MORE_PRIORS_B);
    }

    match case.dispute_category {
        DisputeCategory::NonDelivery => notes.push(NON_DELIVERY_NOTE),
        DisputeCategory::QualityIssue => notes.push(QUALITY_ISSUE_NOTE),
        _ => {}
    }

    notes
}

/// Human-readable rationale for a case
pub fn generate_rationale(case: &CaseRecord) -> String {
    let notes = rationale_notes(case);
    if notes.is_empty() {
        BALANCED_NOTE.to_string()
    } else {
        notes.join("; ")
    }
}
