//! Feature extraction for dispute cases
//!
//! Turns a [`CaseRecord`] into a fixed-width real vector. Pure function,
//! no hidden state.

use crate::case::{CaseRecord, DisputeCategory, MAX_AMOUNT_TIER, MAX_EVIDENCE_QUALITY};

/// Width of the feature vector
pub const FEATURE_COUNT: usize = 12;

/// Feature vector consumed by the ensemble
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Response times are capped at one week
pub const MAX_RESPONSE_HOURS: u32 = 168;

/// Prior dispute counts are capped at ten
pub const MAX_PRIOR_DISPUTES: u32 = 10;

/// Column names, in feature order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "job_category",
    "dispute_category",
    "amount_tier",
    "evidence_quality_a",
    "evidence_quality_b",
    "response_time_a",
    "response_time_b",
    "prior_disputes_a",
    "prior_disputes_b",
    "evidence_diff",
    "response_diff",
    "dispute_diff",
];

/// Extract features from a case record
///
/// Features:
/// 0. job category / 100
/// 1. dispute category / 7
/// 2. amount tier / 4
/// 3-4. evidence quality A, B / 100
/// 5-6. response time A, B capped at 168h / 168
/// 7-8. prior disputes A, B capped at 10 / 10
/// 9. evidence gap (A - B) / 100
/// 10. response gap (B - A) / 168, zero when neither party has a response time
/// 11. prior dispute gap (B - A) / 10
pub fn extract_features(case: &CaseRecord) -> FeatureVector {
    let response_a = case.response_time_a as f64;
    let response_b = case.response_time_b as f64;
    let max_hours = MAX_RESPONSE_HOURS as f64;
    let max_priors = MAX_PRIOR_DISPUTES as f64;
    let max_evidence = MAX_EVIDENCE_QUALITY as f64;

    // Guards only the both-zero case; one zero side passes through.
    let response_diff = if case.response_time_a as u64 + case.response_time_b as u64 > 0 {
        (response_b - response_a) / max_hours
    } else {
        0.0
    };

    [
        case.job_category as f64 / 100.0,
        case.dispute_category.code() as f64 / DisputeCategory::MAX_CODE as f64,
        case.amount_tier as f64 / MAX_AMOUNT_TIER as f64,
        case.evidence_quality_a as f64 / max_evidence,
        case.evidence_quality_b as f64 / max_evidence,
        case.response_time_a.min(MAX_RESPONSE_HOURS) as f64 / max_hours,
        case.response_time_b.min(MAX_RESPONSE_HOURS) as f64 / max_hours,
        case.prior_disputes_a.min(MAX_PRIOR_DISPUTES) as f64 / max_priors,
        case.prior_disputes_b.min(MAX_PRIOR_DISPUTES) as f64 / max_priors,
        (case.evidence_quality_a as f64 - case.evidence_quality_b as f64) / max_evidence,
        response_diff,
        (case.prior_disputes_b as f64 - case.prior_disputes_a as f64) / max_priors,
    ]
}

/// Extract feature vectors and training labels, dropping records whose
/// verdict code is outside the class range
pub fn extract_labelled(cases: &[CaseRecord]) -> (Vec<FeatureVector>, Vec<usize>) {
    cases
        .iter()
        .filter_map(|case| case.label().map(|label| (extract_features(case), label)))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::Verdict;

    fn sample_case() -> CaseRecord {
        CaseRecord {
            case_id: "test_001".to_string(),
            job_category: 5,
            dispute_category: DisputeCategory::QualityIssue,
            amount_tier: 2,
            evidence_quality_a: 85,
            evidence_quality_b: 40,
            response_time_a: 6,
            response_time_b: 48,
            prior_disputes_a: 0,
            prior_disputes_b: 3,
            votes: vec![true; 10],
            confidences: vec![80; 10],
            final_verdict: Verdict::PartyAWins.code(),
            auto_resolved: true,
            consensus_strength: 90,
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{} != {}", a, b);
    }

    #[test]
    fn test_extract_features_layout() {
        let f = extract_features(&sample_case());
        assert_eq!(f.len(), FEATURE_NAMES.len());
        assert_close(f[0], 0.05);
        assert_close(f[1], 1.0 / 7.0);
        assert_close(f[2], 0.5);
        assert_close(f[3], 0.85);
        assert_close(f[4], 0.40);
        assert_close(f[5], 6.0 / 168.0);
        assert_close(f[6], 48.0 / 168.0);
        assert_close(f[7], 0.0);
        assert_close(f[8], 0.3);
        assert_close(f[9], 0.45);
        assert_close(f[10], 42.0 / 168.0);
        assert_close(f[11], 0.3);
    }

    #[test]
    fn test_caps_apply_to_raw_columns_only() {
        let mut case = sample_case();
        case.response_time_a = 500;
        case.response_time_b = 0;
        case.prior_disputes_a = 25;

        let f = extract_features(&case);
        assert_close(f[5], 1.0);
        assert_close(f[6], 0.0);
        assert_close(f[7], 1.0);
        // Gap columns use the uncapped values
        assert_close(f[10], -500.0 / 168.0);
        assert_close(f[11], (3.0 - 25.0) / 10.0);
    }

    #[test]
    fn test_response_diff_zero_when_both_zero() {
        let mut case = sample_case();
        case.response_time_a = 0;
        case.response_time_b = 0;
        assert_eq!(extract_features(&case)[10], 0.0);

        case.response_time_b = 12;
        assert_close(extract_features(&case)[10], 12.0 / 168.0);
    }

    #[test]
    fn test_audit_fields_do_not_affect_features() {
        let case = sample_case();
        let mut other = case.clone();
        other.votes = vec![false; 3];
        other.confidences = vec![1, 2, 3];
        other.auto_resolved = false;
        other.consensus_strength = 0;
        other.final_verdict = Verdict::Split.code();
        assert_eq!(extract_features(&case), extract_features(&other));
    }

    #[test]
    fn test_extract_labelled_drops_invalid_labels() {
        let valid = sample_case();
        let mut invalid = sample_case();
        invalid.final_verdict = 9;

        let (features, labels) = extract_labelled(&[valid.clone(), invalid, valid]);
        assert_eq!(features.len(), 2);
        assert_eq!(labels, vec![1, 1]);
    }
}
