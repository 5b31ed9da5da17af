//! Oracle adapter against trained and untrained models

use anyhow::Result;
use dispute_sml_core::{CaseRecord, DisputeCategory, ModelManager, SmlConfig, Verdict};
use dispute_sml_oracle::{
    CasePayload, FixedClock, OracleAdapter, OracleError, OraclePublication,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use std::path::Path;
use tempfile::tempdir;

fn evidence_driven_cases(n: usize, seed: u64) -> Vec<CaseRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let mut case = CaseRecord::pending(format!("hist_{}", i));
            case.evidence_quality_a = rng.gen_range(20..100);
            case.evidence_quality_b = rng.gen_range(20..100);
            case.dispute_category = DisputeCategory::ALL[i % 8];
            let gap = case.evidence_quality_a as i32 - case.evidence_quality_b as i32;
            case.final_verdict = if gap > 15 {
                Verdict::PartyAWins.code()
            } else if gap < -15 {
                Verdict::PartyBWins.code()
            } else {
                Verdict::Split.code()
            };
            case
        })
        .collect()
}

fn trained_adapter(path: &Path) -> Result<OracleAdapter<FixedClock>> {
    let mut config = SmlConfig::with_model_path(path);
    config.ensemble.n_estimators = 20;
    config.training.seed = Some(9);

    let mut manager = ModelManager::new(config);
    manager.train(&evidence_driven_cases(150, 9))?;
    Ok(OracleAdapter::with_clock(manager, FixedClock(1_700_000_000)))
}

#[test]
fn test_publication_shape() -> Result<()> {
    let dir = tempdir()?;
    let mut oracle = trained_adapter(&dir.path().join("model.bin"))?;

    let out = oracle.prediction_for_case(
        r#"{"case_id":"job-77","evidence_quality_a":95,"evidence_quality_b":22}"#,
    )?;
    let json: Value = serde_json::from_str(&out)?;

    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        ["case_id", "confidence", "model_version", "predicted_verdict", "timestamp"]
    );
    assert_eq!(json["case_id"], "job-77");
    assert_eq!(json["timestamp"], 1_700_000_000i64);
    assert_eq!(json["model_version"], 2);

    let publication: OraclePublication = serde_json::from_str(&out)?;
    assert_eq!(publication.predicted_verdict, Verdict::PartyAWins);
    assert!(publication.confidence > 0);
    Ok(())
}

#[test]
fn test_defaults_match_pending_case() -> Result<()> {
    let dir = tempdir()?;
    let mut oracle = trained_adapter(&dir.path().join("model.bin"))?;

    let from_payload = oracle.predict_payload(serde_json::from_str(r#"{"case_id":"d"}"#)?)?;
    let direct = oracle.manager_mut().predict(&CaseRecord::pending("d"))?;
    assert_eq!(from_payload, direct);
    Ok(())
}

#[test]
fn test_untrained_oracle_publishes_placeholder() -> Result<()> {
    let dir = tempdir()?;
    let manager = ModelManager::with_model_path(dir.path().join("none.bin"));
    let mut oracle = OracleAdapter::with_clock(manager, FixedClock(42));

    let publication: OraclePublication =
        serde_json::from_str(&oracle.prediction_for_case(r#"{"case_id":"x"}"#)?)?;
    assert_eq!(publication.predicted_verdict, Verdict::Pending);
    assert_eq!(publication.confidence, 0);
    assert_eq!(publication.model_version, 1);
    assert_eq!(publication.timestamp, 42);
    Ok(())
}

#[test]
fn test_bad_payloads_are_errors() -> Result<()> {
    let dir = tempdir()?;
    let mut oracle = trained_adapter(&dir.path().join("model.bin"))?;

    assert!(matches!(
        oracle.prediction_for_case("not json"),
        Err(OracleError::MalformedPayload(_))
    ));
    assert!(matches!(
        oracle.prediction_for_case(r#"{"dispute_category":8}"#),
        Err(OracleError::InvalidField { .. })
    ));
    assert!(matches!(
        oracle.publish(CasePayload::from_json(r#"{"evidence_quality_b":150}"#)?),
        Err(OracleError::InvalidField {
            field: "evidence_quality_b",
            ..
        })
    ));
    Ok(())
}

#[test]
fn test_system_clock_is_current() -> Result<()> {
    let dir = tempdir()?;
    let manager = ModelManager::with_model_path(dir.path().join("none.bin"));
    let mut oracle = OracleAdapter::new(manager);

    let before = chrono::Utc::now().timestamp();
    let publication: OraclePublication =
        serde_json::from_str(&oracle.prediction_for_case("{}")?)?;
    assert!(publication.timestamp >= before);
    assert_eq!(publication.case_id, "");
    Ok(())
}
