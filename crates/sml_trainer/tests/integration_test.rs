//! Dataset-to-model workflow through the trainer library

use anyhow::Result;
use dispute_sml_core::artifact::load_artifact;
use dispute_sml_core::{ModelManager, SmlConfig, Verdict};
use dispute_sml_trainer::{generate_cases, load_cases, train_from_file, write_cases, DatasetStats};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

fn seeded_config(model_path: std::path::PathBuf) -> SmlConfig {
    let mut config = SmlConfig::with_model_path(model_path);
    config.ensemble.n_estimators = 20;
    config.training.seed = Some(42);
    config
}

#[test]
fn test_synthetic_dataset_trains_end_to_end() -> Result<()> {
    let dir = tempdir()?;
    let data_path = dir.path().join("data").join("cases.jsonl");
    let model_path = dir.path().join("model.bin");

    let cases = generate_cases(300, &mut StdRng::seed_from_u64(7));
    write_cases(&data_path, &cases)?;
    assert_eq!(load_cases(&data_path)?, cases);

    let report = train_from_file(&data_path, seeded_config(model_path.clone()))?;
    assert_eq!(report.version, 2);
    assert_eq!(report.test_samples, 60);
    assert_eq!(report.training_samples, 240);

    let artifact = load_artifact(&model_path)?.expect("artifact written");
    assert_eq!(artifact.training_samples, 240);
    assert_eq!(artifact.ensemble.num_splits(), 20 * 6);
    Ok(())
}

#[test]
fn test_training_is_reproducible_with_seed() -> Result<()> {
    let dir = tempdir()?;
    let data_path = dir.path().join("cases.jsonl");
    write_cases(&data_path, &generate_cases(120, &mut StdRng::seed_from_u64(1)))?;

    train_from_file(&data_path, seeded_config(dir.path().join("a.bin")))?;
    train_from_file(&data_path, seeded_config(dir.path().join("b.bin")))?;

    let a = load_artifact(&dir.path().join("a.bin"))?.expect("a");
    let b = load_artifact(&dir.path().join("b.bin"))?.expect("b");
    assert_eq!(a, b);
    assert_eq!(a.hash_hex()?, b.hash_hex()?);
    Ok(())
}

#[test]
fn test_out_of_range_verdicts_are_skipped() -> Result<()> {
    let dir = tempdir()?;
    let mut cases = generate_cases(40, &mut StdRng::seed_from_u64(3));
    for case in cases.iter_mut().take(10) {
        case.final_verdict = 9;
    }
    let stats = DatasetStats::from_cases(&cases);
    assert_eq!(stats.labelled, 30);

    let data_path = dir.path().join("cases.jsonl");
    write_cases(&data_path, &cases)?;
    let report = train_from_file(&data_path, seeded_config(dir.path().join("m.bin")))?;
    assert_eq!(report.training_samples + report.test_samples, 30);
    Ok(())
}

#[test]
fn test_too_small_dataset_fails() -> Result<()> {
    let dir = tempdir()?;
    let mut file = NamedTempFile::new()?;
    for case in generate_cases(4, &mut StdRng::seed_from_u64(4)) {
        writeln!(file, "{}", serde_json::to_string(&case)?)?;
    }
    file.flush()?;

    let model_path = dir.path().join("m.bin");
    let err = train_from_file(file.path(), seeded_config(model_path.clone())).unwrap_err();
    assert!(format!("{:#}", err).contains("Insufficient"));
    assert!(!model_path.exists());
    Ok(())
}

#[test]
fn test_trained_model_serves_predictions() -> Result<()> {
    let dir = tempdir()?;
    let data_path = dir.path().join("cases.jsonl");
    let model_path = dir.path().join("model.bin");
    write_cases(&data_path, &generate_cases(400, &mut StdRng::seed_from_u64(11)))?;
    train_from_file(&data_path, seeded_config(model_path.clone()))?;

    let mut manager = ModelManager::new(seeded_config(model_path));
    let mut case = dispute_sml_core::CaseRecord::pending("fresh");
    case.evidence_quality_a = 98;
    case.evidence_quality_b = 21;

    let prediction = manager.predict(&case)?;
    assert!(prediction.is_model_backed());
    assert_eq!(prediction.verdict, Verdict::PartyAWins);
    assert_eq!(prediction.model_version, 2);
    Ok(())
}
