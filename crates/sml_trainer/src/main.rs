//! Dispute SML CLI
//!
//! Trains, inspects and queries the dispute verdict model. Results go to
//! stdout as JSON; logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dispute_sml_core::artifact::load_artifact;
use dispute_sml_core::{ModelManager, SmlConfig, TrainingOutcome, Verdict, FEATURE_NAMES};
use dispute_sml_oracle::{CasePayload, OracleAdapter};
use dispute_sml_trainer::{generate_cases, load_cases, write_cases, DatasetStats};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sml-trainer")]
#[command(author = "Dispute SML Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dispute verdict model: train, inspect, predict", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model artifact path (overrides config and environment)
    #[arg(short, long, global = true)]
    model: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a new model version from a case dataset
    Train(TrainArgs),
    /// Predict the verdict for one case
    Predict(CaseArgs),
    /// Produce the oracle publication record for one case
    Oracle(CaseArgs),
    /// Write a synthetic case dataset
    Synth(SynthArgs),
    /// Describe the persisted model
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Case dataset (JSON Lines)
    #[arg(short, long)]
    input: PathBuf,

    /// Number of boosting rounds
    #[arg(long)]
    estimators: Option<usize>,

    /// Shrinkage per round
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Held-out fraction for evaluation
    #[arg(long)]
    test_fraction: Option<f64>,

    /// Seed for the train/test split
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct CaseArgs {
    /// Case payload as inline JSON; missing fields take neutral defaults
    #[arg(long, conflicts_with = "case_file")]
    case: Option<String>,

    /// File holding the case payload
    #[arg(long)]
    case_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SynthArgs {
    /// Output dataset (JSON Lines)
    #[arg(short, long)]
    output: PathBuf,

    /// Number of cases
    #[arg(short = 'n', long, default_value = "500")]
    count: usize,

    /// Generator seed
    #[arg(long, default_value = "42")]
    seed: u64,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Print the full artifact as canonical JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = load_config(&cli)?;

    match cli.command {
        Command::Train(args) => train(config, args),
        Command::Predict(args) => predict(config, args),
        Command::Oracle(args) => oracle(config, args),
        Command::Synth(args) => synth(args),
        Command::Inspect(args) => inspect(config, args),
    }
}

/// File, then environment, then command line
fn load_config(cli: &Cli) -> Result<SmlConfig> {
    let mut config = match &cli.config {
        Some(path) => SmlConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SmlConfig::default(),
    };
    config.apply_env_overrides();
    if let Some(model) = &cli.model {
        config.model_path = model.clone();
    }
    Ok(config)
}

fn train(mut config: SmlConfig, args: TrainArgs) -> Result<()> {
    if let Some(estimators) = args.estimators {
        config.ensemble.n_estimators = estimators;
    }
    if let Some(learning_rate) = args.learning_rate {
        config.ensemble.learning_rate = learning_rate;
    }
    if let Some(test_fraction) = args.test_fraction {
        config.training.test_fraction = test_fraction;
    }
    if args.seed.is_some() {
        config.training.seed = args.seed;
    }
    config.validate().context("Invalid training configuration")?;

    info!("Dispute SML Trainer v{}", env!("CARGO_PKG_VERSION"));
    let cases = load_cases(&args.input)?;
    let stats = DatasetStats::from_cases(&cases);
    info!(
        "Loaded {} cases, {} with a usable verdict",
        stats.total, stats.labelled
    );
    if stats.unlabelled() > 0 {
        warn!("{} cases carry out-of-range verdict codes and will be skipped", stats.unlabelled());
    }
    for (verdict, count) in Verdict::ALL.iter().zip(stats.label_counts) {
        info!("  {:<14} {}", verdict.name(), count);
    }
    for (name, (min, max)) in FEATURE_NAMES.iter().zip(&stats.feature_ranges) {
        info!("  {:<20} min={:.3} max={:.3}", name, min, max);
    }

    info!(
        "Training: {} rounds, learning rate {}, test fraction {}",
        config.ensemble.n_estimators, config.ensemble.learning_rate, config.training.test_fraction
    );
    let mut manager = ModelManager::new(config);
    let result = manager.train(&cases);
    let failed = result.is_err();

    println!("{}", serde_json::to_string_pretty(&TrainingOutcome::from(result))?);
    if failed {
        bail!("training failed");
    }
    info!("Model written to {}", manager.model_path().display());
    Ok(())
}

fn read_payload(args: &CaseArgs) -> Result<CasePayload> {
    let json = match (&args.case, &args.case_file) {
        (Some(json), _) => json.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read case file {}", path.display()))?,
        (None, None) => bail!("provide a case with --case or --case-file"),
    };
    CasePayload::from_json(&json).context("Invalid case payload")
}

fn predict(config: SmlConfig, args: CaseArgs) -> Result<()> {
    let payload = read_payload(&args)?;
    let mut oracle = OracleAdapter::new(ModelManager::new(config));
    let prediction = oracle.predict_payload(payload)?;
    if !prediction.is_model_backed() {
        warn!("No trained model found; returning placeholder verdict");
    }
    println!("{}", serde_json::to_string_pretty(&prediction)?);
    Ok(())
}

fn oracle(config: SmlConfig, args: CaseArgs) -> Result<()> {
    let payload = read_payload(&args)?;
    let mut oracle = OracleAdapter::new(ModelManager::new(config));
    let publication = oracle.publish(payload)?;
    println!("{}", serde_json::to_string(&publication)?);
    Ok(())
}

fn synth(args: SynthArgs) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let cases = generate_cases(args.count, &mut rng);
    write_cases(&args.output, &cases)?;
    info!(
        "Wrote {} synthetic cases to {} (seed {})",
        cases.len(),
        args.output.display(),
        args.seed
    );
    Ok(())
}

fn inspect(config: SmlConfig, args: InspectArgs) -> Result<()> {
    let artifact = match load_artifact(&config.model_path)? {
        Some(artifact) => artifact,
        None => bail!("no model at {}", config.model_path.display()),
    };

    if args.json {
        println!("{}", artifact.to_canonical_json_pretty()?);
        return Ok(());
    }

    let ensemble = &artifact.ensemble;
    let mut usage = vec![0usize; FEATURE_NAMES.len()];
    for split in ensemble.rounds.iter().flatten().filter(|s| !s.is_degenerate()) {
        if let Some(count) = usage.get_mut(split.feature_idx) {
            *count += 1;
        }
    }

    let summary = serde_json::json!({
        "path": config.model_path.display().to_string(),
        "version": artifact.version,
        "training_samples": artifact.training_samples,
        "accuracy_percent": artifact.accuracy_percent(2),
        "model_hash": artifact.hash_hex()?,
        "n_estimators": ensemble.n_estimators,
        "learning_rate": ensemble.learning_rate,
        "n_classes": ensemble.n_classes,
        "splits": ensemble.num_splits(),
        "feature_usage": FEATURE_NAMES
            .iter()
            .zip(&usage)
            .map(|(name, count)| (name.to_string(), *count))
            .collect::<std::collections::BTreeMap<_, _>>(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
