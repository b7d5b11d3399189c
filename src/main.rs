//! KYC Fraud Pipeline - Main Entry Point
//!
//! Runs the batch pipeline (generate, process, verify, train, predict) or
//! scores an existing processed file with a saved model.

use anyhow::Result;
use clap::{Parser, Subcommand};
use kyc_fraud_pipeline::{config::AppConfig, pipeline, storage, Pipeline};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kyc_fraud_pipeline", version, about = "Batch KYC fraud screening")]
struct Cli {
    /// Configuration file [default: config/config.toml, built-in values when absent]
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline
    Run {
        /// Number of synthetic records to generate
        #[arg(long)]
        records: Option<usize>,
        /// Record file to process instead of generating records
        #[arg(long)]
        input: Option<PathBuf>,
        /// Identity document image
        #[arg(long)]
        document: Option<PathBuf>,
        /// Selfie image
        #[arg(long)]
        selfie: Option<PathBuf>,
        /// Verification result (JSON) to merge instead of running verification
        #[arg(long)]
        verification: Option<PathBuf>,
    },
    /// Score a processed record file with a saved model
    Predict {
        /// Processed record file
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Model artifact
        #[arg(long)]
        model: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, source) = AppConfig::resolve(cli.config.as_deref())?;

    init_logging(&config.logging.level, &config.logging.format)?;

    info!("Starting KYC Fraud Pipeline");
    match source {
        Some(path) => info!(path = %path.display(), "Configuration loaded successfully"),
        None => warn!("No configuration file found, using built-in defaults"),
    }

    match cli.command {
        Command::Run {
            records,
            input,
            document,
            selfie,
            verification,
        } => {
            if let Some(records) = records {
                config.generator.records = records;
            }
            if input.is_some() {
                config.paths.input_file = input;
            }
            if document.is_some() {
                config.verification.document_path = document;
            }
            if selfie.is_some() {
                config.verification.selfie_path = selfie;
            }
            info!(
                records = config.generator.records,
                trees = config.model.n_estimators,
                amount_threshold = config.rules.amount_threshold,
                count_threshold = config.rules.count_threshold,
                "Pipeline configured"
            );

            let mut pipeline = Pipeline::new(config)?;
            if let Some(path) = verification {
                pipeline = pipeline.with_verification_result(storage::read_verification(&path)?);
            }
            pipeline.run()?;
        }
        Command::Predict {
            input,
            output,
            model,
        } => {
            let input = input.unwrap_or_else(|| config.paths.processed_path());
            let output = output.unwrap_or_else(|| config.paths.final_path());
            let model = model.unwrap_or_else(|| config.paths.model_path());
            pipeline::predict_file(&config, &input, &output, &model)?;
        }
    }

    Ok(())
}

fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("kyc_fraud_pipeline={level}")))?;

    if format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}
