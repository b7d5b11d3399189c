//! Synthetic Record Generator
//!
//! Writes synthetic KYC records to a CSV file for pipeline testing.
//!
//! Usage: generate_records [output] [count] [blacklist_rate] [seed]

use anyhow::Result;
use kyc_fraud_pipeline::config::GeneratorConfig;
use kyc_fraud_pipeline::generator::RecordGenerator;
use kyc_fraud_pipeline::storage;
use kyc_fraud_pipeline::Blacklists;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_records=info".parse()?)
                .add_directive("kyc_fraud_pipeline=info".parse()?),
        )
        .init();

    info!("Starting synthetic record generator");

    let args: Vec<String> = std::env::args().collect();
    let output = args.get(1).map(|s| s.as_str()).unwrap_or("data/raw_kyc_data.csv");
    let count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(500);
    let blacklist_rate: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0.02);
    let seed: Option<u64> = args.get(4).and_then(|s| s.parse().ok());

    info!(
        output = %output,
        count = count,
        blacklist_rate = blacklist_rate,
        seed = ?seed,
        "Configuration loaded"
    );

    let config = GeneratorConfig {
        records: count,
        blacklist_rate,
        seed,
    };
    let records = RecordGenerator::new(Arc::new(Blacklists::default()), &config).generate(count);
    storage::write_raw(output, &records)?;

    info!("Completed! Wrote {} records to {}", records.len(), output);
    Ok(())
}
