//! Batch late-delivery prediction for an orders CSV
//!
//! Adds Predicted_Late and Predicted_Status columns and logs the KPIs.
//!
//! Run: ./target/release/predict_orders orders.csv --output predicted.csv

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use supply_chain_dashboard::predict::predict_batch;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "predict_orders")]
#[command(about = "Classify every order of a CSV file as late or on time")]
struct Args {
    /// Orders CSV (UTF-8 or Latin-1)
    input: PathBuf,

    /// Where to write the annotated CSV (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let batch = predict_batch(&bytes)
        .with_context(|| format!("failed to classify {}", args.input.display()))?;

    match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            batch.write_csv(file)?;
            info!("Wrote {} orders to {}", batch.orders.len(), path.display());
        }
        None => batch.write_csv(std::io::stdout().lock())?,
    }

    info!("{}", batch.summary_line());
    Ok(())
}
