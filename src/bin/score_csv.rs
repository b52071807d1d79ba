//! Offline batch scoring of a CSV export.
//!
//! # Usage
//! ```sh
//! cargo run --bin score_csv -- --input creditcard.csv --output scored.csv
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use fraud_scorer::application::csv_scoring::score_csv;
use fraud_scorer::application::ml::ScoringEngine;
use fraud_scorer::config::{LogFormat, ModelEnvConfig};
use fraud_scorer::infrastructure::observability::init_tracing;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV with Time, V1..V28 and Amount columns
    #[arg(long)]
    input: PathBuf,

    /// Output CSV (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    /// ONNX scoring model (defaults to MODEL_PATH)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Scaler artifact (defaults to SCALER_PATH)
    #[arg(long)]
    scaler: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(LogFormat::Pretty);
    let args = Args::parse();
    let defaults = ModelEnvConfig::from_env();

    let model_path = args.model.unwrap_or(defaults.model_path);
    let scaler_path = args.scaler.unwrap_or(defaults.scaler_path);

    let mut engine = ScoringEngine::new();
    engine.load(&model_path).context("Failed to load scoring model")?;
    if scaler_path.exists() {
        engine.load_scaler(&scaler_path).context("Failed to load scaler")?;
    } else {
        warn!("Scaler not found at {:?}; scoring unscaled", scaler_path);
    }

    let input = File::open(&args.input).context(format!("Failed to open {:?}", args.input))?;
    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).context(format!("Failed to create {:?}", path))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    let summary = score_csv(&engine, BufReader::new(input), output)?;
    info!(
        "Scored {} rows: {} flagged as fraud, {} skipped",
        summary.scored, summary.fraud_count, summary.skipped
    );
    Ok(())
}
