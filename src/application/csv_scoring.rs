//! Offline scoring of CSV exports (`Time, V1..V28, Amount[, Class]`).

use crate::application::ml::ScoringEngine;
use crate::domain::ml::feature_registry::FEATURE_NAMES;
use crate::domain::ml::{FeatureInput, FeatureVector, RawFeature};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{Read, Write};
use tracing::warn;

#[derive(Debug, Serialize)]
struct ScoredRow {
    row: usize,
    fraud: bool,
    confidence: f64,
    message: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvSummary {
    pub scored: usize,
    pub fraud_count: usize,
    pub skipped: usize,
}

/// Map each CSV column to its canonical feature key; unknown columns map to `None`.
fn column_keys(headers: &csv::StringRecord) -> Vec<Option<&'static str>> {
    headers
        .iter()
        .map(|h| {
            let h = h.trim().to_lowercase();
            FEATURE_NAMES.iter().copied().find(|name| *name == h)
        })
        .collect()
}

/// Score every row of `input` and write `row,fraud,confidence,message` to `output`.
///
/// Rows that fail to parse or score are logged and skipped. Empty cells count as missing.
pub fn score_csv<R: Read, W: Write>(
    engine: &ScoringEngine,
    input: R,
    output: W,
) -> Result<CsvSummary> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let keys = column_keys(reader.headers().context("Failed to read CSV header")?);
    if keys.iter().all(Option::is_none) {
        anyhow::bail!("CSV header has no recognised feature columns");
    }

    let mut writer = csv::Writer::from_writer(output);
    let mut summary = CsvSummary::default();

    for (index, record) in reader.records().enumerate() {
        let row = index + 1;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("Row {}: unreadable ({}), skipped", row, e);
                summary.skipped += 1;
                continue;
            }
        };

        let input: FeatureInput = keys
            .iter()
            .zip(record.iter())
            .filter_map(|(key, value)| key.map(|k| (k, value)))
            .filter(|(_, value)| !value.is_empty())
            .map(|(k, value)| (k.to_string(), RawFeature::from(value)))
            .collect();

        let scored = FeatureVector::from_input(&input).and_then(|v| engine.score(&v));
        match scored {
            Ok(score) => {
                writer.serialize(ScoredRow {
                    row,
                    fraud: score.is_fraud,
                    confidence: score.confidence,
                    message: score.tier().message(),
                })?;
                summary.scored += 1;
                if score.is_fraud {
                    summary.fraud_count += 1;
                }
            }
            Err(e) => {
                warn!("Row {}: {}, skipped", row, e);
                summary.skipped += 1;
            }
        }
    }

    writer.flush().context("Failed to flush scored CSV")?;
    Ok(summary)
}
