use std::process::exit;

use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use linea_bridge_etl::{
    configs::transform_config::TransformConfig,
    files::{read_records, write_records},
    models::{Dataset, RawLogRecord, RawTransactionRecord},
    transform::{logs::decode_logs, transactions::normalize_transactions},
};
use log::*;
use simple_logger::SimpleLogger;

fn main() {
    dotenv().ok();

    let config = TransformConfig::new();

    let log = SimpleLogger::new().with_level(LevelFilter::Info);

    match &config {
        Ok(config) if config.debug => log.with_level(LevelFilter::Debug).init().unwrap(),
        _ => log.init().unwrap(),
    }

    if let Err(err) = config.and_then(run) {
        error!("{:#}", err);
        exit(1);
    }
}

fn run(config: TransformConfig) -> Result<()> {
    for dataset in &config.datasets {
        match dataset {
            Dataset::Logs => transform_logs(&config)?,
            Dataset::Transactions => transform_transactions(&config)?,
        }
    }

    Ok(())
}

fn transform_logs(config: &TransformConfig) -> Result<()> {
    if !config.raw_logs.is_file() {
        bail!("Raw logs not found: {}", config.raw_logs.display());
    }

    let raw: Vec<RawLogRecord> = read_records(&config.raw_logs)?;

    info!("Loaded {} raw logs", raw.len());

    let decoded = decode_logs(&raw);

    write_records(&config.decoded_logs, &decoded)
        .with_context(|| format!("Unable to save {}", config.decoded_logs.display()))?;

    info!(
        "Saved {} decoded logs to {}",
        decoded.len(),
        config.decoded_logs.display()
    );

    Ok(())
}

fn transform_transactions(config: &TransformConfig) -> Result<()> {
    if !config.raw_transactions.is_file() {
        bail!(
            "Raw transactions not found: {}",
            config.raw_transactions.display()
        );
    }

    let raw: Vec<RawTransactionRecord> = read_records(&config.raw_transactions)?;

    info!("Loaded {} raw transactions", raw.len());

    let normalized = normalize_transactions(&raw);

    write_records(&config.normalized_transactions, &normalized.records).with_context(|| {
        format!(
            "Unable to save {}",
            config.normalized_transactions.display()
        )
    })?;

    info!(
        "Saved {} transactions to {} ({} duplicates removed)",
        normalized.records.len(),
        config.normalized_transactions.display(),
        normalized.duplicates_removed
    );

    Ok(())
}
