use std::process::exit;

use anyhow::{bail, Result};
use dotenv::dotenv;
use linea_bridge_etl::{
    configs::validate_config::ValidateConfig,
    files::read_records,
    models::{
        Dataset, DecodedLogRecord, NormalizedTransactionRecord, RawLogRecord,
        RawTransactionRecord,
    },
    validate::{
        logs::{validate_logs, EXPECTED_LOG_BLOCKS},
        transactions::{validate_transactions, EXPECTED_TRANSACTION_BLOCKS},
        ValidationReport,
    },
};
use log::*;
use simple_logger::SimpleLogger;

fn main() {
    dotenv().ok();

    let config = ValidateConfig::new();

    let log = SimpleLogger::new().with_level(LevelFilter::Info);

    match &config {
        Ok(config) if config.debug => log.with_level(LevelFilter::Debug).init().unwrap(),
        _ => log.init().unwrap(),
    }

    match config.and_then(run) {
        Ok(true) => {}
        Ok(false) => exit(1),
        Err(err) => {
            error!("{:#}", err);
            exit(1);
        }
    }
}

fn run(config: ValidateConfig) -> Result<bool> {
    let mut reports = Vec::new();

    for dataset in &config.datasets {
        let report = match dataset {
            Dataset::Logs => {
                let raw: Vec<RawLogRecord> = read_existing(&config.raw_logs)?;
                let decoded: Vec<DecodedLogRecord> = read_existing(&config.decoded_logs)?;

                validate_logs(&raw, &decoded, &EXPECTED_LOG_BLOCKS)
            }
            Dataset::Transactions => {
                let raw: Vec<RawTransactionRecord> = read_existing(&config.raw_transactions)?;
                let normalized: Vec<NormalizedTransactionRecord> =
                    read_existing(&config.normalized_transactions)?;

                validate_transactions(&raw, &normalized, &EXPECTED_TRANSACTION_BLOCKS)
            }
        };

        report.log_summary();
        reports.push(report);
    }

    for report in &reports {
        info!("{}", report);
    }

    Ok(reports.iter().all(ValidationReport::is_success))
}

fn read_existing<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<Vec<T>> {
    if !path.is_file() {
        bail!("File not found: {}", path.display());
    }

    read_records(path)
}
