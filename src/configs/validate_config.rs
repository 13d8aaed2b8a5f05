use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;

use crate::{
    chains::{ETHEREUM, LINEA},
    models::Dataset,
};

use super::{check_dates, transformed_file, RAW_LOGS_FILE, RAW_TRANSACTIONS_FILE, TRANSFORMED_DATA_DIR};

#[derive(Parser, Debug)]
#[command(
    name = "Validate",
    about = "Reconciles transformed files against their raw extraction."
)]
pub struct ValidateArgs {
    #[arg(short, long, help = "Start log with debug.", default_value_t = false)]
    pub debug: bool,

    #[arg(long, help = "Only validate one dataset (logs or transactions).")]
    pub dataset: Option<Dataset>,

    #[arg(short, long, help = "First extracted day (YYYY-MM-DD).", default_value = super::DEFAULT_START_DATE)]
    pub start_date: NaiveDate,

    #[arg(short, long, help = "Last extracted day (YYYY-MM-DD).", default_value = super::DEFAULT_END_DATE)]
    pub end_date: NaiveDate,

    #[arg(long, help = "Raw logs file.", default_value = RAW_LOGS_FILE)]
    pub raw_logs: PathBuf,

    #[arg(long, help = "Raw transactions file.", default_value = RAW_TRANSACTIONS_FILE)]
    pub raw_transactions: PathBuf,

    #[arg(short, long, help = "Directory of the transformed files.", default_value = TRANSFORMED_DATA_DIR)]
    pub input_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ValidateConfig {
    pub debug: bool,
    pub datasets: Vec<Dataset>,
    pub raw_logs: PathBuf,
    pub raw_transactions: PathBuf,
    pub decoded_logs: PathBuf,
    pub normalized_transactions: PathBuf,
}

impl ValidateConfig {
    pub fn new() -> Result<Self> {
        Self::from_args(ValidateArgs::parse())
    }

    pub fn from_args(args: ValidateArgs) -> Result<Self> {
        check_dates(args.start_date, args.end_date)?;

        let datasets = match args.dataset {
            Some(dataset) => vec![dataset],
            None => vec![Dataset::Logs, Dataset::Transactions],
        };

        Ok(Self {
            debug: args.debug,
            datasets,
            decoded_logs: transformed_file(
                &args.input_dir,
                Dataset::Logs,
                &ETHEREUM,
                args.start_date,
                args.end_date,
            ),
            normalized_transactions: transformed_file(
                &args.input_dir,
                Dataset::Transactions,
                &LINEA,
                args.start_date,
                args.end_date,
            ),
            raw_logs: args.raw_logs,
            raw_transactions: args.raw_transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_raw_and_transformed_files() {
        let args = ValidateArgs::try_parse_from([
            "validate",
            "--dataset",
            "logs",
            "--start-date",
            "2025-06-01",
            "--raw-logs",
            "logs.csv",
        ])
        .unwrap();

        let config = ValidateConfig::from_args(args).unwrap();

        assert_eq!(config.datasets, vec![Dataset::Logs]);
        assert_eq!(config.raw_logs, PathBuf::from("logs.csv"));
        assert_eq!(
            config.decoded_logs,
            PathBuf::from("data/transformed/logs_ethereum_2025-06-01_to_2026-01-27.csv")
        );
    }
}
