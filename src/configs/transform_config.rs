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
    name = "Transform",
    about = "Decodes raw logs and normalizes raw transactions."
)]
pub struct TransformArgs {
    #[arg(short, long, help = "Start log with debug.", default_value_t = false)]
    pub debug: bool,

    #[arg(long, help = "Only transform one dataset (logs or transactions).")]
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
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TransformConfig {
    pub debug: bool,
    pub datasets: Vec<Dataset>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub raw_logs: PathBuf,
    pub raw_transactions: PathBuf,
    pub decoded_logs: PathBuf,
    pub normalized_transactions: PathBuf,
}

impl TransformConfig {
    pub fn new() -> Result<Self> {
        Self::from_args(TransformArgs::parse())
    }

    pub fn from_args(args: TransformArgs) -> Result<Self> {
        check_dates(args.start_date, args.end_date)?;

        let datasets = match args.dataset {
            Some(dataset) => vec![dataset],
            None => vec![Dataset::Logs, Dataset::Transactions],
        };

        Ok(Self {
            debug: args.debug,
            datasets,
            start_date: args.start_date,
            end_date: args.end_date,
            decoded_logs: transformed_file(
                &args.output_dir,
                Dataset::Logs,
                &ETHEREUM,
                args.start_date,
                args.end_date,
            ),
            normalized_transactions: transformed_file(
                &args.output_dir,
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
    fn transforms_both_datasets_by_default() {
        let config =
            TransformConfig::from_args(TransformArgs::try_parse_from(["transform"]).unwrap())
                .unwrap();

        assert_eq!(config.datasets, vec![Dataset::Logs, Dataset::Transactions]);
        assert_eq!(
            config.decoded_logs,
            PathBuf::from("data/transformed/logs_ethereum_2025-01-27_to_2026-01-27.csv")
        );
        assert_eq!(
            config.normalized_transactions,
            PathBuf::from("data/transformed/transactions_linea_2025-01-27_to_2026-01-27.csv")
        );
    }

    #[test]
    fn restricts_to_one_dataset() {
        let args = TransformArgs::try_parse_from(["transform", "--dataset", "txs", "-o", "out"]).unwrap();
        let config = TransformConfig::from_args(args).unwrap();

        assert_eq!(config.datasets, vec![Dataset::Transactions]);
        assert!(config.normalized_transactions.starts_with("out"));
    }
}
