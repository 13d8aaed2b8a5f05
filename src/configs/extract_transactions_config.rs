use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;

use crate::{
    chains::{Chain, ETHEREUM},
    extract::parallel::{DEFAULT_CHECKPOINT_EVERY, DEFAULT_CONCURRENCY},
    models::Dataset,
};

use super::{
    api_key, check_dates, explorer_url, resolve_chain, transformed_file, RAW_TRANSACTIONS_FILE,
    TRANSFORMED_DATA_DIR,
};

#[derive(Parser, Debug)]
#[command(
    name = "Extract transactions",
    about = "Fetches the transaction history of every bridging wallet."
)]
pub struct ExtractTransactionsArgs {
    #[arg(short, long, help = "Start log with debug.", default_value_t = false)]
    pub debug: bool,

    #[arg(short, long, help = "Chain to read the transactions from.", default_value_t = String::from("linea"))]
    pub chain: String,

    #[arg(
        short,
        long,
        help = "Logs file listing the wallets, defaults to the decoded logs of the same period."
    )]
    pub logs: Option<PathBuf>,

    #[arg(short, long, help = "First day to extract (YYYY-MM-DD).", default_value = super::DEFAULT_START_DATE)]
    pub start_date: NaiveDate,

    #[arg(short, long, help = "Last day to extract (YYYY-MM-DD).", default_value = super::DEFAULT_END_DATE)]
    pub end_date: NaiveDate,

    #[arg(
        short,
        long,
        help = "Wallets fetched at the same time.",
        default_value_t = DEFAULT_CONCURRENCY
    )]
    pub workers: usize,

    #[arg(
        short = 'p',
        long,
        help = "Wallets between two checkpoint snapshots.",
        default_value_t = DEFAULT_CHECKPOINT_EVERY
    )]
    pub checkpoint_every: usize,

    #[arg(long, help = "Only fetch the first N wallets.")]
    pub limit: Option<usize>,

    #[arg(short, long, help = "Raw transactions output file.", default_value = RAW_TRANSACTIONS_FILE)]
    pub output: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ExtractTransactionsConfig {
    pub debug: bool,
    pub chain: Chain,
    pub api_url: String,
    pub api_key: String,
    pub logs: PathBuf,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub workers: usize,
    pub checkpoint_every: usize,
    pub limit: Option<usize>,
    pub output: PathBuf,
}

impl ExtractTransactionsConfig {
    pub fn new() -> Result<Self> {
        Self::from_args(ExtractTransactionsArgs::parse())
    }

    pub fn from_args(args: ExtractTransactionsArgs) -> Result<Self> {
        let chain = resolve_chain(&args.chain)?;

        check_dates(args.start_date, args.end_date)?;

        let logs = args.logs.unwrap_or_else(|| {
            transformed_file(
                Path::new(TRANSFORMED_DATA_DIR),
                Dataset::Logs,
                &ETHEREUM,
                args.start_date,
                args.end_date,
            )
        });

        Ok(Self {
            debug: args.debug,
            chain,
            api_url: explorer_url(),
            api_key: api_key(&chain)?,
            logs,
            start_date: args.start_date,
            end_date: args.end_date,
            workers: args.workers,
            checkpoint_every: args.checkpoint_every,
            limit: args.limit,
            output: args.output,
        })
    }
}
