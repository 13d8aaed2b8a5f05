use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;

use crate::{
    chains::{Chain, LINEA_BRIDGE_CONTRACT, MESSAGE_SENT_TOPIC},
    extract::logs::DEFAULT_CHUNK_SIZE,
};

use super::{api_key, check_dates, explorer_url, resolve_chain, RAW_LOGS_FILE};

#[derive(Parser, Debug)]
#[command(
    name = "Extract logs",
    about = "Fetches bridge MessageSent logs from the explorer between two dates."
)]
pub struct ExtractLogsArgs {
    #[arg(short, long, help = "Start log with debug.", default_value_t = false)]
    pub debug: bool,

    #[arg(short, long, help = "Chain to read the logs from.", default_value_t = String::from("ethereum"))]
    pub chain: String,

    #[arg(long, help = "Contract emitting the logs.", default_value_t = String::from(LINEA_BRIDGE_CONTRACT))]
    pub address: String,

    #[arg(long, help = "Event signature topic.", default_value_t = String::from(MESSAGE_SENT_TOPIC))]
    pub topic: String,

    #[arg(short, long, help = "First day to extract (YYYY-MM-DD).", default_value = super::DEFAULT_START_DATE)]
    pub start_date: NaiveDate,

    #[arg(short, long, help = "Last day to extract (YYYY-MM-DD).", default_value = super::DEFAULT_END_DATE)]
    pub end_date: NaiveDate,

    #[arg(
        short = 'k',
        long,
        help = "Blocks per explorer query.",
        default_value_t = DEFAULT_CHUNK_SIZE
    )]
    pub chunk_size: u64,

    #[arg(short, long, help = "Raw logs output file.", default_value = RAW_LOGS_FILE)]
    pub output: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ExtractLogsConfig {
    pub debug: bool,
    pub chain: Chain,
    pub api_url: String,
    pub api_key: String,
    pub address: String,
    pub topic0: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub chunk_size: u64,
    pub output: PathBuf,
}

impl ExtractLogsConfig {
    pub fn new() -> Result<Self> {
        Self::from_args(ExtractLogsArgs::parse())
    }

    pub fn from_args(args: ExtractLogsArgs) -> Result<Self> {
        let chain = resolve_chain(&args.chain)?;

        check_dates(args.start_date, args.end_date)?;

        Ok(Self {
            debug: args.debug,
            chain,
            api_url: explorer_url(),
            api_key: api_key(&chain)?,
            address: args.address,
            topic0: args.topic,
            start_date: args.start_date,
            end_date: args.end_date,
            chunk_size: args.chunk_size,
            output: args.output,
        })
    }
}
