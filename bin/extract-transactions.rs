use std::process::exit;

use anyhow::{bail, Result};
use dotenv::dotenv;
use linea_bridge_etl::{
    configs::extract_transactions_config::ExtractTransactionsConfig,
    extract::{
        client::{Closest, ExplorerClient, DEFAULT_TIMEOUT},
        parallel::ParallelAddressFetcher,
        wallets::load_unique_wallets,
    },
};
use log::*;
use simple_logger::SimpleLogger;

#[tokio::main()]
async fn main() {
    dotenv().ok();

    let config = ExtractTransactionsConfig::new();

    let log = SimpleLogger::new().with_level(LevelFilter::Info);

    match &config {
        Ok(config) if config.debug => log.with_level(LevelFilter::Debug).init().unwrap(),
        _ => log.init().unwrap(),
    }

    let result = match config {
        Ok(config) => run(config).await,
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        error!("{:#}", err);
        exit(1);
    }
}

async fn run(config: ExtractTransactionsConfig) -> Result<()> {
    info!("Starting wallet transaction extraction on {}.", config.chain);

    if !config.logs.is_file() {
        bail!("Logs file not found: {}", config.logs.display());
    }

    let mut wallets = load_unique_wallets(&config.logs, config.start_date)?;

    info!("Found {} unique wallets to process", wallets.len());

    if let Some(limit) = config.limit {
        wallets.truncate(limit);
        info!("Limited to the first {} wallets", wallets.len());
    }

    let client = ExplorerClient::new(&config.api_url, &config.api_key, DEFAULT_TIMEOUT)?;

    let start_block = client
        .block_by_date(&config.chain, config.start_date, Closest::Before)
        .await?;
    let end_block = client
        .block_by_date(&config.chain, config.end_date, Closest::Before)
        .await?;

    info!("Blocks: {} -> {}", start_block, end_block);

    let extraction = ParallelAddressFetcher::new(&client, config.chain, start_block, end_block)
        .with_concurrency(config.workers)
        .with_checkpoint(config.output.clone(), config.checkpoint_every)
        .run(&wallets)
        .await?;

    if extraction.incomplete_wallets > 0 {
        warn!(
            "{} wallets returned partial histories",
            extraction.incomplete_wallets
        );
    }

    info!(
        "Saved {} transactions of {} wallets to {}",
        extraction.transactions.len(),
        extraction.wallets_with_transactions,
        config.output.display()
    );

    Ok(())
}
