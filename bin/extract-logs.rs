use std::process::exit;

use anyhow::{Context, Result};
use dotenv::dotenv;
use linea_bridge_etl::{
    configs::extract_logs_config::ExtractLogsConfig,
    extract::{
        client::{Closest, ExplorerClient, DEFAULT_TIMEOUT},
        logs::fetch_all_logs,
    },
    files::write_records,
};
use log::*;
use simple_logger::SimpleLogger;

#[tokio::main()]
async fn main() {
    dotenv().ok();

    let config = ExtractLogsConfig::new();

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

async fn run(config: ExtractLogsConfig) -> Result<()> {
    info!("Starting log extraction on {}.", config.chain);

    let client = ExplorerClient::new(&config.api_url, &config.api_key, DEFAULT_TIMEOUT)?;

    info!(
        "Looking up blocks for {} -> {}",
        config.start_date, config.end_date
    );

    let start_block = client
        .block_by_date(&config.chain, config.start_date, Closest::Before)
        .await?;
    let end_block = client
        .block_by_date(&config.chain, config.end_date, Closest::Before)
        .await?;

    info!("Blocks: {} -> {}", start_block, end_block);

    let extraction = fetch_all_logs(
        &client,
        &config.chain,
        &config.address,
        &config.topic0,
        start_block,
        end_block,
        config.chunk_size,
    )
    .await?;

    for (chunk_start, status) in &extraction.incomplete {
        warn!(
            "Chunk starting at block {} is incomplete: {:?}",
            chunk_start, status
        );
    }

    if extraction.logs.is_empty() {
        warn!("No logs found, nothing written");
        return Ok(());
    }

    write_records(&config.output, &extraction.logs)
        .with_context(|| format!("Unable to save logs to {}", config.output.display()))?;

    info!(
        "Saved {} logs to {}",
        extraction.logs.len(),
        config.output.display()
    );

    Ok(())
}
