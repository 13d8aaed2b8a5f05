use std::process::exit;

use anyhow::{bail, Result};
use dotenv::dotenv;
use linea_bridge_etl::{
    configs::load_config::LoadConfig,
    db::PgWarehouse,
    loader::{discover_source_files, BulkLoader},
};
use log::*;
use simple_logger::SimpleLogger;

fn main() {
    dotenv().ok();

    let config = LoadConfig::new();

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

fn run(config: LoadConfig) -> Result<bool> {
    let discovery = discover_source_files(&config.input_dir)?;

    if discovery.files.is_empty() {
        bail!("No loadable files in {}", config.input_dir.display());
    }

    info!(
        "Found {} files in {} ({})",
        discovery.files.len(),
        config.input_dir.display(),
        if config.append { "append" } else { "full refresh" }
    );

    let warehouse = PgWarehouse::connect(&config.db_url)?;

    let mut loader = BulkLoader::new(warehouse).with_append(config.append);

    let mut summary = loader.load(&discovery.files);
    summary.malformed = discovery.malformed;

    summary.log_summary();

    Ok(summary.is_success())
}
