pub mod extract_logs_config;
pub mod extract_transactions_config;
pub mod load_config;
pub mod transform_config;
pub mod validate_config;

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;

use crate::{
    chains::{get_chain, Chain, EXPLORER_API_URL, LINEA},
    files::source_file_name,
    models::Dataset,
};

pub const DEFAULT_START_DATE: &str = "2025-01-27";
pub const DEFAULT_END_DATE: &str = "2026-01-27";

pub const RAW_DATA_DIR: &str = "data/raw";
pub const TRANSFORMED_DATA_DIR: &str = "data/transformed";

pub const RAW_LOGS_FILE: &str = "data/raw/etherscan_logs.csv";
pub const RAW_TRANSACTIONS_FILE: &str = "data/raw/linea_transactions.csv";

pub fn resolve_chain(name: &str) -> Result<Chain> {
    get_chain(name).ok_or_else(|| anyhow!("Chain {} is not supported", name))
}

/// Explorer endpoint, overridable with `EXPLORER_API_URL`.
pub fn explorer_url() -> String {
    env::var("EXPLORER_API_URL").unwrap_or_else(|_| EXPLORER_API_URL.to_string())
}

/// Linea requests use `LINEASCAN_API_KEY` when present, every chain falls
/// back to `ETHERSCAN_API_KEY` since the v2 endpoint accepts it for both.
pub fn resolve_api_key(
    chain: &Chain,
    etherscan: Option<String>,
    lineascan: Option<String>,
) -> Result<String> {
    let etherscan = etherscan.filter(|key| !key.trim().is_empty());
    let lineascan = lineascan.filter(|key| !key.trim().is_empty());

    let key = if *chain == LINEA {
        lineascan.or(etherscan)
    } else {
        etherscan
    };

    match key {
        Some(key) => Ok(key),
        None if *chain == LINEA => bail!("LINEASCAN_API_KEY or ETHERSCAN_API_KEY must be set"),
        None => bail!("ETHERSCAN_API_KEY must be set"),
    }
}

pub fn api_key(chain: &Chain) -> Result<String> {
    resolve_api_key(
        chain,
        env::var("ETHERSCAN_API_KEY").ok(),
        env::var("LINEASCAN_API_KEY").ok(),
    )
}

pub fn database_url() -> Result<String> {
    env::var("DATABASE_URL").map_err(|_| anyhow!("DATABASE_URL must be set"))
}

pub fn check_dates(start_date: NaiveDate, end_date: NaiveDate) -> Result<()> {
    if start_date > end_date {
        bail!("Start date {} is after end date {}", start_date, end_date);
    }

    Ok(())
}

/// Location of a transformed file as the loader expects it to be named.
pub fn transformed_file(
    dir: &Path,
    dataset: Dataset,
    chain: &Chain,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> PathBuf {
    dir.join(source_file_name(
        dataset,
        chain,
        &start_date.to_string(),
        &end_date.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::ETHEREUM;

    #[test]
    fn linea_key_falls_back_to_etherscan() {
        let etherscan = Some("ether".to_string());
        let lineascan = Some("linea".to_string());

        assert_eq!(
            resolve_api_key(&LINEA, etherscan.clone(), lineascan.clone()).unwrap(),
            "linea"
        );
        assert_eq!(
            resolve_api_key(&LINEA, etherscan.clone(), Some(" ".to_string())).unwrap(),
            "ether"
        );
        assert_eq!(
            resolve_api_key(&ETHEREUM, etherscan, lineascan.clone()).unwrap(),
            "ether"
        );
        assert!(resolve_api_key(&ETHEREUM, None, lineascan).is_err());
        assert!(resolve_api_key(&LINEA, None, None).is_err());
    }

    #[test]
    fn rejects_reversed_dates() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 27).unwrap();

        assert!(check_dates(end, start).is_ok());
        assert!(check_dates(start, start).is_ok());
        assert!(check_dates(start, end).is_err());
    }

    #[test]
    fn names_transformed_files_for_the_loader() {
        let path = transformed_file(
            Path::new(TRANSFORMED_DATA_DIR),
            Dataset::Logs,
            &ETHEREUM,
            NaiveDate::from_ymd_opt(2025, 1, 27).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 27).unwrap(),
        );

        assert_eq!(
            path,
            PathBuf::from("data/transformed/logs_ethereum_2025-01-27_to_2026-01-27.csv")
        );
    }
}
