use std::{collections::HashSet, path::Path};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use log::info;

use crate::transform::hex::{integer_to_u64, parse_integer};

const WALLET_COLUMNS: [&str; 3] = ["_from", "from_address", "from"];

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::default()).and_utc())
}

/// Distinct senders of bridge messages on or after `start_date`, in first
/// seen order. Accepts decoded logs (`datetime`, `from_address`) as well as
/// exports carrying a unix `timeStamp`.
pub fn load_unique_wallets(path: &Path, start_date: NaiveDate) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Unable to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|header| header == name);

    let wallet_column = match WALLET_COLUMNS.iter().find_map(|&name| position(name)) {
        Some(column) => column,
        None => bail!(
            "Could not find a wallet column in {}, available columns: {:?}",
            path.display(),
            headers.iter().collect::<Vec<_>>()
        ),
    };

    let timestamp_column = position("timeStamp");
    let datetime_column = position("datetime");

    let since = start_date.and_time(NaiveTime::default()).and_utc();

    let mut seen = HashSet::new();
    let mut wallets = Vec::new();
    let mut in_range = 0;

    for record in reader.records() {
        let record = record.with_context(|| format!("Malformed row in {}", path.display()))?;

        let datetime = if let Some(column) = timestamp_column {
            let seconds = integer_to_u64(&parse_integer(record.get(column)));
            i64::try_from(seconds)
                .ok()
                .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
        } else if let Some(column) = datetime_column {
            record.get(column).and_then(parse_datetime)
        } else {
            Some(since)
        };

        match datetime {
            Some(datetime) if datetime >= since => in_range += 1,
            _ => continue,
        }

        let wallet = match record.get(wallet_column).map(str::trim) {
            Some(wallet) if !wallet.is_empty() => wallet,
            _ => continue,
        };

        if seen.insert(wallet.to_string()) {
            wallets.push(wallet.to_string());
        }
    }

    info!(
        "{} rows from {} onwards, {} unique wallets",
        in_range,
        start_date,
        wallets.len()
    );

    Ok(wallets)
}
