use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::info;

use crate::models::{NormalizedTransactionRecord, RawTransactionRecord};

use super::{
    hex::{integer_to_u64, parse_flag, parse_integer},
    units::{wei_to_eth, wei_to_gwei},
};

#[derive(Debug, Clone, Default)]
pub struct NormalizedTransactions {
    pub records: Vec<NormalizedTransactionRecord>,
    pub duplicates_removed: usize,
}

/// Keeps the first occurrence of every hash. Rows without a hash count as one
/// key.
pub fn dedup_by_hash(raw: &[RawTransactionRecord]) -> (Vec<&RawTransactionRecord>, usize) {
    let mut seen = HashSet::new();

    let unique: Vec<&RawTransactionRecord> = raw
        .iter()
        .filter(|transaction| seen.insert(transaction.hash.as_deref()))
        .collect();

    let removed = raw.len() - unique.len();

    (unique, removed)
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();

    let seconds = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(digits) => i64::from_str_radix(digits, 16).ok()?,
        None => value.parse::<i64>().ok()?,
    };

    DateTime::from_timestamp(seconds, 0)
}

pub fn normalize_transaction(raw: &RawTransactionRecord) -> NormalizedTransactionRecord {
    let integer = |value: &Option<String>| integer_to_u64(&parse_integer(value.as_deref()));

    NormalizedTransactionRecord {
        datetime: parse_timestamp(raw.time_stamp.as_deref()),
        block_number: integer(&raw.block_number),
        hash: raw.hash.clone(),
        from_address: raw.from.clone(),
        to_address: raw.to.clone(),
        value_eth: wei_to_eth(&parse_integer(raw.value.as_deref())),
        gas_price_gwei: wei_to_gwei(&parse_integer(raw.gas_price.as_deref())),
        gas_used: integer(&raw.gas_used),
        nonce: integer(&raw.nonce),
        is_error: Some(parse_flag(raw.is_error.as_deref())),
        tx_status: Some(parse_flag(raw.txreceipt_status.as_deref())),
        method_id: raw.method_id.clone(),
        function_name: raw.function_name.clone(),
        wallet: raw.wallet.clone(),
    }
}

pub fn normalize_transactions(raw: &[RawTransactionRecord]) -> NormalizedTransactions {
    info!("Normalizing {} transactions", raw.len());

    let (unique, duplicates_removed) = dedup_by_hash(raw);

    if duplicates_removed > 0 {
        info!("Removed {} duplicate transaction hashes", duplicates_removed);
    }

    NormalizedTransactions {
        records: unique.into_iter().map(normalize_transaction).collect(),
        duplicates_removed,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;

    fn transaction(hash: &str, value: &str) -> RawTransactionRecord {
        RawTransactionRecord {
            hash: Some(hash.to_string()),
            value: Some(value.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn removes_duplicate_hashes_keeping_the_first() {
        let raw = vec![
            transaction("0x1", "1"),
            transaction("0x2", "2"),
            transaction("0x1", "3"),
            transaction("0x3", "4"),
            transaction("0x2", "5"),
        ];

        let normalized = normalize_transactions(&raw);

        assert_eq!(normalized.duplicates_removed, 2);
        assert_eq!(normalized.records.len(), 3);
        assert_eq!(
            normalized.records[0].value_eth,
            BigDecimal::from_str("0.000000000000000001").unwrap()
        );

        let hashes: Vec<_> = normalized
            .records
            .iter()
            .map(|record| record.hash.as_deref().unwrap())
            .collect();
        assert_eq!(hashes, vec!["0x1", "0x2", "0x3"]);
    }

    #[test]
    fn converts_units_and_flags() {
        let raw = RawTransactionRecord {
            block_number: Some("1234567".to_string()),
            time_stamp: Some("1737936000".to_string()),
            hash: Some("0xabc".to_string()),
            nonce: Some("0x2a".to_string()),
            from: Some("0xfrom".to_string()),
            to: Some("0xto".to_string()),
            value: Some("2500000000000000000".to_string()),
            gas_price: Some("0x3B9ACA00".to_string()),
            gas_used: Some("21000".to_string()),
            is_error: Some("0".to_string()),
            txreceipt_status: Some("1".to_string()),
            method_id: Some("0x".to_string()),
            wallet: Some("0xfrom".to_string()),
            ..Default::default()
        };

        let normalized = normalize_transaction(&raw);

        assert_eq!(normalized.block_number, 1_234_567);
        assert_eq!(
            normalized.datetime.map(|datetime| datetime.to_rfc3339()),
            Some("2025-01-27T00:00:00+00:00".to_string())
        );
        assert_eq!(normalized.value_eth, BigDecimal::from_str("2.5").unwrap());
        assert_eq!(normalized.gas_price_gwei, BigDecimal::from(1));
        assert_eq!(normalized.gas_used, 21_000);
        assert_eq!(normalized.nonce, 42);
        assert_eq!(normalized.is_error, Some(false));
        assert_eq!(normalized.tx_status, Some(true));
        assert_eq!(normalized.wallet.as_deref(), Some("0xfrom"));
    }

    #[test]
    fn tolerates_missing_and_odd_values() {
        let raw = RawTransactionRecord {
            time_stamp: Some("not a time".to_string()),
            value: Some("1e18".to_string()),
            gas_price: None,
            ..Default::default()
        };

        let normalized = normalize_transaction(&raw);

        assert_eq!(normalized.datetime, None);
        assert_eq!(normalized.value_eth, BigDecimal::from(1));
        assert_eq!(normalized.gas_price_gwei, BigDecimal::from(0));
        assert_eq!(normalized.block_number, 0);
        assert_eq!(normalized.is_error, Some(false));
        assert_eq!(normalized.tx_status, Some(false));
    }

    #[test]
    fn empty_status_flags_read_as_false() {
        let raw = RawTransactionRecord {
            is_error: Some(String::new()),
            txreceipt_status: Some(" ".to_string()),
            ..Default::default()
        };

        let normalized = normalize_transaction(&raw);

        assert_eq!(normalized.is_error, Some(false));
        assert_eq!(normalized.tx_status, Some(false));

        let failed = normalize_transaction(&RawTransactionRecord {
            is_error: Some("1".to_string()),
            txreceipt_status: Some("0".to_string()),
            ..Default::default()
        });

        assert_eq!(failed.is_error, Some(true));
        assert_eq!(failed.tx_status, Some(false));
    }
}
