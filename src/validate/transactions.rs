use std::ops::RangeInclusive;

use bigdecimal::BigDecimal;

use crate::models::{Dataset, NormalizedTransactionRecord, RawTransactionRecord};

use super::{count_duplicates, ValidationReport};

pub const EXPECTED_TRANSACTION_BLOCKS: RangeInclusive<u64> = 0..=100_000_000;

pub fn validate_transactions(
    raw: &[RawTransactionRecord],
    normalized: &[NormalizedTransactionRecord],
    expected_blocks: &RangeInclusive<u64>,
) -> ValidationReport {
    let mut report = ValidationReport::new(Dataset::Transactions);

    if raw.len() == normalized.len() {
        report
            .passed
            .push(format!("Row count: {} == {}", raw.len(), normalized.len()));
    } else {
        let raw_duplicates = count_duplicates(raw.iter().map(|tx| tx.hash.as_deref()));

        if raw.len() - raw_duplicates.min(raw.len()) == normalized.len() {
            report.warnings.push(format!(
                "Row count mismatch (expected): {} -> {} ({} hashes deduplicated)",
                raw.len(),
                normalized.len(),
                raw_duplicates
            ));
        } else {
            report.failures.push(format!(
                "Row count mismatch: {} vs {}",
                raw.len(),
                normalized.len()
            ));
        }
    }

    let duplicates = count_duplicates(normalized.iter().map(|tx| tx.hash.as_deref()));
    report.check(
        duplicates == 0,
        "No duplicate hashes".to_string(),
        format!("Found {} duplicate hashes", duplicates),
    );

    report.check_nulls(
        "hash",
        normalized.iter().filter(|tx| tx.hash.is_none()).count(),
    );
    report.check_nulls(
        "from_address",
        normalized.iter().filter(|tx| tx.from_address.is_none()).count(),
    );

    let zero = BigDecimal::default();

    let negative_values = normalized.iter().filter(|tx| tx.value_eth < zero).count();
    report.check(
        negative_values == 0,
        "No negative ETH values".to_string(),
        format!("Found {} negative ETH values", negative_values),
    );

    let negative_gas = normalized
        .iter()
        .filter(|tx| tx.gas_price_gwei < zero)
        .count();
    report.check(
        negative_gas == 0,
        "No negative gas prices".to_string(),
        format!("Found {} negative gas prices", negative_gas),
    );

    report.check_block_range(normalized.iter().map(|tx| tx.block_number), expected_blocks);

    report
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::transform::transactions::normalize_transactions;

    fn raw(hash: &str) -> RawTransactionRecord {
        RawTransactionRecord {
            hash: Some(hash.to_string()),
            from: Some("0xfrom".to_string()),
            block_number: Some("1000".to_string()),
            value: Some("1".to_string()),
            gas_price: Some("1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn deduplicated_rows_are_only_a_warning() {
        let raw = vec![raw("0x1"), raw("0x2"), raw("0x1")];
        let normalized = normalize_transactions(&raw).records;

        let report = validate_transactions(&raw, &normalized, &EXPECTED_TRANSACTION_BLOCKS);

        assert!(report.is_success(), "{:?}", report.failures);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("1 hashes deduplicated"));
    }

    #[test]
    fn flags_unexplained_losses_and_bad_values() {
        let raw = vec![raw("0x1"), raw("0x2"), raw("0x3")];
        let mut normalized = normalize_transactions(&raw[..2]).records;

        normalized[0].from_address = None;
        normalized[1].gas_price_gwei = BigDecimal::from_str("-1").unwrap();
        normalized[1].hash = normalized[0].hash.clone();

        let report = validate_transactions(&raw, &normalized, &EXPECTED_TRANSACTION_BLOCKS);

        assert_eq!(
            report.failures,
            vec![
                "Row count mismatch: 3 vs 2".to_string(),
                "Found 1 duplicate hashes".to_string(),
                "from_address has 1 nulls".to_string(),
                "Found 1 negative gas prices".to_string(),
            ]
        );
    }
}
