use std::ops::RangeInclusive;

use bigdecimal::BigDecimal;

use crate::models::{Dataset, DecodedLogRecord, RawLogRecord};

use super::{count_duplicates, ValidationReport};

/// Blocks the bridge has been emitting `MessageSent` in.
pub const EXPECTED_LOG_BLOCKS: RangeInclusive<u64> = 17_000_000..=30_000_000;

pub fn validate_logs(
    raw: &[RawLogRecord],
    decoded: &[DecodedLogRecord],
    expected_blocks: &RangeInclusive<u64>,
) -> ValidationReport {
    let mut report = ValidationReport::new(Dataset::Logs);

    report.check(
        raw.len() == decoded.len(),
        format!("Row count: {} == {}", raw.len(), decoded.len()),
        format!("Row count mismatch: {} vs {}", raw.len(), decoded.len()),
    );

    let duplicates = count_duplicates(
        decoded
            .iter()
            .map(|log| (log.tx_hash.as_deref(), log.log_index)),
    );
    report.check(
        duplicates == 0,
        "No duplicate (tx_hash, log_index) pairs".to_string(),
        format!("Found {} duplicate rows", duplicates),
    );

    report.check_nulls(
        "tx_hash",
        decoded.iter().filter(|log| log.tx_hash.is_none()).count(),
    );
    report.check_nulls(
        "from_address",
        decoded.iter().filter(|log| log.from_address.is_none()).count(),
    );
    report.check_nulls(
        "value_eth",
        decoded.iter().filter(|log| log.value_eth.is_none()).count(),
    );

    let zero = BigDecimal::default();
    let negative = decoded
        .iter()
        .filter(|log| matches!(&log.value_eth, Some(value) if *value < zero))
        .count();
    report.check(
        negative == 0,
        "No negative ETH values".to_string(),
        format!("Found {} negative ETH values", negative),
    );

    report.check_block_range(decoded.iter().map(|log| log.block_number), expected_blocks);

    report
}
