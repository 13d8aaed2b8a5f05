use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::columns;

/// A decoded `MessageSent` occurrence. Primary key is `(tx_hash, log_index)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedLogRecord {
    pub tx_hash: Option<String>,
    pub block_number: u64,
    pub timestamp: u64,
    pub datetime: Option<DateTime<Utc>>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub message_hash: Option<String>,
    #[serde(default, with = "columns::optional_decimal")]
    pub value_eth: Option<BigDecimal>,
    #[serde(default, with = "columns::optional_decimal")]
    pub fee_eth: Option<BigDecimal>,
    pub nonce: Option<u64>,
    pub gas_price: u64,
    pub gas_used: u64,
    pub log_index: u64,
    pub tx_index: u64,
}

/// A cleaned wallet transaction. Primary key is `hash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTransactionRecord {
    pub datetime: Option<DateTime<Utc>>,
    pub block_number: u64,
    pub hash: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    #[serde(with = "columns::decimal")]
    pub value_eth: BigDecimal,
    #[serde(with = "columns::decimal")]
    pub gas_price_gwei: BigDecimal,
    pub gas_used: u64,
    pub nonce: u64,
    pub is_error: Option<bool>,
    pub tx_status: Option<bool>,
    pub method_id: Option<String>,
    pub function_name: Option<String>,
    pub wallet: Option<String>,
}
