use serde::{Deserialize, Serialize};

use super::columns;

/// One `getLogs` entry exactly as the explorer returned it.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLogRecord {
    pub address: Option<String>,
    #[serde(default, with = "columns::topics")]
    pub topics: Vec<String>,
    pub data: Option<String>,
    pub block_number: Option<String>,
    pub block_hash: Option<String>,
    pub time_stamp: Option<String>,
    pub gas_price: Option<String>,
    pub gas_used: Option<String>,
    pub log_index: Option<String>,
    pub transaction_hash: Option<String>,
    pub transaction_index: Option<String>,
}

/// One `txlist` entry plus the wallet it was fetched for, the explorer does
/// not echo the queried address back.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransactionRecord {
    pub block_number: Option<String>,
    pub time_stamp: Option<String>,
    pub hash: Option<String>,
    pub nonce: Option<String>,
    pub block_hash: Option<String>,
    pub transaction_index: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub value: Option<String>,
    pub gas: Option<String>,
    pub gas_price: Option<String>,
    pub is_error: Option<String>,
    #[serde(rename = "txreceipt_status")]
    pub txreceipt_status: Option<String>,
    pub input: Option<String>,
    pub contract_address: Option<String>,
    pub cumulative_gas_used: Option<String>,
    pub gas_used: Option<String>,
    pub confirmations: Option<String>,
    pub method_id: Option<String>,
    pub function_name: Option<String>,
    pub wallet: Option<String>,
}
