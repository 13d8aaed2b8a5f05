pub mod ddl;
pub mod postgres;
pub mod schema;

use std::{fmt, path::PathBuf};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use thiserror::Error;

use crate::{
    chains::Chain,
    models::{Dataset, DecodedLogRecord, NormalizedTransactionRecord},
};

pub use postgres::PgWarehouse;

/// Null marker in the COPY stream.
pub const NULL_SENTINEL: &str = "\\N";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unable to connect to the database: {0}")]
    Connection(#[from] diesel::ConnectionError),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("unable to stream rows: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to encode rows: {0}")]
    Csv(#[from] csv::Error),
    #[error("{dataset} rows cannot be loaded into {partition}")]
    DatasetMismatch { partition: String, dataset: Dataset },
    #[error("no destination table for {0}")]
    UnknownPartition(String),
}

/// One destination table, `raw.<chain>_<dataset>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadPartition {
    pub chain: Chain,
    pub dataset: Dataset,
}

impl LoadPartition {
    pub fn new(chain: Chain, dataset: Dataset) -> Self {
        Self { chain, dataset }
    }

    pub fn table_name(&self) -> String {
        format!("{}_{}", self.chain.name, self.dataset)
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", ddl::RAW_SCHEMA, self.table_name())
    }
}

impl fmt::Display for LoadPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableStatus {
    pub exists: bool,
    pub row_count: i64,
}

/// A decoded file whose name identifies the partition and extraction window
/// it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_name: String,
    pub dataset: Dataset,
    pub chain: Chain,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl SourceFile {
    pub fn partition(&self) -> LoadPartition {
        LoadPartition::new(self.chain, self.dataset)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchRows {
    Logs(Vec<DecodedLogRecord>),
    Transactions(Vec<NormalizedTransactionRecord>),
}

impl BatchRows {
    pub fn dataset(&self) -> Dataset {
        match self {
            BatchRows::Logs(_) => Dataset::Logs,
            BatchRows::Transactions(_) => Dataset::Transactions,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            BatchRows::Logs(rows) => rows.len(),
            BatchRows::Transactions(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The rows of one source file, appended to its partition in one COPY.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBatch {
    pub source: SourceFile,
    pub rows: BatchRows,
}

impl SourceBatch {
    /// Rows in table column order with the marker columns appended.
    pub fn copy_rows(&self, loaded_at: DateTime<Utc>) -> Vec<Vec<String>> {
        let markers = [
            self.source.chain.name.to_string(),
            self.source.start_date.to_string(),
            self.source.end_date.to_string(),
            self.source.file_name.clone(),
            loaded_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        ];

        let mut rows = match &self.rows {
            BatchRows::Logs(logs) => logs.iter().map(log_fields).collect::<Vec<_>>(),
            BatchRows::Transactions(transactions) => {
                transactions.iter().map(transaction_fields).collect()
            }
        };

        for row in rows.iter_mut() {
            row.extend(markers.iter().cloned());
        }

        rows
    }
}

fn field<T: ToString>(value: Option<T>) -> String {
    value
        .map(|value| value.to_string())
        .unwrap_or_else(|| NULL_SENTINEL.to_string())
}

fn timestamp_field(value: Option<DateTime<Utc>>) -> String {
    field(value.map(|value| value.to_rfc3339_opts(SecondsFormat::Secs, true)))
}

fn log_fields(log: &DecodedLogRecord) -> Vec<String> {
    vec![
        field(log.tx_hash.as_ref()),
        log.block_number.to_string(),
        log.timestamp.to_string(),
        timestamp_field(log.datetime),
        field(log.from_address.as_ref()),
        field(log.to_address.as_ref()),
        field(log.message_hash.as_ref()),
        field(log.value_eth.as_ref()),
        field(log.fee_eth.as_ref()),
        field(log.nonce),
        log.gas_price.to_string(),
        log.gas_used.to_string(),
        log.log_index.to_string(),
        log.tx_index.to_string(),
    ]
}

fn transaction_fields(transaction: &NormalizedTransactionRecord) -> Vec<String> {
    vec![
        field(transaction.hash.as_ref()),
        timestamp_field(transaction.datetime),
        transaction.block_number.to_string(),
        field(transaction.from_address.as_ref()),
        field(transaction.to_address.as_ref()),
        transaction.value_eth.to_string(),
        transaction.gas_price_gwei.to_string(),
        transaction.gas_used.to_string(),
        transaction.nonce.to_string(),
        field(transaction.is_error),
        field(transaction.tx_status),
        field(transaction.method_id.as_ref()),
        field(transaction.function_name.as_ref()),
        field(transaction.wallet.as_ref()),
    ]
}

/// Destination of the bulk loader. `load_partition` is all or nothing:
/// either every batch is visible afterwards or none is.
pub trait Warehouse {
    fn load_partition(
        &mut self,
        partition: &LoadPartition,
        truncate: bool,
        batches: &[SourceBatch],
    ) -> Result<usize, LoadError>;

    fn file_already_loaded(
        &mut self,
        partition: &LoadPartition,
        source_file: &str,
    ) -> Result<bool, LoadError>;

    fn table_status(&mut self, partition: &LoadPartition) -> Result<TableStatus, LoadError>;
}
