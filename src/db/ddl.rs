use crate::models::Dataset;

use super::LoadPartition;

pub const RAW_SCHEMA: &str = "raw";

pub fn create_schema() -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {}", RAW_SCHEMA)
}

pub fn create_table(partition: &LoadPartition) -> String {
    let table = partition.qualified_name();

    match partition.dataset {
        Dataset::Logs => format!(
            "CREATE TABLE IF NOT EXISTS {} (
                tx_hash TEXT NOT NULL,
                block_number BIGINT NOT NULL,
                timestamp BIGINT NOT NULL,
                datetime TIMESTAMP WITH TIME ZONE,
                from_address VARCHAR(42),
                to_address VARCHAR(42),
                message_hash VARCHAR(66),
                value_eth NUMERIC(78, 18),
                fee_eth NUMERIC(78, 18),
                nonce BIGINT,
                gas_price BIGINT NOT NULL,
                gas_used BIGINT NOT NULL,
                log_index BIGINT NOT NULL,
                tx_index BIGINT NOT NULL,
                blockchain TEXT NOT NULL,
                api_extracted_start_date DATE NOT NULL,
                api_extracted_end_date DATE NOT NULL,
                source_file TEXT NOT NULL,
                loaded_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (tx_hash, log_index)
            )",
            table
        ),
        Dataset::Transactions => format!(
            "CREATE TABLE IF NOT EXISTS {} (
                hash TEXT NOT NULL PRIMARY KEY,
                datetime TIMESTAMP WITH TIME ZONE,
                block_number BIGINT NOT NULL,
                from_address VARCHAR(42),
                to_address VARCHAR(42),
                value_eth NUMERIC(78, 18) NOT NULL,
                gas_price_gwei NUMERIC(78, 9) NOT NULL,
                gas_used BIGINT NOT NULL,
                nonce BIGINT NOT NULL,
                is_error BOOLEAN,
                tx_status BOOLEAN,
                method_id TEXT,
                function_name TEXT,
                wallet VARCHAR(42),
                blockchain TEXT NOT NULL,
                api_extracted_start_date DATE NOT NULL,
                api_extracted_end_date DATE NOT NULL,
                source_file TEXT NOT NULL,
                loaded_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            table
        ),
    }
}

pub fn create_indexes(partition: &LoadPartition) -> Vec<String> {
    let table = partition.qualified_name();
    let name = partition.table_name();

    let mut columns = vec!["from_address", "datetime", "block_number", "source_file"];

    if partition.dataset == Dataset::Transactions {
        columns.push("wallet");
    }

    columns
        .into_iter()
        .map(|column| {
            format!(
                "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {} ({})",
                name, column, table, column
            )
        })
        .collect()
}

pub fn truncate_table(partition: &LoadPartition) -> String {
    format!("TRUNCATE TABLE {}", partition.qualified_name())
}
