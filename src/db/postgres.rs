use std::io::Write;

use chrono::Utc;
use diesel::{
    pg::CopyFormat,
    prelude::*,
    sql_query,
    sql_types::{BigInt, Bool, Text},
    PgConnection,
};
use log::{debug, info};

use crate::models::Dataset;

use super::{
    ddl, schema, LoadError, LoadPartition, SourceBatch, TableStatus, Warehouse, NULL_SENTINEL,
};

#[derive(QueryableByName)]
struct Exists {
    #[diesel(sql_type = Bool)]
    found: bool,
}

#[derive(QueryableByName)]
struct RowCount {
    #[diesel(sql_type = BigInt)]
    row_count: i64,
}

/// Streams already rendered rows as headerless CSV.
pub fn write_copy_rows(out: &mut dyn Write, rows: &[Vec<String>]) -> Result<(), LoadError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);

    for row in rows {
        writer.write_record(row)?;
    }

    writer.flush()?;

    Ok(())
}

macro_rules! copy_rows {
    ($conn:expr, $table:path, $rows:expr) => {
        diesel::copy_from($table)
            .from_raw_data($table, |copy: &mut dyn Write| write_copy_rows(copy, $rows))
            .with_format(CopyFormat::Csv)
            .with_null(NULL_SENTINEL)
            .execute($conn)
    };
}

fn copy_batch(
    conn: &mut PgConnection,
    partition: &LoadPartition,
    rows: &[Vec<String>],
) -> Result<usize, LoadError> {
    match (partition.chain.name, partition.dataset) {
        ("ethereum", Dataset::Logs) => copy_rows!(conn, schema::ethereum_logs::table, rows),
        ("linea", Dataset::Logs) => copy_rows!(conn, schema::linea_logs::table, rows),
        ("ethereum", Dataset::Transactions) => {
            copy_rows!(conn, schema::ethereum_transactions::table, rows)
        }
        ("linea", Dataset::Transactions) => {
            copy_rows!(conn, schema::linea_transactions::table, rows)
        }
        _ => Err(LoadError::UnknownPartition(partition.to_string())),
    }
}

pub struct PgWarehouse {
    connection: PgConnection,
}

impl PgWarehouse {
    pub fn connect(db_url: &str) -> Result<Self, LoadError> {
        info!("Connecting to the warehouse");

        let connection = PgConnection::establish(db_url)?;

        Ok(Self { connection })
    }

    fn table_exists(&mut self, partition: &LoadPartition) -> Result<bool, LoadError> {
        let found = sql_query("SELECT to_regclass($1) IS NOT NULL AS found")
            .bind::<Text, _>(partition.qualified_name())
            .get_result::<Exists>(&mut self.connection)?;

        Ok(found.found)
    }
}

impl Warehouse for PgWarehouse {
    fn load_partition(
        &mut self,
        partition: &LoadPartition,
        truncate: bool,
        batches: &[SourceBatch],
    ) -> Result<usize, LoadError> {
        let loaded_at = Utc::now();

        self.connection
            .transaction::<usize, LoadError, _>(|conn| {
                sql_query(ddl::create_schema()).execute(conn)?;
                sql_query(ddl::create_table(partition)).execute(conn)?;

                for index in ddl::create_indexes(partition) {
                    sql_query(index).execute(conn)?;
                }

                if truncate {
                    debug!("Truncating {}", partition);
                    sql_query(ddl::truncate_table(partition)).execute(conn)?;
                }

                let mut loaded = 0;

                for batch in batches {
                    if batch.rows.dataset() != partition.dataset {
                        return Err(LoadError::DatasetMismatch {
                            partition: partition.to_string(),
                            dataset: batch.rows.dataset(),
                        });
                    }

                    let rows = batch.copy_rows(loaded_at);
                    let copied = copy_batch(conn, partition, &rows)?;

                    debug!(
                        "Copied {} rows from {} into {}",
                        copied, batch.source.file_name, partition
                    );

                    loaded += copied;
                }

                Ok(loaded)
            })
    }

    fn file_already_loaded(
        &mut self,
        partition: &LoadPartition,
        source_file: &str,
    ) -> Result<bool, LoadError> {
        if !self.table_exists(partition)? {
            return Ok(false);
        }

        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE source_file = $1) AS found",
            partition.qualified_name()
        );

        let found = sql_query(query)
            .bind::<Text, _>(source_file)
            .get_result::<Exists>(&mut self.connection)?;

        Ok(found.found)
    }

    fn table_status(&mut self, partition: &LoadPartition) -> Result<TableStatus, LoadError> {
        if !self.table_exists(partition)? {
            return Ok(TableStatus::default());
        }

        let query = format!(
            "SELECT COUNT(*) AS row_count FROM {}",
            partition.qualified_name()
        );

        let count = sql_query(query).get_result::<RowCount>(&mut self.connection)?;

        Ok(TableStatus {
            exists: true,
            row_count: count.row_count,
        })
    }
}
