//! Full-refresh bulk load of decoded files into the warehouse, one database
//! transaction per `(chain, dataset)` partition.

use std::{
    collections::BTreeMap,
    fmt, fs,
    path::Path,
    str::FromStr,
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{error, info, warn};

use crate::{
    chains::get_chain,
    db::{BatchRows, LoadPartition, SourceBatch, SourceFile, TableStatus, Warehouse},
    files::read_records,
    models::{Dataset, DecodedLogRecord, NormalizedTransactionRecord},
};

/// Maps `<dataset>_<chain>_<start>_to_<end>.csv` back to its partition.
pub fn parse_source_file_name(path: &Path) -> Option<SourceFile> {
    let file_name = path.file_name()?.to_str()?.to_string();
    let stem = file_name.strip_suffix(".csv")?;

    let (dataset, rest) = stem.split_once('_')?;
    let (chain, window) = rest.split_once('_')?;
    let (start, end) = window.split_once("_to_")?;

    Some(SourceFile {
        path: path.to_path_buf(),
        dataset: Dataset::from_str(dataset).ok()?,
        chain: get_chain(chain)?,
        start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").ok()?,
        end_date: NaiveDate::parse_from_str(end, "%Y-%m-%d").ok()?,
        file_name,
    })
}

#[derive(Debug, Default)]
pub struct Discovery {
    pub files: Vec<SourceFile>,
    pub malformed: Vec<String>,
}

/// Lists the loadable CSV files of `dir` in name order. Hidden files are
/// in-progress writes and are ignored.
pub fn discover_source_files(dir: &Path) -> Result<Discovery> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Unable to list {}", dir.display()))?;

    let mut paths = Vec::new();

    for entry in entries {
        let path = entry?.path();

        let name = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        if name.starts_with('.') || !name.ends_with(".csv") || !path.is_file() {
            continue;
        }

        paths.push((name, path));
    }

    paths.sort();

    let mut discovery = Discovery::default();

    for (name, path) in paths {
        match parse_source_file_name(&path) {
            Some(file) => discovery.files.push(file),
            None => {
                warn!("Skipping {}: name does not match <dataset>_<chain>_<start>_to_<end>.csv", name);
                discovery.malformed.push(name);
            }
        }
    }

    Ok(discovery)
}

fn read_batch(source: &SourceFile) -> Result<SourceBatch> {
    let rows = match source.dataset {
        Dataset::Logs => BatchRows::Logs(read_records::<DecodedLogRecord>(&source.path)?),
        Dataset::Transactions => {
            BatchRows::Transactions(read_records::<NormalizedTransactionRecord>(&source.path)?)
        }
    };

    Ok(SourceBatch {
        source: source.clone(),
        rows,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionOutcome {
    Loaded { rows: usize },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct PartitionReport {
    pub partition: LoadPartition,
    pub files: Vec<String>,
    pub skipped_files: Vec<String>,
    pub outcome: PartitionOutcome,
    pub status: Option<TableStatus>,
}

impl PartitionReport {
    pub fn is_loaded(&self) -> bool {
        matches!(self.outcome, PartitionOutcome::Loaded { .. })
    }
}

impl fmt::Display for PartitionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            PartitionOutcome::Loaded { rows } => write!(
                f,
                "{}: loaded {} rows from {} files",
                self.partition,
                rows,
                self.files.len()
            )?,
            PartitionOutcome::Failed(reason) => {
                write!(f, "{}: failed, rolled back ({})", self.partition, reason)?
            }
        }

        if !self.skipped_files.is_empty() {
            write!(f, ", {} already loaded", self.skipped_files.len())?;
        }

        if let Some(status) = self.status {
            write!(f, ", table holds {} rows", status.row_count)?;
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LoadSummary {
    pub partitions: Vec<PartitionReport>,
    pub malformed: Vec<String>,
}

impl LoadSummary {
    pub fn is_success(&self) -> bool {
        self.partitions.iter().all(PartitionReport::is_loaded)
    }

    pub fn rows_loaded(&self) -> usize {
        self.partitions
            .iter()
            .map(|report| match report.outcome {
                PartitionOutcome::Loaded { rows } => rows,
                PartitionOutcome::Failed(_) => 0,
            })
            .sum()
    }

    pub fn log_summary(&self) {
        for report in &self.partitions {
            if report.is_loaded() {
                info!("{}", report);
            } else {
                error!("{}", report);
            }
        }

        for name in &self.malformed {
            warn!("Not loaded, unrecognized file name: {}", name);
        }

        info!(
            "Loaded {} rows, {} of {} partitions succeeded",
            self.rows_loaded(),
            self.partitions.iter().filter(|report| report.is_loaded()).count(),
            self.partitions.len()
        );
    }
}

pub struct BulkLoader<W: Warehouse> {
    warehouse: W,
    append: bool,
}

impl<W: Warehouse> BulkLoader<W> {
    pub fn new(warehouse: W) -> Self {
        Self {
            warehouse,
            append: false,
        }
    }

    /// Keeps existing rows and skips files whose `source_file` marker is
    /// already present, instead of truncating each partition.
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn warehouse(&self) -> &W {
        &self.warehouse
    }

    pub fn load(&mut self, files: &[SourceFile]) -> LoadSummary {
        let mut partitions: BTreeMap<LoadPartition, Vec<&SourceFile>> = BTreeMap::new();

        for file in files {
            partitions.entry(file.partition()).or_default().push(file);
        }

        let mut summary = LoadSummary::default();

        for (partition, files) in partitions {
            info!("Loading {} files into {}", files.len(), partition);

            let report = self.load_partition(partition, &files);

            if report.is_loaded() {
                info!("{}", report);
            } else {
                error!("{}", report);
            }

            summary.partitions.push(report);
        }

        summary
    }

    fn load_partition(&mut self, partition: LoadPartition, files: &[&SourceFile]) -> PartitionReport {
        let mut report = PartitionReport {
            partition,
            files: files.iter().map(|file| file.file_name.clone()).collect(),
            skipped_files: Vec::new(),
            outcome: PartitionOutcome::Loaded { rows: 0 },
            status: None,
        };

        let mut pending = Vec::new();

        for file in files {
            if self.append {
                match self.warehouse.file_already_loaded(&partition, &file.file_name) {
                    Ok(true) => {
                        info!("Skipping {}, already in {}", file.file_name, partition);
                        report.skipped_files.push(file.file_name.clone());
                        continue;
                    }
                    Ok(false) => {}
                    Err(err) => {
                        report.outcome = PartitionOutcome::Failed(err.to_string());
                        return report;
                    }
                }
            }

            match read_batch(file) {
                Ok(batch) => pending.push(batch),
                Err(err) => {
                    report.outcome = PartitionOutcome::Failed(format!("{:#}", err));
                    return report;
                }
            }
        }

        if self.append && pending.is_empty() {
            report.status = self.warehouse.table_status(&partition).ok();
            return report;
        }

        report.outcome = match self
            .warehouse
            .load_partition(&partition, !self.append, &pending)
        {
            Ok(rows) => PartitionOutcome::Loaded { rows },
            Err(err) => PartitionOutcome::Failed(err.to_string()),
        };

        report.status = match self.warehouse.table_status(&partition) {
            Ok(status) => Some(status),
            Err(err) => {
                warn!("Unable to read the status of {}: {}", partition, err);
                None
            }
        };

        report
    }
}
