//! Intermediate tabular files shared by the extract, transform, validate and
//! load stages. Every file is CSV with a header row.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::{de::DeserializeOwned, Serialize};

use crate::{chains::Chain, models::Dataset};

pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Unable to open {}", path.display()))?;

    let mut records = Vec::new();

    for (line, record) in reader.deserialize().enumerate() {
        let record: T = record
            .with_context(|| format!("Malformed row {} in {}", line + 2, path.display()))?;
        records.push(record);
    }

    debug!("Read {} rows from {}", records.len(), path.display());

    Ok(records)
}

/// Writes the records to a sibling temporary file and renames it over
/// `path`, so readers only ever see a complete file.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Unable to create {}", parent.display()))?;
        }
    }

    let tmp_path = temporary_path(path);

    let mut writer = csv::Writer::from_path(&tmp_path)
        .with_context(|| format!("Unable to create {}", tmp_path.display()))?;

    for record in records {
        writer.serialize(record)?;
    }

    let file: File = writer
        .into_inner()
        .map_err(|err| anyhow!("Unable to flush {}: {}", tmp_path.display(), err))?;
    file.sync_all()?;

    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "Unable to move {} into {}",
            tmp_path.display(),
            path.display()
        )
    })?;

    debug!("Wrote {} rows to {}", records.len(), path.display());

    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    path.with_file_name(format!(".{}.tmp", name))
}

/// `logs_ethereum_2025-01-27_to_2026-01-27.csv`, the shape the loader maps
/// back to a partition.
pub fn source_file_name(dataset: Dataset, chain: &Chain, start: &str, end: &str) -> String {
    format!("{}_{}_{}_to_{}.csv", dataset, chain.name, start, end)
}
