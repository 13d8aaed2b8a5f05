pub mod logs;
pub mod transactions;

use std::{collections::HashSet, fmt, hash::Hash, ops::RangeInclusive};

use log::{error, info, warn};

use crate::models::Dataset;

/// Outcome of a reconciliation run. Warnings never fail a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub dataset: Dataset,
    pub passed: Vec<String>,
    pub failures: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            passed: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn check(&mut self, ok: bool, passed: String, failed: String) {
        if ok {
            self.passed.push(passed);
        } else {
            self.failures.push(failed);
        }
    }

    fn check_nulls(&mut self, column: &str, nulls: usize) {
        self.check(
            nulls == 0,
            format!("No nulls in {}", column),
            format!("{} has {} nulls", column, nulls),
        );
    }

    fn check_block_range(&mut self, blocks: impl Iterator<Item = u64>, expected: &RangeInclusive<u64>) {
        let (min, max) = blocks.fold((u64::MAX, u64::MIN), |(min, max), block| {
            (min.min(block), max.max(block))
        });

        if min > max {
            return;
        }

        if expected.contains(&min) && expected.contains(&max) {
            self.passed
                .push(format!("Block range looks valid: {} -> {}", min, max));
        } else {
            self.warnings.push(format!(
                "Block range {} -> {} is outside {} -> {}, verify if expected",
                min,
                max,
                expected.start(),
                expected.end()
            ));
        }
    }

    pub fn log_summary(&self) {
        for check in &self.passed {
            info!("[{}] ok: {}", self.dataset, check);
        }

        for warning in &self.warnings {
            warn!("[{}] {}", self.dataset, warning);
        }

        for failure in &self.failures {
            error!("[{}] failed: {}", self.dataset, failure);
        }

        if self.is_success() {
            info!("[{}] All validation checks passed", self.dataset);
        } else {
            error!(
                "[{}] {} validation issue(s) found",
                self.dataset,
                self.failures.len()
            );
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} passed, {} warnings, {} failures",
            self.dataset,
            self.passed.len(),
            self.warnings.len(),
            self.failures.len()
        )
    }
}

/// Rows beyond the first occurrence of each key.
pub fn count_duplicates<K: Eq + Hash>(keys: impl Iterator<Item = K>) -> usize {
    let mut seen = HashSet::new();
    let mut duplicates = 0;

    for key in keys {
        if !seen.insert(key) {
            duplicates += 1;
        }
    }

    duplicates
}
