pub mod columns;
pub mod decoded;
pub mod raw;

use std::{fmt, str::FromStr};

use anyhow::{bail, Error};

pub use decoded::{DecodedLogRecord, NormalizedTransactionRecord};
pub use raw::{RawLogRecord, RawTransactionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dataset {
    Logs,
    Transactions,
}

impl Dataset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Logs => "logs",
            Dataset::Transactions => "transactions",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dataset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logs" => Ok(Dataset::Logs),
            "transactions" | "txs" => Ok(Dataset::Transactions),
            other => bail!("unknown dataset {}", other),
        }
    }
}
