use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use super::{database_url, TRANSFORMED_DATA_DIR};

#[derive(Parser, Debug)]
#[command(
    name = "Load",
    about = "Bulk loads transformed files into the warehouse, one transaction per partition."
)]
pub struct LoadArgs {
    #[arg(short, long, help = "Start log with debug.", default_value_t = false)]
    pub debug: bool,

    #[arg(short, long, help = "Directory of the transformed files.", default_value = TRANSFORMED_DATA_DIR)]
    pub input_dir: PathBuf,

    #[arg(
        short,
        long,
        help = "Keep existing rows and skip files already loaded instead of a full refresh.",
        default_value_t = false
    )]
    pub append: bool,
}

#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub debug: bool,
    pub db_url: String,
    pub input_dir: PathBuf,
    pub append: bool,
}

impl LoadConfig {
    pub fn new() -> Result<Self> {
        Self::from_args(LoadArgs::parse())
    }

    pub fn from_args(args: LoadArgs) -> Result<Self> {
        Ok(Self {
            debug: args.debug,
            db_url: database_url()?,
            input_dir: args.input_dir,
            append: args.append,
        })
    }
}
