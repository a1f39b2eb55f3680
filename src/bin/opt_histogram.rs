use std::path::PathBuf;

use crate::opt_common::*;

use anyhow::Result;
use clap::Parser;

#[derive(Debug, Parser)]
#[clap(about = "Histogram observables written by hijet", author, version)]
pub(crate) struct Opt {
    /// Analysis configuration file.
    #[clap(long, short, value_parser)]
    pub(crate) config: PathBuf,

    /// Observable table written by hijet.
    ///
    /// The cross section table is expected in the same directory.
    #[clap(long, short, value_parser)]
    pub(crate) input: PathBuf,

    /// Output directory.
    #[clap(long, short, value_parser, default_value = ".")]
    pub(crate) outdir: PathBuf,

    #[clap(flatten)]
    pub(crate) log: LogOpt,
}

impl Opt {
    pub(crate) fn validate(self) -> Result<Self> {
        ensure_file_exists(&self.config, "Configuration file")?;
        ensure_file_exists(&self.input, "Observable table")?;
        Ok(self)
    }
}
