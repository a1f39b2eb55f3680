use std::path::PathBuf;

use crate::opt_common::*;

use anyhow::Result;
use clap::Parser;
use hijet::centrality::Centrality;

#[derive(Debug, Parser)]
#[clap(about, author, version)]
pub(crate) struct Opt {
    /// Analysis configuration file.
    #[clap(long, short, value_parser)]
    pub(crate) config: PathBuf,

    /// Input file with final-state hadrons.
    ///
    /// Compressed files are decompressed automatically.
    #[clap(long, short, value_parser)]
    pub(crate) input: PathBuf,

    /// Output directory.
    #[clap(long, short, value_parser, default_value = ".")]
    pub(crate) outdir: PathBuf,

    /// Centrality class as MIN-MAX in percent.
    ///
    /// Without a centrality, events are treated as proton-proton
    /// collisions and holes are ignored.
    #[clap(long)]
    pub(crate) centrality: Option<Centrality>,

    #[clap(flatten)]
    pub(crate) log: LogOpt,
}

impl Opt {
    pub(crate) fn validate(self) -> Result<Self> {
        ensure_file_exists(&self.config, "Configuration file")?;
        ensure_file_exists(&self.input, "Input file")?;
        Ok(self)
    }
}
