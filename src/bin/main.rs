mod opt;
mod opt_common;

use std::fs::create_dir_all;

use crate::opt::Opt;
use crate::opt_common::init_logging;

use anyhow::{Context, Result};
use clap::Parser;
use hijet::{prelude::*, table::output_file_name};
use log::{debug, info};

fn main() -> Result<()> {
    let args = argfile::expand_args_from(
        std::env::args_os(),
        argfile::parse_fromfile,
        argfile::PREFIX,
    )
    .with_context(|| "Failed to read argument file")?;
    let opt = Opt::parse_from(args);
    init_logging("hijet", &opt.log);
    debug!("settings: {:#?}", opt);
    run_main(opt.validate()?)?;
    info!("done");
    Ok(())
}

fn run_main(opt: Opt) -> Result<()> {
    let config = AnalysisConfig::from_file(&opt.config)?;
    match opt.centrality {
        Some(centrality) => info!("Centrality class {centrality}%"),
        None => info!("Proton-proton run"),
    }

    create_dir_all(&opt.outdir).with_context(|| {
        format!("Failed to create output directory {:?}", opt.outdir)
    })?;
    let observables = opt.outdir.join(output_file_name(&opt.input, "observables"));
    let cross_section =
        opt.outdir.join(output_file_name(&opt.input, "cross_section"));

    let reader = FileReader::new(&opt.input)?;
    let analysis = Analysis::new(config, opt.centrality)
        .context("Invalid analysis configuration")?;

    let mut hijet = HijetBuilder {
        reader,
        analysis,
        observables,
        cross_section,
    }
    .build();
    hijet.run()?;
    Ok(())
}
