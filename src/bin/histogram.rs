mod opt_common;
mod opt_histogram;

use std::fs::create_dir_all;

use crate::opt_common::init_logging;
use crate::opt_histogram::Opt;

use anyhow::{Context, Result};
use clap::Parser;
use hijet::{
    histogram::{histogram_file_name, write_histograms},
    prelude::*,
    table::{cross_section_path, read_cross_section, ObservableFile},
};
use log::{debug, info};

fn main() -> Result<()> {
    let args = argfile::expand_args_from(
        std::env::args_os(),
        argfile::parse_fromfile,
        argfile::PREFIX,
    )
    .with_context(|| "Failed to read argument file")?;
    let opt = Opt::parse_from(args);
    init_logging("hijet-histogram", &opt.log);
    debug!("settings: {:#?}", opt);
    run_main(opt.validate()?)?;
    info!("done");
    Ok(())
}

fn run_main(opt: Opt) -> Result<()> {
    let config = AnalysisConfig::from_file(&opt.config)?;
    let observables = ObservableFile::read(&opt.input)
        .with_context(|| format!("Failed to read observables from {:?}", opt.input))?;
    info!("Read {} events", observables.weights().len());

    let xs_path = cross_section_path(&opt.input);
    let xs = read_cross_section(&xs_path)
        .with_context(|| format!("Failed to read cross section from {xs_path:?}"))?;

    let histograms = Histogrammer::new(&config, &observables).run(&xs)?;

    create_dir_all(&opt.outdir).with_context(|| {
        format!("Failed to create output directory {:?}", opt.outdir)
    })?;
    let outfile = opt.outdir.join(histogram_file_name(&opt.input));
    write_histograms(&outfile, &histograms)?;
    info!("Wrote {} histograms to {outfile:?}", histograms.len());
    Ok(())
}
