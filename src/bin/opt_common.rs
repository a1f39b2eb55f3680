use std::path::Path;

use anyhow::{bail, Result};
use clap::Parser;
use env_logger::Env;
use hijet::{GIT_BRANCH, GIT_REV, VERSION};
use log::info;

/// Environment variable overriding the log level
pub(crate) const LOG_ENV: &str = "HIJET_LOG";

#[derive(Debug, Clone, Parser)]
pub(crate) struct LogOpt {
    /// Verbosity level
    #[clap(
        short,
        long,
        default_value = "Info",
        help = "Verbosity level.\nPossible values with increasing amount of output are\n'off', 'error', 'warn', 'info', 'debug', 'trace'.\n"
    )]
    pub(crate) loglevel: String,
}

/// Set up logging and announce the program version
pub(crate) fn init_logging(name: &str, opt: &LogOpt) {
    let env = Env::default().filter_or(LOG_ENV, &opt.loglevel);
    env_logger::init_from_env(env);

    if let (Some(rev), Some(branch)) = (GIT_REV, GIT_BRANCH) {
        info!("{name} {VERSION} rev {rev} ({branch})");
    } else {
        info!("{name} {VERSION}");
    }
}

pub(crate) fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.is_file() {
        bail!("{what} {path:?} does not exist");
    }
    Ok(())
}
