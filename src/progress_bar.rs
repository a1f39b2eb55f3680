pub use crate::traits::Progress;

use log::LevelFilter;

impl Progress for indicatif::ProgressBar {
    fn inc(&self, i: u64) {
        indicatif::ProgressBar::inc(self, i)
    }

    fn finish(&self) {
        indicatif::ProgressBar::finish(self)
    }
}

impl Progress for logbar::ProgressBar {
    fn inc(&self, i: u64) {
        logbar::ProgressBar::inc(self, i as usize)
    }

    fn finish(&self) {
        logbar::ProgressBar::finish(self)
    }
}

/// Dummy progress indicator
#[derive(Debug, Copy, Clone, Default)]
pub struct NoProgress {}

impl Progress for NoProgress {
    fn inc(&self, _i: u64) {}

    fn finish(&self) {}
}

/// Don't show any progress indicator
pub const NO_PROGRESS: NoProgress = NoProgress {};

const BAR_TEMPLATE: &str = "{bar:60.cyan/cyan} {msg} {pos}/{len} [{elapsed}]";

/// Progress bar for the event loop
///
/// On an interactive terminal this is an `indicatif` bar, otherwise a
/// `logbar` one. No bar is shown unless the log level is exactly `info`,
/// and logging is suspended while the bar is active.
pub struct ProgressBar {
    bar: Box<dyn Progress + Send + Sync>,
    /// Log level to restore when the bar is finished
    suspended_level: Option<LevelFilter>,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self {
            bar: Box::new(NO_PROGRESS),
            suspended_level: None,
        }
    }
}

impl Progress for ProgressBar {
    fn inc(&self, i: u64) {
        self.bar.inc(i);
    }

    fn finish(&self) {
        self.bar.finish();
        if let Some(level) = self.suspended_level {
            log::set_max_level(level);
        }
    }
}

impl ProgressBar {
    /// A new progress bar with the given maximum progress and message
    pub fn new(len: u64, message: &str) -> Self {
        if log::max_level() != LevelFilter::Info {
            ProgressBar::default()
        } else if console::Term::stderr().features().is_attended() {
            ProgressBar::indicatif(len, message)
        } else {
            ProgressBar::logbar(len, message)
        }
    }

    fn indicatif(len: u64, message: &str) -> Self {
        let bar = indicatif::ProgressBar::new(len);
        match indicatif::ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            Ok(style) => bar.set_style(style),
            Err(err) => log::debug!("Failed to set progress bar style: {err}"),
        }
        bar.set_message(message.to_owned());
        Self::suspend_logging(Box::new(bar))
    }

    fn logbar(len: u64, message: &str) -> Self {
        let style = logbar::Style::new().indicator('█');
        eprintln!("{message}");
        let bar = logbar::ProgressBar::with_style(len as usize, style);
        Self::suspend_logging(Box::new(bar))
    }

    // log output would overwrite the bar
    fn suspend_logging(bar: Box<dyn Progress + Send + Sync>) -> Self {
        let level = log::max_level();
        log::set_max_level(LevelFilter::Off);
        Self {
            bar,
            suspended_level: Some(level),
        }
    }
}
