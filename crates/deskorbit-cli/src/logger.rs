//! `env_logger` setup rendering records with colored severity tags

use std::io::Write;

use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter};

fn tag(level: Level) -> ColoredString {
    match level {
        Level::Error => "[ERROR]".red(),
        Level::Warn => "[WARN]".yellow(),
        Level::Info => "[INFO]".blue(),
        Level::Debug => "[DEBUG]".dimmed(),
        Level::Trace => "[TRACE]".dimmed(),
    }
}

fn level_filter(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn builder(verbose: bool) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_filter(verbose))
        .format(|buf, record| writeln!(buf, "{} {}", tag(record.level()), record.args()));
    builder
}

/// Install the console logger (first call wins)
pub fn init(verbose: bool) {
    let _ = builder(verbose).try_init();
}
