use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Init the global logger. Our crate logs at Info (Debug with `verbose`); dependencies only warn.
/// Records from upload workers are tagged with the worker's thread name.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME").cyan();
            let thread = std::thread::current();
            let worker = thread
                .name()
                .filter(|n| n.starts_with("upload-worker"))
                .map(|n| format!(" {}", n.dimmed()))
                .unwrap_or_default();
            let tag = match record.level() {
                Level::Error => format!(" {}", "ERROR".red()),
                Level::Warn => format!(" {}", "WARN".yellow()),
                Level::Debug | Level::Trace => format!(" {}", "DEBUG".white()),
                Level::Info => String::new(),
            };
            let line = format!("[{}{}{}] {}", name, tag, worker, record.args());
            writeln!(buf, "{}", line)
        })
        .try_init();
}
