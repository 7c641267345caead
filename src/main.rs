//! Subloader CLI: upload every file in a CSV manifest to its subject on the data platform.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;
use subloader::engine::arg_parser::Cli;
use subloader::engine::handle_run;

fn main() -> Result<ExitCode> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let summary = handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
