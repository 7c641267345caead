//! CLI command handler: resolve options (defaults < .subloader.toml < flags), then run the pipeline.

use anyhow::{Context, Result};
use colored::Colorize;
use kdam::Animation;
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::arg_parser::Cli;
use crate::engine::progress::{ProgressBarConfig, create_progress_bar, outcome_progress};
use crate::manifest::Manifest;
use crate::pipeline::{Pipeline, report_failures, validate_opts};
use crate::platform::LocalPlatform;
use crate::utils::config::PipelineDefaults;
use crate::utils::subloader_toml::{apply_file_to_opts, load_subloader_toml};
use crate::utils::{get_password, get_user, setup_logging};
use crate::{Opts, Summary};

/// Build Opts and the platform root from defaults, the config file, the environment and flags.
fn setup_opts(cli: &Cli) -> Result<(Opts, PathBuf)> {
    let dir = cli.manifest_dir();
    let (file, file_err) = match load_subloader_toml(&dir) {
        Ok(file) => (file, None),
        Err(e) => (None, Some(e)),
    };

    let mut opts = Opts {
        basedir: PathBuf::from(PipelineDefaults::BASEDIR),
        concurrency: Some(PipelineDefaults::CONCURRENCY),
        ..Default::default()
    };
    if let Some(ref f) = file {
        apply_file_to_opts(f, &mut opts);
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    setup_logging(opts.verbose);
    if let Some(e) = file_err {
        warn!("Ignoring config file: {:#}", e);
    }

    if let Some(ref d) = cli.basedir {
        opts.basedir = d.clone();
    }
    if cli.project.is_some() {
        opts.project = cli.project.clone();
    }
    if let Some(kind) = cli.data_type {
        opts.data_kind = kind;
    }
    if cli.threads.is_some() {
        opts.concurrency = cli.threads;
    }
    if let Some(v) = cli.sync_metadata {
        opts.sync_metadata = v;
    }
    opts.user = get_user(cli.user.clone().or(opts.user.take()), &dir);
    opts.password = get_password(cli.password.clone(), &dir, opts.user.as_deref())?;

    let root = cli
        .root
        .clone()
        .or_else(|| file.as_ref().and_then(|f| f.root()))
        .unwrap_or_else(|| PathBuf::from(PipelineDefaults::PLATFORM_ROOT));
    Ok((opts, root))
}

fn print_summary(summary: &Summary) {
    let line = format!(
        "{} | {}",
        format!("Uploaded: {}", summary.succeeded).green(),
        format!("Failed: {}", summary.failed).red()
    );
    println!("{}", line);
}

/// Run the upload. Returns the summary; the binary maps `failed > 0` to a non-zero exit status.
pub fn handle_run(cli: &Cli) -> Result<Summary> {
    let (opts, root) = setup_opts(cli)?;
    validate_opts(&opts)?;
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );

    let manifest = Manifest::from_path(&cli.info_file)?;
    debug!("Manifest has {} data rows", manifest.len());

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_handler = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        cancel_handler.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;

    let platform = LocalPlatform::new(root);
    let mut pipeline = Pipeline::new(&platform).with_cancel(Arc::clone(&cancel));
    if opts.verbose {
        let bar = create_progress_bar(ProgressBarConfig::new(
            manifest.len(),
            "Uploading",
            Animation::Classic,
        ));
        pipeline = pipeline.on_outcome(outcome_progress(&bar));
    }

    let summary = pipeline.run(&manifest, &opts)?;
    if opts.verbose {
        eprintln!();
    }
    print_summary(&summary);
    report_failures(&summary);
    if cancel.load(Ordering::Relaxed) {
        warn!("Upload cancelled by user; rows not started are listed as failed");
    }
    Ok(summary)
}
