use anyhow::{Context, Result, anyhow};
use crossbeam_channel::unbounded;
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::error::ConfigError;
use crate::manifest::Manifest;
use crate::platform::Platform;
use crate::{Opts, Outcome, Summary, Task};

use super::metadata::define_parameters;
use super::queue::WorkQueue;
use super::source::{TaskSource, open_project};
use super::workers::WorkerPool;

/// Credentials, project name and worker count checked up front.
pub struct ValidatedOpts<'a> {
    pub user: &'a str,
    pub password: &'a str,
    pub project: &'a str,
    pub concurrency: usize,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Check configuration before any work starts. Errors are [`ConfigError`]s.
pub fn validate_opts(opts: &Opts) -> Result<ValidatedOpts<'_>, ConfigError> {
    let user = non_empty(&opts.user).ok_or(ConfigError::MissingUser)?;
    let password = non_empty(&opts.password).ok_or(ConfigError::MissingPassword)?;
    let project = non_empty(&opts.project).ok_or(ConfigError::MissingProject)?;
    let concurrency = match opts.concurrency {
        Some(n) if n > 0 => n,
        other => return Err(ConfigError::InvalidConcurrency(other)),
    };
    Ok(ValidatedOpts {
        user,
        password,
        project,
        concurrency,
    })
}

type OutcomeHook = Box<dyn Fn(&Outcome) + Send + Sync>;

/// Pipeline coordinator: task source → work queue → worker pool → summary.
///
/// A fresh queue and pool are built for every [`Pipeline::run`] and discarded once it returns.
pub struct Pipeline<'p> {
    platform: &'p dyn Platform,
    cancel: Arc<AtomicBool>,
    on_outcome: Option<OutcomeHook>,
}

impl<'p> Pipeline<'p> {
    pub fn new(platform: &'p dyn Platform) -> Self {
        Self {
            platform,
            cancel: Arc::new(AtomicBool::new(false)),
            on_outcome: None,
        }
    }

    /// Share a cancel flag (e.g. set from a Ctrl+C handler). Once set, no new upload starts.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Called once per outcome as it is recorded, on the collector thread.
    pub fn on_outcome<F>(mut self, f: F) -> Self
    where
        F: Fn(&Outcome) + Send + Sync + 'static,
    {
        self.on_outcome = Some(Box::new(f));
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Upload every manifest row. Only configuration, authentication, project lookup and
    /// parameter definition errors fail the call; per-row failures end up in the [`Summary`].
    pub fn run(&self, manifest: &Manifest, opts: &Opts) -> Result<Summary> {
        let valid = validate_opts(opts)?;

        let account = self
            .platform
            .authenticate(valid.user, valid.password)
            .context("authenticate")?;
        let project = open_project(&*account, valid.project)?;
        if opts.sync_metadata {
            let added = define_parameters(&*project, manifest)?;
            debug!("Defined {} new metadata parameters", added);
        }

        let queue: Arc<WorkQueue<Task>> = Arc::new(WorkQueue::new());
        let hook = self.on_outcome.as_ref();

        let outcomes = thread::scope(|s| -> Result<Vec<Outcome>> {
            let (outcome_tx, outcome_rx) = unbounded::<Outcome>();
            let collector = s.spawn(move || {
                let mut outcomes = Vec::new();
                for outcome in outcome_rx.iter() {
                    if let Some(f) = hook {
                        f(&outcome);
                    }
                    outcomes.push(outcome);
                }
                outcomes
            });

            let pool = WorkerPool::start(
                valid.concurrency,
                Arc::clone(&queue),
                &outcome_tx,
                Arc::clone(&self.cancel),
            )?;

            let mut source = TaskSource::new(project, manifest, &opts.basedir, opts.data_kind)
                .with_metadata_sync(opts.sync_metadata);
            let mut enqueued = 0_usize;
            loop {
                if self.cancel.load(Ordering::Relaxed) {
                    let skipped = source.cancel_remaining();
                    warn!("Cancelled: {} rows not enqueued", skipped.len());
                    for outcome in skipped {
                        let _ = outcome_tx.send(outcome);
                    }
                    break;
                }
                match source.next() {
                    Some(task) => {
                        queue.push(task);
                        enqueued += 1;
                    }
                    None => break,
                }
            }
            debug!(
                "Enqueued {} tasks ({} distinct subjects)",
                enqueued,
                source.resolved_subjects()
            );

            queue.wait_until_drained();
            pool.shutdown()?;
            drop(outcome_tx);
            collector
                .join()
                .map_err(|_| anyhow!("outcome collector panicked"))
        })?;

        let summary = Summary::from_outcomes(outcomes);
        info!(
            "Uploaded {} of {} files ({} failed)",
            summary.succeeded,
            summary.total(),
            summary.failed
        );
        Ok(summary)
    }
}
