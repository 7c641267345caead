//! Upload worker pool: N threads sharing one [`WorkQueue`].

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::Sender;
use log::{debug, error, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::error::ConfigError;
use crate::utils::config::CANCELLED_MSG;
use crate::{Outcome, Task};

use super::queue::WorkQueue;

/// Run one task to an outcome. Never panics outward and never returns without an outcome.
fn process_task(task: &Task, cancel: &AtomicBool) -> Outcome {
    if cancel.load(Ordering::Relaxed) {
        return Outcome::failure(task, CANCELLED_MSG);
    }
    let subject = match &task.subject {
        Ok(subject) => subject,
        Err(e) => return Outcome::failure(task, e.clone()),
    };
    debug!(
        "Uploading {} data for subject {}: {}",
        task.data_kind,
        task.subject_name,
        task.file_path.display()
    );
    let uploader = task.data_kind.uploader();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        uploader.upload(&**subject, &task.file_path)
    }));
    match result {
        Ok(Ok(())) => Outcome::success(task),
        Ok(Err(e)) => {
            warn!(
                "Upload failed for subject {} ({}): {:#}",
                task.subject_name,
                task.file_path.display(),
                e
            );
            Outcome::failure(task, format!("{e:#}"))
        }
        Err(_) => {
            error!(
                "Upload panicked for subject {} ({})",
                task.subject_name,
                task.file_path.display()
            );
            Outcome::failure(task, "upload panicked")
        }
    }
}

/// Single worker: pop, process, record, acknowledge. Exits when the queue is closed and empty.
fn upload_worker_loop(
    queue: Arc<WorkQueue<Task>>,
    outcome_tx: Sender<Outcome>,
    cancel: Arc<AtomicBool>,
) {
    while let Some(task) = queue.pop() {
        let outcome = process_task(&task, &cancel);
        // Record before acknowledging so a drained queue implies every outcome was sent.
        let _ = outcome_tx.send(outcome);
        task.complete();
    }
    drop(outcome_tx);
}

/// Fixed-size pool of upload workers.
pub struct WorkerPool {
    queue: Arc<WorkQueue<Task>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn exactly `num_workers` workers on `queue`. Each sends one [`Outcome`] per task on
    /// `outcome_tx`. Once `cancel` is set, workers record remaining tasks as cancelled instead of
    /// uploading them.
    pub fn start(
        num_workers: usize,
        queue: Arc<WorkQueue<Task>>,
        outcome_tx: &Sender<Outcome>,
        cancel: Arc<AtomicBool>,
    ) -> Result<Self> {
        if num_workers == 0 {
            return Err(ConfigError::InvalidConcurrency(Some(num_workers)).into());
        }
        let mut pool = WorkerPool {
            queue: Arc::clone(&queue),
            handles: Vec::with_capacity(num_workers),
        };
        for i in 0..num_workers {
            let queue = Arc::clone(&queue);
            let outcome_tx = outcome_tx.clone();
            let cancel = Arc::clone(&cancel);
            let spawned = thread::Builder::new()
                .name(format!("upload-worker-{i}"))
                .spawn(move || upload_worker_loop(queue, outcome_tx, cancel))
                .with_context(|| format!("spawn upload worker {i}"));
            match spawned {
                Ok(handle) => pool.handles.push(handle),
                Err(e) => {
                    let _ = pool.shutdown();
                    return Err(e);
                }
            }
        }
        debug!("Started {} upload workers", num_workers);
        Ok(pool)
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Close the queue and join every worker. Workers finish whatever is still queued first.
    pub fn shutdown(mut self) -> Result<()> {
        self.queue.close();
        let mut panicked = 0;
        for h in std::mem::take(&mut self.handles) {
            if h.join().is_err() {
                panicked += 1;
            }
        }
        if panicked > 0 {
            return Err(anyhow!("{panicked} upload worker(s) panicked"));
        }
        Ok(())
    }
}

/// A pool dropped without [`WorkerPool::shutdown`] (e.g. while unwinding) still closes the queue,
/// so workers exit once it is empty and release their outcome senders.
impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.queue.close();
    }
}
