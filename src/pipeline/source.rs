//! Task source: manifest rows → tasks, resolving each subject once per distinct name.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::manifest::{Manifest, ManifestRow};
use crate::platform::{Account, Project, resolve_project_id};
use crate::utils::config::{CANCELLED_MSG, METADATA_PANIC_MSG, RESOLVE_PANIC_MSG};
use crate::{DataKind, Outcome, Resolution, Task};

use super::metadata::apply_row_metadata;

/// Open the project named `name` on `account`. Failure here aborts the run before any task exists.
pub fn open_project(account: &dyn Account, name: &str) -> Result<Arc<dyn Project>> {
    let id = resolve_project_id(account, name)?;
    debug!("Project `{}` has id {}", name, id);
    account
        .open_project(&id)
        .with_context(|| format!("open project `{name}`"))
}

/// Lazy iterator of [`Task`]s, one per manifest data row, in manifest order.
///
/// Subjects are fetched (or created) the first time their name is seen and the handle, or the
/// error, is reused for later rows with the same name. Workers never create subjects.
pub struct TaskSource<'a> {
    project: Arc<dyn Project>,
    rows: std::slice::Iter<'a, ManifestRow>,
    basedir: PathBuf,
    data_kind: DataKind,
    sync_metadata: bool,
    resolved: HashMap<String, Resolution>,
}

impl<'a> TaskSource<'a> {
    pub fn new(
        project: Arc<dyn Project>,
        manifest: &'a Manifest,
        basedir: &Path,
        data_kind: DataKind,
    ) -> Self {
        Self {
            project,
            rows: manifest.rows().iter(),
            basedir: basedir.to_path_buf(),
            data_kind,
            sync_metadata: false,
            resolved: HashMap::new(),
        }
    }

    /// Copy each row's metadata onto its subject while resolving.
    pub fn with_metadata_sync(mut self, enabled: bool) -> Self {
        self.sync_metadata = enabled;
        self
    }

    /// Distinct subject names resolved so far.
    pub fn resolved_subjects(&self) -> usize {
        self.resolved.len()
    }

    /// Stop producing: every row not yet turned into a task becomes a cancelled outcome.
    pub fn cancel_remaining(&mut self) -> Vec<Outcome> {
        let basedir = &self.basedir;
        self.rows
            .by_ref()
            .map(|row| Outcome {
                subject_name: row.subject.clone(),
                file_path: basedir.join(&row.file),
                result: Err(CANCELLED_MSG.to_string()),
            })
            .collect()
    }

    fn resolve(&mut self, name: &str) -> Resolution {
        if name.is_empty() {
            return Err("empty subject name".to_string());
        }
        if let Some(cached) = self.resolved.get(name) {
            return cached.clone();
        }
        let project = &self.project;
        let resolution =
            match panic::catch_unwind(AssertUnwindSafe(|| project.fetch_or_create_subject(name))) {
                Ok(fetched) => fetched.map_err(|e| format!("resolve subject `{name}`: {e:#}")),
                Err(_) => Err(RESOLVE_PANIC_MSG.to_string()),
            };
        match &resolution {
            Ok(_) => debug!("Resolved subject: {}", name),
            Err(e) => warn!("{}", e),
        }
        self.resolved.insert(name.to_string(), resolution.clone());
        resolution
    }

    fn build(&mut self, row: &ManifestRow) -> Task {
        let subject = match self.resolve(&row.subject) {
            Ok(handle) if self.sync_metadata => {
                let applied =
                    panic::catch_unwind(AssertUnwindSafe(|| apply_row_metadata(&*handle, row)));
                match applied {
                    Ok(Ok(())) => Ok(handle),
                    Ok(Err(e)) => {
                        warn!(
                            "Metadata for subject {} (row {}): {:#}",
                            row.subject, row.index, e
                        );
                        Err(format!("update metadata for `{}`: {e:#}", row.subject))
                    }
                    Err(_) => {
                        warn!("Metadata update panicked for subject {}", row.subject);
                        Err(METADATA_PANIC_MSG.to_string())
                    }
                }
            }
            other => other,
        };
        Task {
            subject_name: row.subject.clone(),
            file_path: self.basedir.join(&row.file),
            data_kind: self.data_kind,
            subject,
        }
    }
}

impl Iterator for TaskSource<'_> {
    type Item = Task;

    fn next(&mut self) -> Option<Task> {
        let row = self.rows.next()?;
        Some(self.build(row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}
