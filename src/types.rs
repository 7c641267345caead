//! Public and internal types for the subloader API and pipeline.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::platform::SubjectHandle;

/// Kind of data a manifest uploads. Selects which upload operation runs on the subject.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum DataKind {
    #[default]
    Mri,
    Gametection,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Mri => "mri",
            DataKind::Gametection => "gametection",
        }
    }
}

/// Lenient parse for config files: `gametection` selects the gametection path, anything else is MRI.
impl From<&str> for DataKind {
    fn from(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("gametection") {
            DataKind::Gametection
        } else {
            DataKind::Mri
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subject handle fetched (or created) before the task was built, or the reason it could not be.
pub type Resolution = std::result::Result<Arc<dyn SubjectHandle>, String>;

/// One file upload bound to a subject. Built by the task source, never mutated afterwards.
#[derive(Clone)]
pub struct Task {
    pub subject_name: String,
    pub file_path: PathBuf,
    pub data_kind: DataKind,
    pub subject: Resolution,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("subject_name", &self.subject_name)
            .field("file_path", &self.file_path)
            .field("data_kind", &self.data_kind)
            .field("resolved", &self.subject.is_ok())
            .finish()
    }
}

/// Result of processing one task.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub subject_name: String,
    pub file_path: PathBuf,
    pub result: std::result::Result<(), String>,
}

impl Outcome {
    pub fn success(task: &Task) -> Self {
        Self {
            subject_name: task.subject_name.clone(),
            file_path: task.file_path.clone(),
            result: Ok(()),
        }
    }

    pub fn failure(task: &Task, error: impl Into<String>) -> Self {
        Self {
            subject_name: task.subject_name.clone(),
            file_path: task.file_path.clone(),
            result: Err(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Diagnostics for a failed task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub subject_name: String,
    pub file_path: PathBuf,
    pub error: String,
}

/// Aggregate result of a run. `failures` keeps the order outcomes were recorded in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<Failure>,
}

impl Summary {
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = Outcome>,
    {
        let mut summary = Summary::default();
        for outcome in outcomes {
            match outcome.result {
                Ok(()) => summary.succeeded += 1,
                Err(error) => {
                    summary.failed += 1;
                    summary.failures.push(Failure {
                        subject_name: outcome.subject_name,
                        file_path: outcome.file_path,
                        error,
                    });
                }
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Full run options (CLI and lib).
#[derive(Clone, Default)]
pub struct Opts {
    /// Platform account user.
    pub user: Option<String>,
    /// Platform account password.
    pub password: Option<String>,
    /// Human-readable name of the target project.
    pub project: Option<String>,
    /// Directory that manifest `File` entries are relative to.
    pub basedir: PathBuf,
    /// Which upload operation runs for every row.
    pub data_kind: DataKind,
    /// Number of upload workers. Must be positive; `None` is a configuration error.
    pub concurrency: Option<usize>,
    /// Define metadata parameters and copy each row's metadata onto its subject before uploading.
    pub sync_metadata: bool,
    /// Show progress bar (verbose mode).
    pub verbose: bool,
}

impl fmt::Debug for Opts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opts")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("project", &self.project)
            .field("basedir", &self.basedir)
            .field("data_kind", &self.data_kind)
            .field("concurrency", &self.concurrency)
            .field("sync_metadata", &self.sync_metadata)
            .field("verbose", &self.verbose)
            .finish()
    }
}
