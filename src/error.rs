//! Configuration errors. Raised before any task is built; everything per-task lands in the summary instead.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no user provided")]
    MissingUser,
    #[error("no password provided")]
    MissingPassword,
    #[error("no project provided")]
    MissingProject,
    #[error("concurrency must be a positive integer (got {0:?})")]
    InvalidConcurrency(Option<usize>),
    #[error("manifest is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("manifest has no type row")]
    MissingTypeRow,
}
