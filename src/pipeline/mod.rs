//! Pipeline components: task source, work queue, worker pool, coordinator.

pub mod error_handler;
pub mod metadata;
pub mod orchestrator;
pub mod queue;
pub mod source;
pub mod workers;

pub use error_handler::report_failures;
pub use metadata::{apply_row_metadata, define_parameters};
pub use orchestrator::{Pipeline, ValidatedOpts, validate_opts};
pub use queue::{Claim, WorkQueue};
pub use source::{TaskSource, open_project};
pub use workers::WorkerPool;
