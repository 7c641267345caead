//! Engine module: CLI surface, upload capability and progress display

pub mod arg_parser;
pub mod cli;
pub mod progress;
pub mod upload;

pub use arg_parser::Cli;
pub use cli::handle_run;
pub use upload::{GametectionUpload, MriUpload, Uploader};
