//! Subloader: upload subject data files listed in a CSV manifest with a bounded worker pool

pub mod engine;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod platform;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use error::ConfigError;
pub use manifest::Manifest;
pub use pipeline::Pipeline;

use log::debug;
use std::path::Path;

use platform::Platform;

/// Result alias used by public subloader API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: read the manifest at `manifest_path` and upload every row to `platform`.
///
/// Configuration is checked before the manifest is read, so a missing user, password or project
/// (or a non-positive concurrency) fails with a [`ConfigError`] and nothing is enqueued. Per-row
/// failures do not fail the call; they are listed in the returned [`Summary`].
///
/// ```ignore
/// let platform = subloader::platform::LocalPlatform::new("/srv/staging");
/// let opts = subloader::Opts {
///     user: Some("alice".into()),
///     password: Some("secret".into()),
///     project: Some("Study A".into()),
///     basedir: "data".into(),
///     concurrency: Some(5),
///     ..Default::default()
/// };
/// let summary = subloader::upload_manifest(&platform, "info.csv".as_ref(), &opts)?;
/// ```
pub fn upload_manifest(
    platform: &dyn Platform,
    manifest_path: &Path,
    opts: &Opts,
) -> Result<Summary> {
    pipeline::validate_opts(opts)?;
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    let manifest = Manifest::from_path(manifest_path)?;
    Pipeline::new(platform).run(&manifest, opts)
}
