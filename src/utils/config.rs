//! Application configuration constants.
//! Defaults and file names in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
    password_env: String,
    user_env: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            let upper = pkg.to_uppercase();
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
                password_env: format!("{upper}_PASSWORD"),
                user_env: format!("{upper}_USER"),
            }
        })
    }

    /// Optional per-directory config file read by the CLI (e.g. `.subloader.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    pub fn password_env(&self) -> &str {
        &self.password_env
    }

    pub fn user_env(&self) -> &str {
        &self.user_env
    }
}

// ---- Pipeline ----

/// CLI defaults.
pub struct PipelineDefaults;

impl PipelineDefaults {
    /// Upload workers when `--threads` is not given.
    pub const CONCURRENCY: usize = 5;
    pub const MANIFEST: &'static str = "info.csv";
    pub const BASEDIR: &'static str = "./";
    /// Root of the directory-backed platform when `--root` is not given.
    pub const PLATFORM_ROOT: &'static str = "./platform";
}

/// Error text recorded for tasks skipped after Ctrl+C.
pub const CANCELLED_MSG: &str = "cancelled before upload started";
/// Recorded for a row whose subject lookup or creation panicked.
pub const RESOLVE_PANIC_MSG: &str = "subject resolution panicked";
/// Recorded for a row whose metadata update panicked.
pub const METADATA_PANIC_MSG: &str = "metadata update panicked";

// ---- Local platform layout ----

/// File and directory names used by [`LocalPlatform`](crate::platform::LocalPlatform).
pub struct LocalLayout;

impl LocalLayout {
    pub const PROJECT_FILE: &'static str = "project.json";
    pub const SUBJECTS_DIR: &'static str = "subjects";
    pub const PARAMETERS_FILE: &'static str = "parameters.json";
}
