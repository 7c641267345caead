//! Load `.subloader.toml` from the manifest's directory (CLI only). Lib callers build [`Opts`] themselves.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::utils::config::PackagePaths;
use crate::{DataKind, Opts};

#[derive(Debug, Default, Deserialize)]
pub struct SubloaderToml {
    #[serde(default)]
    settings: UploadSection,
}

#[derive(Debug, Default, Deserialize)]
struct UploadSection {
    user: Option<String>,
    project: Option<String>,
    basedir: Option<String>,
    #[serde(rename = "type")]
    data_type: Option<String>,
    threads: Option<usize>,
    sync_metadata: Option<bool>,
    verbose: Option<bool>,
    /// Root of the directory-backed platform.
    root: Option<String>,
}

impl SubloaderToml {
    pub fn root(&self) -> Option<PathBuf> {
        self.settings.root.as_ref().map(PathBuf::from)
    }
}

/// Load the config file from `dir`. `Ok(None)` when there is no readable file; a malformed file is an error.
pub fn load_subloader_toml(dir: &Path) -> Result<Option<SubloaderToml>> {
    let path = dir.join(PackagePaths::get().config_filename());
    let Ok(s) = std::fs::read_to_string(&path) else {
        return Ok(None);
    };
    toml::from_str(&s)
        .map(Some)
        .with_context(|| format!("parse {}", path.display()))
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
/// Passwords are never read from the file.
pub fn apply_file_to_opts(file: &SubloaderToml, opts: &mut Opts) {
    let sec = &file.settings;
    if sec.user.is_some() {
        opts.user = sec.user.clone();
    }
    if sec.project.is_some() {
        opts.project = sec.project.clone();
    }
    if let Some(ref d) = sec.basedir {
        opts.basedir = PathBuf::from(d);
    }
    if let Some(ref t) = sec.data_type {
        opts.data_kind = DataKind::from(t.as_str());
    }
    if sec.threads.is_some() {
        opts.concurrency = sec.threads;
    }
    apply_file_opt!(sec, opts, sync_metadata => sync_metadata);
    apply_file_opt!(sec, opts, verbose => verbose);
}
