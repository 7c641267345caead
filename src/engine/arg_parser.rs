use clap::Parser;
use std::path::PathBuf;

use crate::DataKind;
use crate::utils::config::PipelineDefaults;

/// Upload subjects data & metadata to the data platform.
#[derive(Clone, Parser)]
#[command(name = "subloader")]
#[command(about = "Upload subjects data & metadata listed in a CSV manifest.")]
pub struct Cli {
    /// CSV manifest: File, Subject, then metadata columns; the first row holds column types.
    #[arg(long = "info", short = 'i', value_name = "CSV", default_value = PipelineDefaults::MANIFEST)]
    pub info_file: PathBuf,

    /// Directory the manifest's File entries are relative to. Default: `./`.
    #[arg(long = "dir", short = 'd', value_name = "DIR")]
    pub basedir: Option<PathBuf>,

    /// Platform user (or SUBLOADER_USER / .env).
    #[arg(long, short = 'u')]
    pub user: Option<String>,

    /// Platform password (or SUBLOADER_PASSWORD / .env / prompt).
    #[arg(long, short = 'p')]
    pub password: Option<String>,

    /// Name of the project to upload into.
    #[arg(long, short = 'j')]
    pub project: Option<String>,

    /// Kind of data in the manifest's files.
    #[arg(long = "type", short = 't', value_enum)]
    pub data_type: Option<DataKind>,

    /// Number of concurrent upload workers. Default: 5.
    #[arg(long, short = 'n', value_parser = clap::value_parser!(usize))]
    pub threads: Option<usize>,

    /// Root directory of the local platform store. Default: `./platform`.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Define metadata parameters on the project and copy each row's metadata to its subject.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub sync_metadata: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

impl Cli {
    /// Directory holding the manifest; `.subloader.toml` and `.env` are looked up here.
    pub fn manifest_dir(&self) -> PathBuf {
        self.info_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
