use std::path::{Path, PathBuf};
use std::sync::Mutex;

use subloader::engine::{GametectionUpload, MriUpload, Uploader};
use subloader::pipeline::validate_opts;
use subloader::platform::{Parameters, SubjectHandle};
use subloader::{ConfigError, DataKind, Failure, Opts, Outcome, Summary};

// --- DataKind ---

#[test]
fn test_data_kind_from_str_defaults_to_mri() {
    assert_eq!(DataKind::from("gametection"), DataKind::Gametection);
    assert_eq!(DataKind::from(" Gametection "), DataKind::Gametection);
    assert_eq!(DataKind::from("mri"), DataKind::Mri);
    assert_eq!(DataKind::from("eeg"), DataKind::Mri);
    assert_eq!(DataKind::from(""), DataKind::Mri);
}

#[test]
fn test_data_kind_display() {
    assert_eq!(DataKind::Mri.to_string(), "mri");
    assert_eq!(DataKind::Gametection.to_string(), "gametection");
    assert_eq!(DataKind::default(), DataKind::Mri);
}

/// Subject that records which upload operation was invoked.
struct RecordingSubject(Mutex<Vec<&'static str>>);

impl SubjectHandle for RecordingSubject {
    fn name(&self) -> &str {
        "S1"
    }
    fn parameters(&self) -> anyhow::Result<Parameters> {
        Ok(Parameters::new())
    }
    fn set_parameters(&self, _: &Parameters) -> anyhow::Result<()> {
        Ok(())
    }
    fn upload_mri(&self, _: &Path) -> anyhow::Result<()> {
        self.0.lock().unwrap().push("mri");
        Ok(())
    }
    fn upload_gametection(&self, _: &Path) -> anyhow::Result<()> {
        self.0.lock().unwrap().push("gametection");
        Ok(())
    }
}

#[test]
fn test_data_kind_selects_uploader() {
    let subject = RecordingSubject(Mutex::new(Vec::new()));
    let file = Path::new("a.dat");
    DataKind::Gametection.uploader().upload(&subject, file).unwrap();
    DataKind::Mri.uploader().upload(&subject, file).unwrap();
    MriUpload.upload(&subject, file).unwrap();
    GametectionUpload.upload(&subject, file).unwrap();
    assert_eq!(
        *subject.0.lock().unwrap(),
        vec!["gametection", "mri", "mri", "gametection"]
    );
}

// --- Summary ---

fn outcome(subject: &str, result: Result<(), &str>) -> Outcome {
    Outcome {
        subject_name: subject.into(),
        file_path: PathBuf::from(format!("/d/{subject}.dat")),
        result: result.map_err(str::to_string),
    }
}

#[test]
fn test_summary_counts_and_keeps_failure_order() {
    let summary = Summary::from_outcomes(vec![
        outcome("S1", Ok(())),
        outcome("S2", Err("boom")),
        outcome("S3", Ok(())),
        outcome("S4", Err("bang")),
    ]);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.total(), 4);
    assert!(!summary.is_success());
    assert_eq!(
        summary.failures,
        vec![
            Failure {
                subject_name: "S2".into(),
                file_path: PathBuf::from("/d/S2.dat"),
                error: "boom".into(),
            },
            Failure {
                subject_name: "S4".into(),
                file_path: PathBuf::from("/d/S4.dat"),
                error: "bang".into(),
            },
        ]
    );
}

#[test]
fn test_empty_summary_is_success() {
    let summary = Summary::from_outcomes(Vec::new());
    assert!(summary.is_success());
    assert_eq!(summary.total(), 0);
}

// --- validate_opts ---

fn full_opts() -> Opts {
    Opts {
        user: Some("alice".into()),
        password: Some("secret".into()),
        project: Some("Study A".into()),
        concurrency: Some(5),
        ..Default::default()
    }
}

#[test]
fn test_validate_opts_accepts_complete_config() {
    let opts = full_opts();
    let valid = validate_opts(&opts).unwrap();
    assert_eq!(valid.user, "alice");
    assert_eq!(valid.project, "Study A");
    assert_eq!(valid.concurrency, 5);
}

#[test]
fn test_validate_opts_trims_and_rejects_blank_project() {
    let mut opts = full_opts();
    opts.project = Some("  ".into());
    assert_eq!(validate_opts(&opts).err(), Some(ConfigError::MissingProject));
}

#[test]
fn test_validate_opts_checks_credentials_first() {
    let opts = Opts {
        concurrency: Some(0),
        ..Default::default()
    };
    assert_eq!(validate_opts(&opts).err(), Some(ConfigError::MissingUser));
}

#[test]
fn test_opts_debug_redacts_password() {
    let rendered = format!("{:?}", full_opts());
    assert!(rendered.contains("<redacted>"));
    assert!(!rendered.contains("secret"));
}
