//! Upload capability per data kind.

use anyhow::Result;
use std::path::Path;

use crate::DataKind;
use crate::platform::SubjectHandle;

/// Sends one file to a subject.
pub trait Uploader: Send + Sync {
    fn upload(&self, subject: &dyn SubjectHandle, file: &Path) -> Result<()>;
}

pub struct MriUpload;

impl Uploader for MriUpload {
    fn upload(&self, subject: &dyn SubjectHandle, file: &Path) -> Result<()> {
        subject.upload_mri(file)
    }
}

pub struct GametectionUpload;

impl Uploader for GametectionUpload {
    fn upload(&self, subject: &dyn SubjectHandle, file: &Path) -> Result<()> {
        subject.upload_gametection(file)
    }
}

impl DataKind {
    pub fn uploader(&self) -> &'static dyn Uploader {
        match self {
            DataKind::Gametection => &GametectionUpload,
            DataKind::Mri => &MriUpload,
        }
    }
}
