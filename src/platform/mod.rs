//! Remote data platform client interface.
//!
//! The pipeline only talks to the platform through these traits. [`LocalPlatform`] is the
//! directory-backed implementation the CLI ships with; other transports implement the same traits.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

pub mod local;

pub use local::LocalPlatform;

/// Metadata values of one subject, keyed by parameter name.
pub type Parameters = BTreeMap<String, String>;

/// Project listing entry: opaque id plus the human-readable name users pass on the command line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: String,
    pub name: String,
}

/// Definition of a metadata parameter on a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDef {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub visible: bool,
}

/// Entry point: turns credentials into an account.
pub trait Platform: Send + Sync {
    fn authenticate(&self, user: &str, password: &str) -> Result<Box<dyn Account>>;
}

/// An authenticated account.
pub trait Account: Send + Sync {
    fn projects(&self) -> Result<Vec<ProjectInfo>>;
    fn open_project(&self, id: &str) -> Result<Arc<dyn Project>>;
}

/// A project: owns subjects and metadata parameter definitions.
pub trait Project: Send + Sync {
    fn list_subjects(&self) -> Result<Vec<String>>;
    /// `Ok(None)` when no subject has that name.
    fn get_subject(&self, name: &str) -> Result<Option<Arc<dyn SubjectHandle>>>;
    /// Creates a subject. Fails if it already exists.
    fn add_subject(&self, name: &str) -> Result<Arc<dyn SubjectHandle>>;
    fn metadata_parameters(&self) -> Result<Vec<ParameterDef>>;
    fn add_metadata_parameter(&self, def: &ParameterDef) -> Result<()>;

    /// Fetch the subject, creating it when absent.
    fn fetch_or_create_subject(&self, name: &str) -> Result<Arc<dyn SubjectHandle>> {
        match self.get_subject(name)? {
            Some(subject) => Ok(subject),
            None => self.add_subject(name),
        }
    }
}

/// A subject resource. Shared read-only across workers.
pub trait SubjectHandle: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Result<Parameters>;
    fn set_parameters(&self, parameters: &Parameters) -> Result<()>;
    fn upload_mri(&self, file: &Path) -> Result<()>;
    fn upload_gametection(&self, file: &Path) -> Result<()>;
}

/// Look up a project's id by its human-readable name. First match wins.
pub fn resolve_project_id(account: &dyn Account, name: &str) -> Result<String> {
    account
        .projects()?
        .into_iter()
        .find(|p| p.name == name)
        .map(|p| p.id)
        .ok_or_else(|| anyhow!("project `{name}` not found on this account"))
}
