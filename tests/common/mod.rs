//! In-memory platform for pipeline tests: counts subject lookups, tracks concurrent uploads,
//! and fails uploads or subject creation for chosen subject names.

#![allow(dead_code)]

use anyhow::{Result, anyhow, bail};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use subloader::DataKind;
use subloader::manifest::Manifest;
use subloader::platform::{
    Account, ParameterDef, Parameters, Platform, Project, ProjectInfo, SubjectHandle,
};

pub const PROJECT_NAME: &str = "Study A";
pub const PROJECT_ID: &str = "p-1";

#[derive(Default)]
pub struct MockState {
    pub unreachable: bool,
    pub fail_upload: HashSet<String>,
    pub fail_resolve: HashSet<String>,
    pub panic_resolve: HashSet<String>,
    pub panic_set_parameters: HashSet<String>,
    pub upload_delay: Duration,
    pub subjects: Mutex<HashMap<String, Parameters>>,
    pub lookups: Mutex<HashMap<String, usize>>,
    pub parameter_defs: Mutex<Vec<ParameterDef>>,
    pub uploads: Mutex<Vec<(String, PathBuf, DataKind)>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub authenticated: AtomicUsize,
}

impl MockState {
    pub fn lookups_for(&self, name: &str) -> usize {
        self.lookups.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn subject_params(&self, name: &str) -> Option<Parameters> {
        self.subjects.lock().unwrap().get(name).cloned()
    }
}

pub struct MockPlatform {
    pub state: Arc<MockState>,
}

impl MockPlatform {
    pub fn new(state: MockState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    pub fn ok() -> Self {
        Self::new(MockState::default())
    }

    pub fn failing_uploads(names: &[&str]) -> Self {
        Self::new(MockState {
            fail_upload: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self::new(MockState {
            upload_delay: delay,
            ..Default::default()
        })
    }
}

impl Platform for MockPlatform {
    fn authenticate(&self, user: &str, password: &str) -> Result<Box<dyn Account>> {
        if user.is_empty() || password.is_empty() {
            bail!("bad credentials");
        }
        self.state.authenticated.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockAccount {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockAccount {
    state: Arc<MockState>,
}

impl Account for MockAccount {
    fn projects(&self) -> Result<Vec<ProjectInfo>> {
        if self.state.unreachable {
            bail!("connection refused");
        }
        Ok(vec![
            ProjectInfo {
                id: "p-0".into(),
                name: "Other".into(),
            },
            ProjectInfo {
                id: PROJECT_ID.into(),
                name: PROJECT_NAME.into(),
            },
        ])
    }

    fn open_project(&self, id: &str) -> Result<Arc<dyn Project>> {
        if id != PROJECT_ID {
            bail!("unexpected project id {id}");
        }
        Ok(Arc::new(MockProject {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockProject {
    state: Arc<MockState>,
}

impl MockProject {
    fn handle(&self, name: &str) -> Arc<dyn SubjectHandle> {
        Arc::new(MockSubject {
            name: name.to_string(),
            state: Arc::clone(&self.state),
        })
    }
}

impl Project for MockProject {
    fn list_subjects(&self) -> Result<Vec<String>> {
        Ok(self.state.subjects.lock().unwrap().keys().cloned().collect())
    }

    fn get_subject(&self, name: &str) -> Result<Option<Arc<dyn SubjectHandle>>> {
        *self
            .state
            .lookups
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default() += 1;
        if self.state.fail_resolve.contains(name) {
            bail!("subject service unavailable");
        }
        if self.state.panic_resolve.contains(name) {
            panic!("client bug");
        }
        let exists = self.state.subjects.lock().unwrap().contains_key(name);
        Ok(exists.then(|| self.handle(name)))
    }

    fn add_subject(&self, name: &str) -> Result<Arc<dyn SubjectHandle>> {
        let mut subjects = self.state.subjects.lock().unwrap();
        if subjects.contains_key(name) {
            bail!("subject {name} exists");
        }
        subjects.insert(name.to_string(), Parameters::new());
        Ok(self.handle(name))
    }

    fn metadata_parameters(&self) -> Result<Vec<ParameterDef>> {
        Ok(self.state.parameter_defs.lock().unwrap().clone())
    }

    fn add_metadata_parameter(&self, def: &ParameterDef) -> Result<()> {
        self.state.parameter_defs.lock().unwrap().push(def.clone());
        Ok(())
    }
}

struct MockSubject {
    name: String,
    state: Arc<MockState>,
}

impl MockSubject {
    fn upload(&self, file: &Path, kind: DataKind) -> Result<()> {
        let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.state.upload_delay.is_zero() {
            std::thread::sleep(self.state.upload_delay);
        }
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.state.fail_upload.contains(&self.name) {
            return Err(anyhow!("transport error: connection reset"));
        }
        self.state
            .uploads
            .lock()
            .unwrap()
            .push((self.name.clone(), file.to_path_buf(), kind));
        Ok(())
    }
}

impl SubjectHandle for MockSubject {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Result<Parameters> {
        self.state
            .subjects
            .lock()
            .unwrap()
            .get(&self.name)
            .cloned()
            .ok_or_else(|| anyhow!("subject {} vanished", self.name))
    }

    fn set_parameters(&self, parameters: &Parameters) -> Result<()> {
        if self.state.panic_set_parameters.contains(&self.name) {
            panic!("client bug");
        }
        self.state
            .subjects
            .lock()
            .unwrap()
            .insert(self.name.clone(), parameters.clone());
        Ok(())
    }

    fn upload_mri(&self, file: &Path) -> Result<()> {
        self.upload(file, DataKind::Mri)
    }

    fn upload_gametection(&self, file: &Path) -> Result<()> {
        self.upload(file, DataKind::Gametection)
    }
}

/// Manifest with a `File,Subject` header, a type row, and one data row per `(file, subject)`.
pub fn manifest(rows: &[(&str, &str)]) -> Manifest {
    let mut csv = String::from("File,Subject\nstring,string\n");
    for (file, subject) in rows {
        csv.push_str(&format!("{file},{subject}\n"));
    }
    Manifest::from_reader(csv.as_bytes()).unwrap()
}

/// `n` rows `f{i}.dat` for distinct subjects `S{i}`.
pub fn numbered_manifest(n: usize) -> Manifest {
    let rows: Vec<(String, String)> = (0..n)
        .map(|i| (format!("f{i}.dat"), format!("S{i}")))
        .collect();
    let refs: Vec<(&str, &str)> = rows.iter().map(|(f, s)| (f.as_str(), s.as_str())).collect();
    manifest(&refs)
}

pub fn opts(concurrency: usize) -> subloader::Opts {
    subloader::Opts {
        user: Some("alice".into()),
        password: Some("secret".into()),
        project: Some(PROJECT_NAME.into()),
        basedir: PathBuf::from("/data"),
        data_kind: DataKind::Mri,
        concurrency: Some(concurrency),
        ..Default::default()
    }
}
