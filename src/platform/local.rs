//! Directory-backed platform: stage uploads on disk with the same project/subject model as the remote.
//!
//! Layout under the root:
//! ```text
//! <project-id>/project.json                 name + parameter definitions
//! <project-id>/subjects/<name>/parameters.json
//! <project-id>/subjects/<name>/<kind>/<file name>
//! ```

use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{Account, ParameterDef, Parameters, Platform, Project, ProjectInfo, SubjectHandle};
use crate::DataKind;
use crate::utils::config::LocalLayout;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProjectFile {
    name: String,
    #[serde(default)]
    parameters: Vec<ParameterDef>,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))
}

/// Subject and project names become directory names; refuse anything that would escape.
fn check_component(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0')
    {
        bail!("invalid name `{name}`");
    }
    Ok(())
}

/// Platform rooted at a local directory.
#[derive(Clone, Debug)]
pub struct LocalPlatform {
    root: PathBuf,
}

impl LocalPlatform {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a project directory with `name`; `id` becomes the directory name.
    pub fn create_project(&self, id: &str, name: &str) -> Result<()> {
        check_component(id)?;
        let dir = self.root.join(id);
        fs::create_dir_all(dir.join(LocalLayout::SUBJECTS_DIR))
            .with_context(|| format!("create project dir {}", dir.display()))?;
        write_json(
            &dir.join(LocalLayout::PROJECT_FILE),
            &ProjectFile {
                name: name.to_string(),
                parameters: Vec::new(),
            },
        )
    }
}

impl Platform for LocalPlatform {
    fn authenticate(&self, user: &str, password: &str) -> Result<Box<dyn Account>> {
        if user.is_empty() || password.is_empty() {
            bail!("authentication failed: empty credentials");
        }
        if !self.root.is_dir() {
            bail!("platform root {} is not a directory", self.root.display());
        }
        debug!("Authenticated {} against {}", user, self.root.display());
        Ok(Box::new(LocalAccount {
            root: self.root.clone(),
        }))
    }
}

struct LocalAccount {
    root: PathBuf,
}

impl Account for LocalAccount {
    fn projects(&self) -> Result<Vec<ProjectInfo>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.root)
            .with_context(|| format!("list projects in {}", self.root.display()))?
        {
            let entry = entry?;
            let project_file = entry.path().join(LocalLayout::PROJECT_FILE);
            if !project_file.is_file() {
                continue;
            }
            let file: ProjectFile = read_json(&project_file)?;
            out.push(ProjectInfo {
                id: entry.file_name().to_string_lossy().into_owned(),
                name: file.name,
            });
        }
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    fn open_project(&self, id: &str) -> Result<Arc<dyn Project>> {
        check_component(id)?;
        let dir = self.root.join(id);
        if !dir.join(LocalLayout::PROJECT_FILE).is_file() {
            bail!("no project with id `{id}`");
        }
        Ok(Arc::new(LocalProject {
            dir,
            definitions: Mutex::new(()),
        }))
    }
}

struct LocalProject {
    dir: PathBuf,
    /// Serializes read-modify-write of `project.json`.
    definitions: Mutex<()>,
}

impl LocalProject {
    fn subjects_dir(&self) -> PathBuf {
        self.dir.join(LocalLayout::SUBJECTS_DIR)
    }

    fn handle(&self, name: &str) -> Arc<dyn SubjectHandle> {
        Arc::new(LocalSubject {
            name: name.to_string(),
            dir: self.subjects_dir().join(name),
            write_lock: Mutex::new(()),
        })
    }
}

impl Project for LocalProject {
    fn list_subjects(&self) -> Result<Vec<String>> {
        let dir = self.subjects_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = fs::read_dir(&dir)
            .with_context(|| format!("list subjects in {}", dir.display()))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    fn get_subject(&self, name: &str) -> Result<Option<Arc<dyn SubjectHandle>>> {
        check_component(name)?;
        if self.subjects_dir().join(name).is_dir() {
            Ok(Some(self.handle(name)))
        } else {
            Ok(None)
        }
    }

    fn add_subject(&self, name: &str) -> Result<Arc<dyn SubjectHandle>> {
        check_component(name)?;
        let subjects = self.subjects_dir();
        fs::create_dir_all(&subjects)?;
        let dir = subjects.join(name);
        fs::create_dir(&dir).with_context(|| format!("create subject `{name}`"))?;
        write_json(&dir.join(LocalLayout::PARAMETERS_FILE), &Parameters::new())?;
        debug!("Added subject: {}", name);
        Ok(self.handle(name))
    }

    fn metadata_parameters(&self) -> Result<Vec<ParameterDef>> {
        let file: ProjectFile = read_json(&self.dir.join(LocalLayout::PROJECT_FILE))?;
        Ok(file.parameters)
    }

    fn add_metadata_parameter(&self, def: &ParameterDef) -> Result<()> {
        let _guard = self
            .definitions
            .lock()
            .map_err(|_| anyhow!("project definitions lock poisoned"))?;
        let path = self.dir.join(LocalLayout::PROJECT_FILE);
        let mut file: ProjectFile = read_json(&path)?;
        if file.parameters.iter().any(|p| p.name == def.name) {
            bail!("parameter `{}` already defined", def.name);
        }
        file.parameters.push(def.clone());
        write_json(&path, &file)
    }
}

struct LocalSubject {
    name: String,
    dir: PathBuf,
    /// Serializes writes of `parameters.json`.
    write_lock: Mutex<()>,
}

impl LocalSubject {
    fn store(&self, file: &Path, kind: DataKind) -> Result<()> {
        let file_name = file
            .file_name()
            .ok_or_else(|| anyhow!("{} has no file name", file.display()))?;
        let dest_dir = self.dir.join(kind.as_str());
        fs::create_dir_all(&dest_dir)?;
        fs::copy(file, dest_dir.join(file_name)).with_context(|| {
            format!("upload {} for subject `{}`", file.display(), self.name)
        })?;
        Ok(())
    }
}

impl SubjectHandle for LocalSubject {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Result<Parameters> {
        let path = self.dir.join(LocalLayout::PARAMETERS_FILE);
        if !path.is_file() {
            return Ok(Parameters::new());
        }
        read_json(&path)
    }

    fn set_parameters(&self, parameters: &Parameters) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow!("subject parameters lock poisoned"))?;
        write_json(&self.dir.join(LocalLayout::PARAMETERS_FILE), parameters)
    }

    fn upload_mri(&self, file: &Path) -> Result<()> {
        self.store(file, DataKind::Mri)
    }

    fn upload_gametection(&self, file: &Path) -> Result<()> {
        self.store(file, DataKind::Gametection)
    }
}
