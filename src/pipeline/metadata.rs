//! Metadata sync: parameter definitions on the project, parameter values on each subject.
//! Both steps are idempotent and run before any upload starts.

use anyhow::{Context, Result};
use log::{debug, info};

use crate::manifest::{GENDER_COLUMN, Manifest, ManifestRow};
use crate::platform::{ParameterDef, Project, SubjectHandle};

/// Define every manifest metadata column on the project (type from the type row, visible).
/// Skips `gender` and anything already defined. Returns the number of new definitions.
pub fn define_parameters(project: &dyn Project, manifest: &Manifest) -> Result<usize> {
    let existing = project
        .metadata_parameters()
        .context("list metadata parameters")?;
    let mut added = 0;
    for (name, param_type) in manifest.metadata_columns() {
        if name == GENDER_COLUMN {
            continue;
        }
        if existing.iter().any(|p| p.name == name) {
            debug!("Parameter {} already defined", name);
            continue;
        }
        let def = ParameterDef {
            name,
            param_type,
            visible: true,
        };
        project
            .add_metadata_parameter(&def)
            .with_context(|| format!("add metadata parameter `{}`", def.name))?;
        info!("Added parameter: {} of type {}", def.name, def.param_type);
        added += 1;
    }
    Ok(added)
}

/// Merge the row's metadata values into the subject's parameters. Unchanged maps are not written.
pub fn apply_row_metadata(subject: &dyn SubjectHandle, row: &ManifestRow) -> Result<()> {
    if row.metadata.is_empty() {
        return Ok(());
    }
    let mut params = subject.parameters()?;
    let before = params.clone();
    for (name, value) in &row.metadata {
        params.insert(name.clone(), value.clone());
    }
    if params != before {
        subject.set_parameters(&params)?;
        debug!("Updated subject metadata: {}", subject.name());
    }
    Ok(())
}
