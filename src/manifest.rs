//! CSV manifest: `File`, `Subject`, then metadata columns. The first record holds per-column types.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::ConfigError;

pub const FILE_COLUMN: &str = "File";
pub const SUBJECT_COLUMN: &str = "Subject";
/// Renamed to lowercase on load; never defined as a project parameter.
pub const GENDER_COLUMN: &str = "gender";

/// One data row of the manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestRow {
    /// Row number in the manifest, counting the type row as 0.
    pub index: usize,
    pub file: String,
    pub subject: String,
    /// `(column, value)` for each metadata column, in header order.
    pub metadata: Vec<(String, String)>,
}

/// Parsed manifest.
#[derive(Clone, Debug, Default)]
pub struct Manifest {
    columns: Vec<String>,
    types: Vec<String>,
    rows: Vec<ManifestRow>,
}

impl Manifest {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("open manifest {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("parse manifest {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = rdr
            .headers()
            .context("read manifest header")?
            .iter()
            .map(normalize_column)
            .collect();
        let file_idx = column_index(&columns, FILE_COLUMN)?;
        let subject_idx = column_index(&columns, SUBJECT_COLUMN)?;

        let mut records = rdr.records();
        let types: Vec<String> = match records.next() {
            Some(record) => record
                .context("read manifest type row")?
                .iter()
                .map(str::to_string)
                .collect(),
            None => return Err(ConfigError::MissingTypeRow.into()),
        };

        let mut rows = Vec::new();
        for (offset, record) in records.enumerate() {
            let index = offset + 1;
            let record = record.with_context(|| format!("read manifest row {index}"))?;
            let field = |i: usize| record.get(i).unwrap_or("").to_string();
            let metadata = columns
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != file_idx && *i != subject_idx)
                .map(|(i, name)| (name.clone(), field(i)))
                .collect();
            rows.push(ManifestRow {
                index,
                file: field(file_idx),
                subject: field(subject_idx),
                metadata,
            });
        }

        Ok(Manifest {
            columns,
            types,
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ManifestRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(name, type)` for every column other than `File` and `Subject`.
    pub fn metadata_columns(&self) -> Vec<(String, String)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, name)| *name != FILE_COLUMN && *name != SUBJECT_COLUMN)
            .map(|(i, name)| {
                let ty = self.types.get(i).cloned().unwrap_or_default();
                (name.clone(), ty)
            })
            .collect()
    }
}

fn normalize_column(name: &str) -> String {
    if name.eq_ignore_ascii_case(GENDER_COLUMN) {
        GENDER_COLUMN.to_string()
    } else {
        name.to_string()
    }
}

fn column_index(columns: &[String], name: &'static str) -> Result<usize> {
    columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| ConfigError::MissingColumn(name).into())
}
