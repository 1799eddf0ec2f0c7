//! Input frontends for reading schema definitions into IR.
//!
//! Each frontend is responsible for:
//! 1. Locating the definition files for one table name
//! 2. Converting their records to the common IR
//!
//! Everything after assembly (mode resolution, naming, derivation,
//! emission) is shared between frontends.

pub mod tabular;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::diagnostic::{GenerationWarning, ScaffoldError};
use crate::ir::SchemaDocument;

/// Trait for input frontends.
pub trait Frontend {
    /// Returns the format name (e.g., "csv").
    fn format(&self) -> &str;

    /// Returns the file extension this frontend reads, without the dot.
    fn extension(&self) -> &str;

    /// Finds the inputs for `name` under `root/name/`.
    fn locate(&self, root: &Path, name: &str) -> Result<InputSet, ScaffoldError> {
        locate_inputs(root, name, self.extension())
    }

    /// Builds a validated document from located inputs.
    fn assemble(&self, inputs: &InputSet) -> Result<SchemaDocument, ScaffoldError>;
}

/// Creates a frontend for the given input format.
pub fn create_frontend(format: &str) -> Result<Box<dyn Frontend>, ScaffoldError> {
    match format.to_ascii_lowercase().as_str() {
        "csv" => Ok(Box::new(tabular::TabularFrontend::csv())),
        "tsv" => Ok(Box::new(tabular::TabularFrontend::tsv())),
        _ => Err(ScaffoldError::UnsupportedFormat {
            format: format.to_string(),
        }),
    }
}

/// The four inputs a table definition can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Table,
    Columns,
    Indexes,
    Relations,
}

impl InputKind {
    pub const ALL: [InputKind; 4] = [
        InputKind::Table,
        InputKind::Columns,
        InputKind::Indexes,
        InputKind::Relations,
    ];

    /// File name suffix after `{name}_`.
    pub fn suffix(&self) -> &'static str {
        match self {
            InputKind::Table => "table",
            InputKind::Columns => "columns",
            InputKind::Indexes => "indexes",
            InputKind::Relations => "relations",
        }
    }

    /// Human-readable description shown when an input is loaded.
    pub fn label(&self) -> &'static str {
        match self {
            InputKind::Table => "table meta info",
            InputKind::Columns => "column definitions",
            InputKind::Indexes => "composite indexes",
            InputKind::Relations => "relations",
        }
    }
}

/// Located input files for one table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSet {
    pub dir: PathBuf,
    pub name: String,
    pub table: Option<PathBuf>,
    pub columns: PathBuf,
    pub indexes: Option<PathBuf>,
    pub relations: Option<PathBuf>,
    /// Files in the folder that match no known input.
    pub unrecognized: Vec<PathBuf>,
}

impl InputSet {
    /// Loaded inputs with their kind, in a fixed order.
    pub fn loaded(&self) -> Vec<(InputKind, &Path)> {
        let mut loaded = Vec::new();
        if let Some(path) = &self.table {
            loaded.push((InputKind::Table, path.as_path()));
        }
        loaded.push((InputKind::Columns, self.columns.as_path()));
        if let Some(path) = &self.indexes {
            loaded.push((InputKind::Indexes, path.as_path()));
        }
        if let Some(path) = &self.relations {
            loaded.push((InputKind::Relations, path.as_path()));
        }
        loaded
    }

    /// Warnings for files that were found but will not be read.
    pub fn warnings(&self) -> Vec<GenerationWarning> {
        self.unrecognized
            .iter()
            .map(|path| GenerationWarning::UnrecognizedInput { path: path.clone() })
            .collect()
    }
}

/// Scans `root/name/` for `{name}_{kind}.{extension}` files.
pub fn locate_inputs(root: &Path, name: &str, extension: &str) -> Result<InputSet, ScaffoldError> {
    let dir = root.join(name);
    if !dir.is_dir() {
        return Err(ScaffoldError::InputNotFound {
            path: dir,
            name: name.to_string(),
        });
    }

    let mut found: [Option<PathBuf>; 4] = Default::default();
    let mut unrecognized = Vec::new();

    let mut entries: Vec<PathBuf> = WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    entries.sort();

    for path in entries {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if file_name.starts_with('.') {
            continue;
        }
        let kind = InputKind::ALL
            .iter()
            .position(|kind| file_name == format!("{}_{}.{}", name, kind.suffix(), extension));
        match kind {
            Some(i) => found[i] = Some(path),
            None => {
                warn!(path = %path.display(), "ignoring unrecognized schema input");
                unrecognized.push(path);
            }
        }
    }

    let [table, columns, indexes, relations] = found;
    let columns = columns.ok_or_else(|| ScaffoldError::InputNotFound {
        path: dir.join(format!("{}_columns.{}", name, extension)),
        name: name.to_string(),
    })?;

    let inputs = InputSet {
        dir,
        name: name.to_string(),
        table,
        columns,
        indexes,
        relations,
        unrecognized,
    };
    debug!(name, inputs = inputs.loaded().len(), "located schema inputs");
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_create_frontend() {
        assert_eq!(create_frontend("csv").unwrap().format(), "csv");
        assert_eq!(create_frontend("TSV").unwrap().extension(), "tsv");
        assert!(matches!(
            create_frontend("xlsx"),
            Err(ScaffoldError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_missing_directory() {
        let root = TempDir::new().unwrap();
        let result = locate_inputs(root.path(), "posts", "csv");
        assert!(matches!(
            result,
            Err(ScaffoldError::InputNotFound { name, .. }) if name == "posts"
        ));
    }

    #[test]
    fn test_missing_columns_file() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("posts");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("posts_table.csv"), "table_name\nposts\n").unwrap();

        match locate_inputs(root.path(), "posts", "csv") {
            Err(ScaffoldError::InputNotFound { path, .. }) => {
                assert!(path.ends_with("posts/posts_columns.csv"));
            }
            other => panic!("expected InputNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_locates_optional_and_unrecognized_inputs() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("posts");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("posts_columns.csv"), "name,type\n").unwrap();
        fs::write(dir.join("posts_indexes.csv"), "columns\n").unwrap();
        fs::write(dir.join("posts_notes.csv"), "").unwrap();
        fs::write(dir.join(".DS_Store"), "").unwrap();

        let inputs = locate_inputs(root.path(), "posts", "csv").unwrap();
        assert!(inputs.table.is_none());
        assert!(inputs.indexes.is_some());
        assert!(inputs.relations.is_none());

        let kinds: Vec<InputKind> = inputs.loaded().into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![InputKind::Columns, InputKind::Indexes]);

        assert_eq!(inputs.unrecognized.len(), 1);
        assert!(matches!(
            &inputs.warnings()[0],
            GenerationWarning::UnrecognizedInput { path } if path.ends_with("posts_notes.csv")
        ));
    }
}
