//! Canonical document persistence.
//!
//! Each assembled document is written to `{root}/{name}.json`. The next run
//! for the same name loads it back to detect what changed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::diagnostic::ScaffoldError;
use crate::ir::SchemaDocument;

/// Directory of stored schema documents.
#[derive(Debug, Clone)]
pub struct SchemaStore {
    root: PathBuf,
}

impl SchemaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", name))
    }

    /// Load the stored document for a name.
    ///
    /// Returns `Ok(None)` if none was stored yet.
    pub fn load(&self, name: &str) -> Result<Option<SchemaDocument>, ScaffoldError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ScaffoldError::io(&path, e.to_string()))?;
        let document: SchemaDocument = serde_json::from_str(&content)
            .map_err(|e| ScaffoldError::io(&path, format!("Failed to parse schema document: {}", e)))?;

        debug!(path = %path.display(), "loaded stored schema document");
        Ok(Some(document))
    }

    /// Save a document under the name it was requested with.
    pub fn save(&self, document: &SchemaDocument) -> Result<PathBuf, ScaffoldError> {
        let path = self.path_for(&document.source_name);
        let content = to_canonical_json(document)?;
        crate::codegen::write_file(&path, content)?;
        Ok(path)
    }
}

/// Pretty JSON form of a document.
pub fn to_canonical_json(document: &SchemaDocument) -> Result<String, ScaffoldError> {
    serde_json::to_string_pretty(document).map_err(|e| ScaffoldError::SerializeFailed {
        what: format!("schema document '{}'", document.source_name),
        message: e.to_string(),
    })
}

/// Content fingerprint of a document, for quick comparison in reports.
pub fn fingerprint(document: &SchemaDocument) -> Result<String, ScaffoldError> {
    let mut hasher = DefaultHasher::new();
    to_canonical_json(document)?.hash(&mut hasher);
    Ok(format!("{:016x}", hasher.finish()))
}

/// Path of the stored document relative to `base`, when one can be computed.
pub fn display_path(path: &Path, base: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}
