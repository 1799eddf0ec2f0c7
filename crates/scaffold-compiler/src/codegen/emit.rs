//! Descriptor emission.
//!
//! Rendering a descriptor into framework source is an external concern. The
//! bundled emitter writes each descriptor as pretty JSON so a template
//! back-end can pick it up.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::diagnostic::ScaffoldError;
use super::{Artifact, ArtifactKind};

/// What to do when an output file already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwritePolicy {
    #[default]
    Overwrite,
    Skip,
    Fail,
}

impl OverwritePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "overwrite" => Some(OverwritePolicy::Overwrite),
            "skip" => Some(OverwritePolicy::Skip),
            "fail" => Some(OverwritePolicy::Fail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitStatus {
    Written,
    /// Left untouched under `OverwritePolicy::Skip`.
    Skipped,
}

/// One file produced by an emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedFile {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub status: EmitStatus,
}

/// Turns an artifact descriptor into a file.
pub trait Emitter {
    fn emit(&self, artifact: &Artifact) -> Result<EmittedFile, ScaffoldError>;

    /// Refuses an artifact before anything is written. Accepts by default.
    fn check(&self, _artifact: &Artifact) -> Result<(), ScaffoldError> {
        Ok(())
    }

    /// Checks every artifact, then emits them in order.
    ///
    /// A refusal from `check` leaves the output untouched.
    fn emit_all(&self, artifacts: &[Artifact]) -> Result<Vec<EmittedFile>, ScaffoldError> {
        for artifact in artifacts {
            self.check(artifact)?;
        }
        artifacts.iter().map(|artifact| self.emit(artifact)).collect()
    }
}

/// Writes `{root}/{name}/{kind}.json`.
#[derive(Debug, Clone)]
pub struct JsonEmitter {
    root: PathBuf,
    name: String,
    policy: OverwritePolicy,
}

impl JsonEmitter {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>, policy: OverwritePolicy) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
            policy,
        }
    }

    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.name)
    }

    pub fn path_for(&self, kind: ArtifactKind) -> PathBuf {
        self.dir().join(format!("{}.json", kind.as_str()))
    }
}

impl Emitter for JsonEmitter {
    fn check(&self, artifact: &Artifact) -> Result<(), ScaffoldError> {
        let path = self.path_for(artifact.kind());
        if self.policy == OverwritePolicy::Fail && path.exists() {
            return Err(ScaffoldError::OutputExists { path });
        }
        Ok(())
    }

    fn emit(&self, artifact: &Artifact) -> Result<EmittedFile, ScaffoldError> {
        let kind = artifact.kind();
        let path = self.path_for(kind);

        if path.exists() {
            match self.policy {
                OverwritePolicy::Overwrite => {}
                OverwritePolicy::Skip => {
                    debug!(path = %path.display(), "skipping existing descriptor");
                    return Ok(EmittedFile {
                        kind,
                        path,
                        status: EmitStatus::Skipped,
                    });
                }
                OverwritePolicy::Fail => return Err(ScaffoldError::OutputExists { path }),
            }
        }

        let json = serde_json::to_string_pretty(artifact).map_err(|e| ScaffoldError::SerializeFailed {
            what: format!("{} descriptor", kind.as_str()),
            message: e.to_string(),
        })?;
        write_file(&path, json)?;

        info!(path = %path.display(), "wrote descriptor");
        Ok(EmittedFile {
            kind,
            path,
            status: EmitStatus::Written,
        })
    }
}

/// Writes a file, creating its parent directories first.
pub(crate) fn write_file(path: &Path, mut contents: String) -> Result<(), ScaffoldError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ScaffoldError::io(parent, e.to_string()))?;
    }
    if !contents.ends_with('\n') {
        contents.push('\n');
    }
    fs::write(path, contents).map_err(|e| ScaffoldError::io(path, e.to_string()))
}
