//! Pipeline configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::codegen::OverwritePolicy;
use crate::diagnostic::ScaffoldError;

/// Default configuration file name, looked up in the project root.
pub const CONFIG_FILE: &str = "scaffold.json";

/// Configuration for the scaffolding pipeline.
///
/// Every root is resolved against `project_root`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PipelineConfig {
    /// Root of the target project.
    pub project_root: PathBuf,

    /// Directory holding one input folder per table name.
    pub input_root: PathBuf,

    /// Directory the canonical schema documents are written to.
    pub schema_root: PathBuf,

    /// Directory the artifact descriptors are written to.
    pub descriptor_root: PathBuf,

    /// API version override (`v2`). Takes precedence over the table meta.
    pub api_version: Option<String>,

    /// Input format (default: "csv").
    pub format: String,

    pub overwrite: OverwritePolicy,

    /// Write descriptors alongside the schema document.
    pub emit_descriptors: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            input_root: PathBuf::from(".devtools/laravel-schema-gen/csv"),
            schema_root: PathBuf::from(".devtools/laravel-schema-gen/schema"),
            descriptor_root: PathBuf::from(".devtools/laravel-schema-gen/artifacts"),
            api_version: None,
            format: "csv".to_string(),
            overwrite: OverwritePolicy::Overwrite,
            emit_descriptors: true,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ScaffoldError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScaffoldError::InvalidConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ScaffoldError::InvalidConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load `scaffold.json` from `project_root` if present, else defaults.
    pub fn discover(project_root: &Path) -> Result<Self, ScaffoldError> {
        let path = project_root.join(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load(&path)?
        } else {
            Self::default()
        };
        config.project_root = project_root.to_path_buf();
        Ok(config)
    }

    pub fn input_dir(&self) -> PathBuf {
        self.project_root.join(&self.input_root)
    }

    pub fn schema_dir(&self) -> PathBuf {
        self.project_root.join(&self.schema_root)
    }

    pub fn descriptor_dir(&self) -> PathBuf {
        self.project_root.join(&self.descriptor_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.format, "csv");
        assert_eq!(config.overwrite, OverwritePolicy::Overwrite);
        assert!(config.emit_descriptors);
        assert_eq!(config.input_dir(), PathBuf::from("./.devtools/laravel-schema-gen/csv"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "apiVersion": "v2", "overwrite": "skip" }"#,
        )
        .unwrap();

        let config = PipelineConfig::discover(dir.path()).unwrap();
        assert_eq!(config.api_version.as_deref(), Some("v2"));
        assert_eq!(config.overwrite, OverwritePolicy::Skip);
        assert_eq!(config.format, "csv");
        assert_eq!(config.schema_dir(), dir.path().join(".devtools/laravel-schema-gen/schema"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "outDir": "x" }"#).unwrap();

        let err = PipelineConfig::load(&path).unwrap_err();
        assert!(matches!(err, ScaffoldError::InvalidConfig { .. }));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::discover(dir.path()).unwrap();
        assert_eq!(config.project_root, dir.path());
        assert_eq!(config.input_root, PathBuf::from(".devtools/laravel-schema-gen/csv"));
    }
}
