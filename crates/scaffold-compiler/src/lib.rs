//! # Scaffold Compiler
//!
//! This crate turns per-table tabular schema definitions into a canonical
//! schema document and a set of CRUD artifact descriptors for a Laravel API
//! (migration, model, DTO, requests, resource, service, controller, routes,
//! factory and tests).
//!
//! ## Supported Input Formats
//!
//! - CSV (default)
//! - TSV
//!
//! ## Architecture
//!
//! ```text
//! {name}_table / _columns / _indexes / _relations
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Frontend   │  Locate inputs, read records
//! │ (CSV → IR)   │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Validate   │  Names, keys, indexes, relations
//! │    (IR)      │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │  Mode + Names│  Create / alter, every derived identifier
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  One descriptor per artifact
//! │ (IR → desc.) │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │ Schema + Emit│  Store document, diff, write descriptors
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scaffold_compiler::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::default());
//! let manifest = pipeline.run("categories", false)?;
//! for step in &manifest.next_steps {
//!     println!("{}", step);
//! }
//! ```

pub mod config;
pub mod codegen;
pub mod diagnostic;
pub mod frontend;
pub mod ir;
pub mod naming;
pub mod schema;
pub mod validate;

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

pub use codegen::{Artifact, ArtifactKind, ArtifactSet, EmitStatus, Emitter, JsonEmitter, OverwritePolicy};
pub use config::PipelineConfig;
pub use diagnostic::{GenerationWarning, ScaffoldError};
pub use frontend::{InputKind, InputSet};
pub use ir::{GenerationMode, SchemaDocument};
pub use naming::NameSet;
pub use schema::{SchemaChange, SchemaDiff};

/// Everything derived for one request, before anything is written.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    pub inputs: InputSet,
    pub document: SchemaDocument,
    pub names: NameSet,
    pub artifacts: ArtifactSet,
}

impl GenerationPlan {
    /// Input warnings followed by derivation warnings.
    pub fn warnings(&self) -> Vec<GenerationWarning> {
        let mut warnings = self.inputs.warnings();
        warnings.extend(self.artifacts.warnings.iter().cloned());
        warnings
    }
}

/// One input file that was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedInput {
    pub kind: InputKind,
    pub label: String,
    pub path: PathBuf,
}

/// One artifact in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub kind: ArtifactKind,
    pub identifier: String,
    /// Where the rendered source belongs in the target project.
    pub target: String,
    /// Descriptor file, relative to the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EmitStatus>,
}

/// Report of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationManifest {
    pub name: String,
    pub table: String,
    pub version: Option<String>,
    pub mode: GenerationMode,
    /// Stored schema document, relative to the project root.
    pub schema_path: PathBuf,
    pub fingerprint: String,
    pub inputs: Vec<LoadedInput>,
    pub artifacts: Vec<ManifestEntry>,
    pub warnings: Vec<GenerationWarning>,
    /// Changes against the previously stored document, if there was one.
    pub diff: Option<SchemaDiff>,
    pub next_steps: Vec<String>,
}

/// Commands to run once the document is in place.
pub fn next_steps(name: &str, mode: GenerationMode) -> Vec<String> {
    match mode {
        GenerationMode::Alter => vec![format!("make schema-migrate file={} alter=1", name)],
        GenerationMode::Create => vec![
            format!("make schema-migrate file={}", name),
            format!("make schema-model file={}", name),
        ],
    }
}

/// Runs the scaffolding pipeline for one table name at a time.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Reads and validates the inputs for `name` without deriving anything.
    pub fn check(&self, name: &str) -> Result<SchemaDocument, ScaffoldError> {
        let frontend = frontend::create_frontend(&self.config.format)?;
        let inputs = frontend.locate(&self.config.input_dir(), name)?;
        frontend.assemble(&inputs)
    }

    /// Derives every artifact for `name`. Writes nothing.
    ///
    /// This runs:
    /// 1. Create the frontend for the configured format
    /// 2. Locate and read the inputs
    /// 3. Assemble and validate the document
    /// 4. Resolve the generation mode and API version
    /// 5. Derive names and artifact descriptors
    pub fn plan(&self, name: &str, alter: bool) -> Result<GenerationPlan, ScaffoldError> {
        let frontend = frontend::create_frontend(&self.config.format)?;
        let inputs = frontend.locate(&self.config.input_dir(), name)?;
        let document = frontend.assemble(&inputs)?;
        let mut document = ir::resolve_mode(document, alter)?;

        if let Some(version) = &self.config.api_version {
            let version = version.to_ascii_lowercase();
            validate::validate_api_version(&version)?;
            document.api_version = Some(version);
        }

        let names = naming::derive_names(&document);
        let artifacts = codegen::generate(&document, &names);

        Ok(GenerationPlan {
            inputs,
            document,
            names,
            artifacts,
        })
    }

    /// Compares the current inputs with the stored document. Writes nothing.
    pub fn diff(&self, name: &str, alter: bool) -> Result<Option<SchemaDiff>, ScaffoldError> {
        let plan = self.plan(name, alter)?;
        let store = schema::SchemaStore::new(self.config.schema_dir());
        Ok(store
            .load(name)?
            .map(|previous| schema::diff_documents(&previous, &plan.document)))
    }

    /// Plans, then writes the descriptors and the schema document.
    ///
    /// Descriptors are written first so a refused overwrite leaves the
    /// stored document untouched.
    pub fn run(&self, name: &str, alter: bool) -> Result<GenerationManifest, ScaffoldError> {
        let plan = self.plan(name, alter)?;
        let base = &self.config.project_root;

        let store = schema::SchemaStore::new(self.config.schema_dir());
        let diff = store
            .load(name)?
            .map(|previous| schema::diff_documents(&previous, &plan.document));
        if let Some(diff) = &diff {
            debug!(name, changes = diff.changes.len(), breaking = diff.is_breaking(), "compared with stored document");
        }

        let emitted = if self.config.emit_descriptors {
            let emitter = JsonEmitter::new(self.config.descriptor_dir(), name, self.config.overwrite);
            emitter.emit_all(&plan.artifacts.artifacts)?
        } else {
            Vec::new()
        };

        let schema_path = store.save(&plan.document)?;
        let fingerprint = schema::fingerprint(&plan.document)?;

        let artifacts = plan
            .artifacts
            .artifacts
            .iter()
            .map(|artifact| {
                let file = emitted.iter().find(|f| f.kind == artifact.kind());
                ManifestEntry {
                    kind: artifact.kind(),
                    identifier: artifact.identifier(),
                    target: artifact.target_path(),
                    descriptor: file.map(|f| schema::display_path(&f.path, base)),
                    status: file.map(|f| f.status),
                }
            })
            .collect();

        let inputs = plan
            .inputs
            .loaded()
            .into_iter()
            .map(|(kind, path)| LoadedInput {
                kind,
                label: kind.label().to_string(),
                path: schema::display_path(path, base),
            })
            .collect();

        let manifest = GenerationManifest {
            name: name.to_string(),
            table: plan.document.table_name.clone(),
            version: plan.document.api_version.clone(),
            mode: plan.document.mode,
            schema_path: schema::display_path(&schema_path, base),
            fingerprint,
            inputs,
            artifacts,
            warnings: plan.warnings(),
            diff,
            next_steps: next_steps(name, plan.document.mode),
        };

        info!(
            name,
            table = %manifest.table,
            mode = manifest.mode.as_str(),
            artifacts = manifest.artifacts.len(),
            warnings = manifest.warnings.len(),
            "generation complete"
        );
        Ok(manifest)
    }
}
