//! Canonical schema intermediate representation.
//!
//! This IR is produced by the tabular frontends and consumed by every
//! artifact deriver. It is the stable hand-off between ingestion and
//! generation, and its serialized form is the one output this crate owns
//! directly.

mod column;
mod mode;
mod relation;

pub use column::{
    ColumnAction, ColumnSpec, ColumnType, DefaultValue, ForeignKey, OnDelete,
    DEFAULT_STRING_LENGTH, TEXT_MAX_LENGTH,
};
pub use mode::resolve_mode;
pub use relation::{IndexSpec, RelationKind, RelationSpec};

use serde::{Deserialize, Serialize};

/// Name of the implicit surrogate key column.
pub const SURROGATE_KEY: &str = "id";

/// Audit columns added by `timestamps`.
pub const TIMESTAMP_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

/// Column added by `soft_delete`.
pub const SOFT_DELETE_COLUMN: &str = "deleted_at";

/// How rows of a table are identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrimaryKeySpec {
    /// Single auto-incrementing integer `id`, injected implicitly.
    Surrogate,
    /// Two or more declared columns, addressed positionally in routes.
    Composite { columns: Vec<String> },
}

impl PrimaryKeySpec {
    pub fn is_composite(&self) -> bool {
        matches!(self, PrimaryKeySpec::Composite { .. })
    }

    /// Key column names in key order.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            PrimaryKeySpec::Surrogate => vec![SURROGATE_KEY],
            PrimaryKeySpec::Composite { columns } => columns.iter().map(String::as_str).collect(),
        }
    }
}

/// Whether generation targets a fresh table or an incremental change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    #[default]
    Create,
    Alter,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Create => "create",
            GenerationMode::Alter => "alter",
        }
    }
}

/// The complete IR for one table and one generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    /// Name the request was made under (the input folder name).
    pub source_name: String,

    /// Target table; drives every derived name.
    pub table_name: String,

    /// API version namespace (`v1`, `v2`, ...). `None` is the default surface.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub api_version: Option<String>,

    /// Table comment.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,

    pub primary_key: PrimaryKeySpec,

    /// Declared columns, in declaration order.
    pub columns: Vec<ColumnSpec>,

    /// Composite secondary indexes, deduplicated, in declaration order.
    pub indexes: Vec<IndexSpec>,

    pub relations: Vec<RelationSpec>,

    pub soft_delete: bool,

    pub timestamps: bool,

    pub mode: GenerationMode,
}

impl SchemaDocument {
    /// Creates a create-mode document with a surrogate key and timestamps.
    pub fn new(table_name: impl Into<String>) -> Self {
        let table_name = table_name.into();
        Self {
            source_name: table_name.clone(),
            table_name,
            api_version: None,
            comment: None,
            primary_key: PrimaryKeySpec::Surrogate,
            columns: Vec::new(),
            indexes: Vec::new(),
            relations: Vec::new(),
            soft_delete: false,
            timestamps: true,
            mode: GenerationMode::Create,
        }
    }

    /// Looks up a declared column.
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns that exist on the table without being declared.
    pub fn implicit_columns(&self) -> Vec<&'static str> {
        let mut implicit = Vec::new();
        if !self.primary_key.is_composite() {
            implicit.push(SURROGATE_KEY);
        }
        if self.timestamps {
            implicit.extend(TIMESTAMP_COLUMNS);
        }
        if self.soft_delete {
            implicit.push(SOFT_DELETE_COLUMN);
        }
        implicit
    }

    /// Whether a column exists, declared or implicit.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some() || self.implicit_columns().contains(&name)
    }

    pub fn is_alter(&self) -> bool {
        self.mode == GenerationMode::Alter
    }
}
