//! Pipeline error types.
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while reading, assembling or generating a schema.
///
/// Every variant is fatal for the invocation: no artifacts are derived from
/// a document that failed to assemble.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum ScaffoldError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to access '{path}': {message}")]
    #[diagnostic(code(scaffold::io::access_failed))]
    IoError {
        path: PathBuf,
        message: String,
    },

    #[error("Schema input not found: {}", path.display())]
    #[diagnostic(
        code(scaffold::io::input_not_found),
        help(
            "Expected folder structure:\n  {name}/\n    ├── {name}_table.csv      (optional: table meta info)\n    ├── {name}_columns.csv    (required: column definitions)\n    ├── {name}_indexes.csv    (optional: composite indexes)\n    └── {name}_relations.csv  (optional: relations)"
        )
    )]
    InputNotFound {
        path: PathBuf,
        name: String,
    },

    #[error("Refusing to overwrite existing output: {}", path.display())]
    #[diagnostic(
        code(scaffold::io::output_exists),
        help("Remove the file or run with a different overwrite policy")
    )]
    OutputExists {
        path: PathBuf,
    },

    #[error("Invalid configuration file '{}': {message}", path.display())]
    #[diagnostic(code(scaffold::config::invalid))]
    InvalidConfig {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Read Errors
    // =========================================================================
    #[error("{}:{line}: expected {expected} fields, found {actual}", file.display())]
    #[diagnostic(
        code(scaffold::read::malformed_row),
        help("Every row must have as many fields as the header. Quote values that contain the delimiter.")
    )]
    MalformedRow {
        file: PathBuf,
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{}:{line}: missing value for required field '{field}'", file.display())]
    #[diagnostic(code(scaffold::read::missing_field))]
    MissingField {
        file: PathBuf,
        line: usize,
        field: String,
    },

    #[error("Unsupported input format: {format}")]
    #[diagnostic(
        code(scaffold::read::unsupported_format),
        help("Supported formats: csv, tsv")
    )]
    UnsupportedFormat {
        format: String,
    },

    // =========================================================================
    // Column Errors
    // =========================================================================
    #[error("Duplicate column name: {name}")]
    #[diagnostic(code(scaffold::column::duplicate))]
    DuplicateColumn {
        name: String,
        line: usize,
    },

    #[error("Unknown type '{token}' for column '{column}'")]
    #[diagnostic(
        code(scaffold::column::unknown_type),
        help("Supported types: string, text, integer, boolean, enum, date, datetime")
    )]
    UnknownColumnType {
        column: String,
        token: String,
    },

    #[error("Invalid length '{value}' for column '{column}'")]
    #[diagnostic(
        code(scaffold::column::invalid_length),
        help("String length must be an integer between 1 and 65535")
    )]
    InvalidLength {
        column: String,
        value: String,
    },

    #[error("Enum column '{column}' declares no values")]
    #[diagnostic(
        code(scaffold::column::missing_enum_values),
        help("List the allowed values in the 'values' field, separated by '|'")
    )]
    MissingEnumValues {
        column: String,
    },

    #[error("Invalid default '{value}' for column '{column}': {reason}")]
    #[diagnostic(code(scaffold::column::invalid_default))]
    InvalidDefault {
        column: String,
        value: String,
        reason: String,
    },

    #[error("Invalid value '{value}' for flag '{field}' at line {line}")]
    #[diagnostic(
        code(scaffold::column::invalid_flag),
        help("Flags accept true/false, yes/no, y/n, 1/0 or an empty value")
    )]
    InvalidFlag {
        field: String,
        value: String,
        line: usize,
    },

    #[error("Invalid foreign key reference '{value}' on column '{column}'")]
    #[diagnostic(
        code(scaffold::column::invalid_foreign_key),
        help("Use 'table.column' or just 'table' to reference its id")
    )]
    InvalidForeignKey {
        column: String,
        value: String,
    },

    #[error("Column '{column}' sets an on-delete policy but has no foreign key")]
    #[diagnostic(
        code(scaffold::column::on_delete_without_foreign_key),
        help("Add a foreign_key (table.column) or use the foreignId type, or clear on_delete")
    )]
    OnDeleteWithoutForeignKey {
        column: String,
    },

    #[error("Unknown on-delete policy '{value}' on column '{column}'")]
    #[diagnostic(
        code(scaffold::column::unknown_on_delete),
        help("Supported policies: cascade, restrict, set_null, no_action")
    )]
    UnknownOnDelete {
        column: String,
        value: String,
    },

    #[error("Unknown action '{value}' on column '{column}'")]
    #[diagnostic(
        code(scaffold::column::unknown_action),
        help("Supported actions: add, change")
    )]
    UnknownColumnAction {
        column: String,
        value: String,
    },

    #[error("Column '{name}' is managed implicitly and cannot be declared")]
    #[diagnostic(code(scaffold::column::reserved), help("{reason}"))]
    ReservedColumn {
        name: String,
        reason: String,
    },

    #[error("Invalid {kind} name: '{name}'")]
    #[diagnostic(
        code(scaffold::column::invalid_identifier),
        help("Names must be lower snake_case and start with a letter")
    )]
    InvalidIdentifier {
        kind: String,
        name: String,
    },

    // =========================================================================
    // Table Errors
    // =========================================================================
    #[error("Primary key column '{column}' is not declared in the columns input")]
    #[diagnostic(
        code(scaffold::table::dangling_primary_key),
        help("Every composite key column must also appear in the columns file")
    )]
    DanglingPrimaryKeyColumn {
        column: String,
    },

    #[error("Invalid primary key declaration: '{value}'")]
    #[diagnostic(
        code(scaffold::table::invalid_primary_key),
        help("Leave empty (or 'id') for an auto-incrementing key, or list two or more distinct columns separated by '|'")
    )]
    InvalidPrimaryKey {
        value: String,
    },

    #[error("Table meta input declares more than one table: {}", file.display())]
    #[diagnostic(code(scaffold::table::multiple_meta))]
    MultipleTableMeta {
        file: PathBuf,
    },

    #[error("Invalid API version '{version}'")]
    #[diagnostic(
        code(scaffold::table::invalid_api_version),
        help("API versions look like 'v1', 'v2', ...")
    )]
    InvalidApiVersion {
        version: String,
    },

    // =========================================================================
    // Index & Relation Errors
    // =========================================================================
    #[error("Index [{columns}] must list at least two distinct columns")]
    #[diagnostic(code(scaffold::index::invalid))]
    InvalidIndex {
        columns: String,
    },

    #[error("Index references unknown column '{column}'")]
    #[diagnostic(code(scaffold::index::unknown_column))]
    UnknownIndexColumn {
        column: String,
    },

    #[error("Unknown relation kind '{kind}'")]
    #[diagnostic(
        code(scaffold::relation::unknown_kind),
        help("Supported kinds: belongs_to, has_many, belongs_to_many")
    )]
    UnknownRelationKind {
        kind: String,
    },

    #[error("Many-to-many relation to '{target}' has no pivot table")]
    #[diagnostic(code(scaffold::relation::missing_pivot))]
    MissingPivotTable {
        target: String,
    },

    // =========================================================================
    // Mode Errors
    // =========================================================================
    #[error("Column '{column}' is marked 'change' but the request is not an alter")]
    #[diagnostic(
        code(scaffold::mode::change_in_create),
        help("Run with --alter, or remove the 'action' value for a fresh table")
    )]
    ChangeInCreateMode {
        column: String,
    },

    // =========================================================================
    // Output Errors
    // =========================================================================
    #[error("Failed to serialize {what}: {message}")]
    #[diagnostic(code(scaffold::emit::serialize_failed))]
    SerializeFailed {
        what: String,
        message: String,
    },
}

impl ScaffoldError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }
}
