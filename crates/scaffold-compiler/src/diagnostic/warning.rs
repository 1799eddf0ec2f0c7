//! Non-fatal findings reported alongside a successful generation.
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

/// Warnings never stop the pipeline. They mark places that need a human.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum GenerationWarning {
    #[error("Unique rule on '{table}.{column}' cannot exclude the current row automatically (composite primary key)")]
    #[diagnostic(
        code(scaffold::derive::unsupported_auto_exclusion),
        severity(Warning),
        help("Add the self-exclusion clause for the composite key by hand in {request}")
    )]
    UnsupportedAutoExclusion {
        table: String,
        column: String,
        request: String,
    },

    #[error("No list filter '{parameter}' for '{table}.{column}': the query parameter is already taken")]
    #[diagnostic(
        code(scaffold::derive::filter_dropped),
        severity(Warning),
        help("Rename the column to get the filter back. keyword, sort_by, sort_order and per_page are fixed parameters")
    )]
    FilterDropped {
        table: String,
        column: String,
        parameter: String,
    },

    #[error("Ignoring unrecognized schema input: {}", path.display())]
    #[diagnostic(
        code(scaffold::read::unrecognized_input),
        severity(Warning),
        help("Only <name>_table, <name>_columns, <name>_indexes and <name>_relations are read")
    )]
    UnrecognizedInput {
        path: PathBuf,
    },
}
