//! Schema diff for change detection.
//!
//! Compares the previously stored document for a name with the one just
//! assembled. Changes are classified as:
//!
//! - **Non-breaking**: existing rows and clients keep working (new columns,
//!   relaxed nullability, new indexes)
//! - **Breaking**: existing data or clients may fail (removed columns, type
//!   changes, nullable to required, a different primary key)

use serde::Serialize;

use crate::ir::{ColumnSpec, DefaultValue, PrimaryKeySpec, SchemaDocument};

/// A single detected change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum SchemaChange {
    ColumnAdded {
        column: String,
        #[serde(rename = "type")]
        column_type: String,
        nullable: bool,
    },

    ColumnRemoved {
        column: String,
    },

    TypeChanged {
        column: String,
        old_type: String,
        new_type: String,
    },

    NullabilityChanged {
        column: String,
        /// Was nullable, now required (breaking) or vice versa.
        was_nullable: bool,
    },

    UniquenessChanged {
        column: String,
        unique: bool,
    },

    DefaultChanged {
        column: String,
        old_default: Option<String>,
        new_default: Option<String>,
    },

    PrimaryKeyChanged {
        old_key: Vec<String>,
        new_key: Vec<String>,
    },

    IndexAdded {
        columns: Vec<String>,
    },

    IndexRemoved {
        columns: Vec<String>,
    },
}

impl SchemaChange {
    /// Whether this change is breaking.
    pub fn is_breaking(&self) -> bool {
        match self {
            SchemaChange::ColumnRemoved { .. } => true,
            SchemaChange::TypeChanged { .. } => true,
            SchemaChange::NullabilityChanged { was_nullable, .. } => *was_nullable,
            SchemaChange::PrimaryKeyChanged { .. } => true,
            SchemaChange::ColumnAdded { .. }
            | SchemaChange::UniquenessChanged { .. }
            | SchemaChange::DefaultChanged { .. }
            | SchemaChange::IndexAdded { .. }
            | SchemaChange::IndexRemoved { .. } => false,
        }
    }

    fn describe(&self) -> String {
        match self {
            SchemaChange::ColumnAdded { column, column_type, nullable } => {
                let opt = if *nullable { "?" } else { "" };
                format!("+ Column '{}': {}{}", column, column_type, opt)
            }
            SchemaChange::ColumnRemoved { column } => format!("- Column '{}' removed", column),
            SchemaChange::TypeChanged { column, old_type, new_type } => {
                format!("~ Column '{}' type changed: {} -> {}", column, old_type, new_type)
            }
            SchemaChange::NullabilityChanged { column, was_nullable } => {
                if *was_nullable {
                    format!("~ Column '{}' changed from nullable to required", column)
                } else {
                    format!("~ Column '{}' changed from required to nullable", column)
                }
            }
            SchemaChange::UniquenessChanged { column, unique } => {
                if *unique {
                    format!("~ Column '{}' is now unique", column)
                } else {
                    format!("~ Column '{}' is no longer unique", column)
                }
            }
            SchemaChange::DefaultChanged { column, old_default, new_default } => format!(
                "~ Column '{}' default changed: {} -> {}",
                column,
                old_default.as_deref().unwrap_or("none"),
                new_default.as_deref().unwrap_or("none"),
            ),
            SchemaChange::PrimaryKeyChanged { old_key, new_key } => format!(
                "~ Primary key changed: ({}) -> ({})",
                old_key.join(", "),
                new_key.join(", ")
            ),
            SchemaChange::IndexAdded { columns } => format!("+ Index ({})", columns.join(", ")),
            SchemaChange::IndexRemoved { columns } => format!("- Index ({}) removed", columns.join(", ")),
        }
    }
}

/// Diff between the stored and the current document of one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDiff {
    pub table: String,
    pub changes: Vec<SchemaChange>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Whether this diff contains any breaking changes.
    pub fn is_breaking(&self) -> bool {
        self.changes.iter().any(SchemaChange::is_breaking)
    }

    pub fn breaking_changes(&self) -> impl Iterator<Item = &SchemaChange> {
        self.changes.iter().filter(|c| c.is_breaking())
    }

    /// Format the diff for display.
    pub fn format_changes(&self) -> String {
        self.changes
            .iter()
            .map(|change| {
                let marker = if change.is_breaking() { "(BREAKING)" } else { "(OK)" };
                format!("  {} {}", change.describe(), marker)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn default_label(value: &Option<DefaultValue>) -> Option<String> {
    value.as_ref().map(ToString::to_string)
}

fn key_columns(key: &PrimaryKeySpec) -> Vec<String> {
    key.columns().into_iter().map(str::to_string).collect()
}

fn diff_column(locked: &ColumnSpec, current: &ColumnSpec, changes: &mut Vec<SchemaChange>) {
    let column = || current.name.clone();

    if locked.column_type != current.column_type {
        changes.push(SchemaChange::TypeChanged {
            column: column(),
            old_type: locked.column_type.to_string(),
            new_type: current.column_type.to_string(),
        });
    }
    if locked.nullable != current.nullable {
        changes.push(SchemaChange::NullabilityChanged {
            column: column(),
            was_nullable: locked.nullable,
        });
    }
    if locked.unique != current.unique {
        changes.push(SchemaChange::UniquenessChanged {
            column: column(),
            unique: current.unique,
        });
    }
    if locked.default_value != current.default_value {
        changes.push(SchemaChange::DefaultChanged {
            column: column(),
            old_default: default_label(&locked.default_value),
            new_default: default_label(&current.default_value),
        });
    }
}

/// Compare two documents and return the differences.
///
/// Removed columns come first in stored order, then changed columns, then
/// added columns in declaration order, so the output is stable.
pub fn diff_documents(locked: &SchemaDocument, current: &SchemaDocument) -> SchemaDiff {
    let mut changes = Vec::new();

    if locked.primary_key != current.primary_key {
        changes.push(SchemaChange::PrimaryKeyChanged {
            old_key: key_columns(&locked.primary_key),
            new_key: key_columns(&current.primary_key),
        });
    }

    for column in &locked.columns {
        if current.column(&column.name).is_none() {
            changes.push(SchemaChange::ColumnRemoved {
                column: column.name.clone(),
            });
        }
    }

    for column in &current.columns {
        match locked.column(&column.name) {
            Some(previous) => diff_column(previous, column, &mut changes),
            None => changes.push(SchemaChange::ColumnAdded {
                column: column.name.clone(),
                column_type: column.column_type.to_string(),
                nullable: column.nullable,
            }),
        }
    }

    for index in &locked.indexes {
        if !current.indexes.iter().any(|i| i.columns == index.columns) {
            changes.push(SchemaChange::IndexRemoved {
                columns: index.columns.clone(),
            });
        }
    }
    for index in &current.indexes {
        if !locked.indexes.iter().any(|i| i.columns == index.columns) {
            changes.push(SchemaChange::IndexAdded {
                columns: index.columns.clone(),
            });
        }
    }

    SchemaDiff {
        table: current.table_name.clone(),
        changes,
    }
}
