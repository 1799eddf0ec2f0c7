//! Generation mode resolution.
//!
//! A create request describes the whole table. An alter request describes
//! only the columns it touches, so every column it carries is treated as
//! additive and optional downstream.

use tracing::debug;

use crate::diagnostic::ScaffoldError;
use super::{ColumnAction, GenerationMode, SchemaDocument};

/// Tags the document with the mode the caller asked for.
///
/// Fails if a create request carries columns marked `change`, since there is
/// no existing column to change.
pub fn resolve_mode(mut document: SchemaDocument, alter: bool) -> Result<SchemaDocument, ScaffoldError> {
    let mode = if alter { GenerationMode::Alter } else { GenerationMode::Create };

    if mode == GenerationMode::Create {
        if let Some(column) = document.columns.iter().find(|c| c.action == ColumnAction::Change) {
            return Err(ScaffoldError::ChangeInCreateMode {
                column: column.name.clone(),
            });
        }
    }

    debug!(table = %document.table_name, mode = mode.as_str(), "resolved generation mode");
    document.mode = mode;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ColumnSpec, ColumnType};

    #[test]
    fn test_alter_flag_tags_document() {
        let doc = SchemaDocument::new("posts");
        let resolved = resolve_mode(doc, true).unwrap();
        assert_eq!(resolved.mode, GenerationMode::Alter);
    }

    #[test]
    fn test_create_is_default() {
        let mut doc = SchemaDocument::new("posts");
        doc.mode = GenerationMode::Alter;
        let resolved = resolve_mode(doc, false).unwrap();
        assert_eq!(resolved.mode, GenerationMode::Create);
    }

    #[test]
    fn test_change_rejected_in_create_mode() {
        let mut doc = SchemaDocument::new("posts");
        doc.columns.push(ColumnSpec::new("body", ColumnType::Text).with_action(ColumnAction::Change));

        let err = resolve_mode(doc.clone(), false).unwrap_err();
        assert!(matches!(err, ScaffoldError::ChangeInCreateMode { column } if column == "body"));

        assert!(resolve_mode(doc, true).is_ok());
    }
}
