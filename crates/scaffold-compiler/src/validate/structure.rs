//! Structure validation for schema documents.
//!
//! Checks naming rules, reserved columns and that every reference inside
//! the document (key columns, index columns) resolves to a column.

use std::collections::HashSet;

use crate::diagnostic::ScaffoldError;
use crate::ir::{
    PrimaryKeySpec, RelationKind, SchemaDocument, SOFT_DELETE_COLUMN, SURROGATE_KEY,
    TIMESTAMP_COLUMNS,
};

/// Lower snake_case, starting with a letter.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn check_identifier(kind: &str, name: &str) -> Result<(), ScaffoldError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(ScaffoldError::InvalidIdentifier {
            kind: kind.to_string(),
            name: name.to_string(),
        })
    }
}

/// Validates table, column and relation names and reserved columns.
pub fn validate_names(document: &SchemaDocument) -> Result<(), ScaffoldError> {
    check_identifier("table", &document.table_name)?;

    if let Some(version) = &document.api_version {
        super::validate_api_version(version)?;
    }

    for column in &document.columns {
        check_identifier("column", &column.name)?;

        if let Some(reason) = reserved_reason(document, &column.name) {
            return Err(ScaffoldError::ReservedColumn {
                name: column.name.clone(),
                reason: reason.to_string(),
            });
        }

        if let Some(fk) = &column.foreign_key {
            check_identifier("table", &fk.table)?;
            check_identifier("column", &fk.column)?;
        }
    }

    for relation in &document.relations {
        check_identifier("table", &relation.target_table)?;
        if let Some(pivot) = &relation.pivot_table {
            check_identifier("table", pivot)?;
        }
    }

    Ok(())
}

fn reserved_reason(document: &SchemaDocument, name: &str) -> Option<&'static str> {
    if name == SURROGATE_KEY && !document.primary_key.is_composite() {
        return Some("The auto-incrementing 'id' key is added automatically");
    }
    if document.timestamps && TIMESTAMP_COLUMNS.contains(&name) {
        return Some("Timestamp columns are added automatically; set timestamps to 'no' to declare them yourself");
    }
    if document.soft_delete && name == SOFT_DELETE_COLUMN {
        return Some("'deleted_at' is added automatically for soft-deleting tables");
    }
    None
}

/// Validates that composite key columns are distinct and declared.
pub fn validate_primary_key(document: &SchemaDocument) -> Result<(), ScaffoldError> {
    let PrimaryKeySpec::Composite { columns } = &document.primary_key else {
        return Ok(());
    };

    let distinct: HashSet<&str> = columns.iter().map(String::as_str).collect();
    if columns.len() < 2 || distinct.len() != columns.len() {
        return Err(ScaffoldError::InvalidPrimaryKey {
            value: columns.join("|"),
        });
    }

    for key in columns {
        if document.column(key).is_none() {
            return Err(ScaffoldError::DanglingPrimaryKeyColumn {
                column: key.clone(),
            });
        }
    }

    Ok(())
}

/// Validates index column lists.
pub fn validate_indexes(document: &SchemaDocument) -> Result<(), ScaffoldError> {
    for index in &document.indexes {
        let distinct: HashSet<&str> = index.columns.iter().map(String::as_str).collect();
        if index.columns.len() < 2 || distinct.len() != index.columns.len() {
            return Err(ScaffoldError::InvalidIndex {
                columns: index.columns.join(", "),
            });
        }
        for column in &index.columns {
            if !document.has_column(column) {
                return Err(ScaffoldError::UnknownIndexColumn {
                    column: column.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Validates relation shapes. Targets are not resolved against a catalog.
pub fn validate_relations(document: &SchemaDocument) -> Result<(), ScaffoldError> {
    for relation in &document.relations {
        if relation.kind == RelationKind::BelongsToMany && relation.pivot_table.is_none() {
            return Err(ScaffoldError::MissingPivotTable {
                target: relation.target_table.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ColumnSpec, ColumnType, IndexSpec, RelationSpec};
    use crate::validate::validate_document;

    fn posts() -> SchemaDocument {
        let mut doc = SchemaDocument::new("posts");
        doc.columns = vec![
            ColumnSpec::new("user_id", ColumnType::Integer).references("users", "id"),
            ColumnSpec::new("title", ColumnType::String { max_length: 255 }),
            ColumnSpec::new("status", ColumnType::Enum { values: vec!["draft".into()] }),
        ];
        doc
    }

    #[test]
    fn test_valid_document() {
        assert!(validate_document(&posts()).is_ok());
    }

    #[test]
    fn test_identifier_rules() {
        assert!(is_identifier("favorite_points"));
        assert!(is_identifier("post2"));
        assert!(!is_identifier("Posts"));
        assert!(!is_identifier("2posts"));
        assert!(!is_identifier("post-tags"));
        assert!(!is_identifier(""));

        let mut doc = posts();
        doc.columns.push(ColumnSpec::new("Bad Name", ColumnType::Text));
        assert!(matches!(
            validate_document(&doc),
            Err(ScaffoldError::InvalidIdentifier { kind, .. }) if kind == "column"
        ));
    }

    #[test]
    fn test_reserved_columns() {
        let mut doc = posts();
        doc.columns.push(ColumnSpec::new("id", ColumnType::Integer));
        assert!(matches!(validate_document(&doc), Err(ScaffoldError::ReservedColumn { .. })));

        let mut doc = posts();
        doc.columns.push(ColumnSpec::new("created_at", ColumnType::DateTime));
        assert!(matches!(validate_document(&doc), Err(ScaffoldError::ReservedColumn { .. })));
        doc.timestamps = false;
        assert!(validate_document(&doc).is_ok());

        let mut doc = posts();
        doc.soft_delete = true;
        doc.columns.push(ColumnSpec::new("deleted_at", ColumnType::DateTime).nullable());
        assert!(matches!(validate_document(&doc), Err(ScaffoldError::ReservedColumn { .. })));
    }

    #[test]
    fn test_composite_key_may_declare_id() {
        let mut doc = SchemaDocument::new("rooms");
        doc.primary_key = PrimaryKeySpec::Composite {
            columns: vec!["id".into(), "region".into()],
        };
        doc.columns = vec![
            ColumnSpec::new("id", ColumnType::Integer),
            ColumnSpec::new("region", ColumnType::String { max_length: 50 }),
        ];
        assert!(validate_document(&doc).is_ok());
    }

    #[test]
    fn test_index_validation() {
        let mut doc = posts();
        doc.indexes = vec![IndexSpec::new(vec!["title".into()])];
        assert!(matches!(validate_document(&doc), Err(ScaffoldError::InvalidIndex { .. })));

        doc.indexes = vec![IndexSpec::new(vec!["title".into(), "title".into()])];
        assert!(matches!(validate_document(&doc), Err(ScaffoldError::InvalidIndex { .. })));

        doc.indexes = vec![IndexSpec::new(vec!["title".into(), "missing".into()])];
        assert!(matches!(
            validate_document(&doc),
            Err(ScaffoldError::UnknownIndexColumn { column }) if column == "missing"
        ));

        doc.indexes = vec![IndexSpec::new(vec!["status".into(), "created_at".into()])];
        assert!(validate_document(&doc).is_ok());
    }

    #[test]
    fn test_many_to_many_requires_pivot() {
        let mut doc = posts();
        doc.relations = vec![RelationSpec {
            kind: RelationKind::BelongsToMany,
            target_table: "tags".into(),
            pivot_table: None,
            foreign_key: None,
        }];
        assert!(matches!(validate_document(&doc), Err(ScaffoldError::MissingPivotTable { .. })));
    }

    #[test]
    fn test_api_version() {
        let mut doc = posts();
        doc.api_version = Some("v2".into());
        assert!(validate_document(&doc).is_ok());
        doc.api_version = Some("version2".into());
        assert!(matches!(validate_document(&doc), Err(ScaffoldError::InvalidApiVersion { .. })));
    }

}
