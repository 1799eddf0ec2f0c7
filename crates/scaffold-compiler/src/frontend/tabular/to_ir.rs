//! Conversion from tabular records to the schema IR.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::diagnostic::ScaffoldError;
use crate::ir::{
    ColumnAction, ColumnSpec, IndexSpec, OnDelete, PrimaryKeySpec, RelationKind, RelationSpec,
    SchemaDocument, SURROGATE_KEY,
};
use crate::frontend::InputSet;
use crate::validate;
use super::reader::{Record, TabularReader};
use super::tokens::{
    infer_foreign_key, is_foreign_id, parse_default, parse_flag, parse_flag_or, parse_foreign_key,
    parse_list, parse_type,
};

/// Table-level settings from the optional `_table` input.
#[derive(Debug, Clone, PartialEq)]
struct TableMeta {
    table_name: Option<String>,
    comment: Option<String>,
    api_version: Option<String>,
    primary_key: PrimaryKeySpec,
    soft_delete: bool,
    timestamps: bool,
}

impl Default for TableMeta {
    fn default() -> Self {
        Self {
            table_name: None,
            comment: None,
            api_version: None,
            primary_key: PrimaryKeySpec::Surrogate,
            soft_delete: false,
            timestamps: true,
        }
    }
}

/// Builds one validated document from the located inputs.
pub fn assemble(inputs: &InputSet, delimiter: u8) -> Result<SchemaDocument, ScaffoldError> {
    let meta = match &inputs.table {
        Some(path) => read_table_meta(path, delimiter)?,
        None => TableMeta::default(),
    };

    let keys: &[String] = match &meta.primary_key {
        PrimaryKeySpec::Composite { columns } => columns,
        PrimaryKeySpec::Surrogate => &[],
    };
    let columns = read_columns(&inputs.columns, delimiter, keys)?;

    let indexes = match &inputs.indexes {
        Some(path) => read_indexes(path, delimiter)?,
        None => Vec::new(),
    };
    let relations = match &inputs.relations {
        Some(path) => read_relations(path, delimiter)?,
        None => Vec::new(),
    };

    let document = SchemaDocument {
        source_name: inputs.name.clone(),
        table_name: meta.table_name.unwrap_or_else(|| inputs.name.clone()),
        api_version: meta.api_version,
        comment: meta.comment,
        primary_key: meta.primary_key,
        columns,
        indexes,
        relations,
        soft_delete: meta.soft_delete,
        timestamps: meta.timestamps,
        mode: Default::default(),
    };

    validate::validate_document(&document)?;

    debug!(
        table = %document.table_name,
        columns = document.columns.len(),
        indexes = document.indexes.len(),
        relations = document.relations.len(),
        composite = document.primary_key.is_composite(),
        "assembled schema document"
    );

    Ok(document)
}

fn read_records(path: &Path, delimiter: u8) -> Result<Vec<Record>, ScaffoldError> {
    TabularReader::open(path, delimiter)?.collect()
}

fn read_table_meta(path: &Path, delimiter: u8) -> Result<TableMeta, ScaffoldError> {
    let records = read_records(path, delimiter)?;
    if records.len() > 1 {
        return Err(ScaffoldError::MultipleTableMeta {
            file: path.to_path_buf(),
        });
    }
    let Some(record) = records.first() else {
        return Ok(TableMeta::default());
    };
    let line = record.line();

    let primary_key = match record.get("primary_key") {
        None => PrimaryKeySpec::Surrogate,
        Some(raw) => parse_primary_key(raw)?,
    };

    Ok(TableMeta {
        table_name: record.get("table_name").map(str::to_string),
        comment: record.get("comment").map(str::to_string),
        api_version: record.get("api_version").map(str::to_ascii_lowercase),
        primary_key,
        soft_delete: parse_flag("soft_delete", record.get("soft_delete"), line)?,
        timestamps: parse_flag_or("timestamps", record.get("timestamps"), true, line)?,
    })
}

fn parse_primary_key(raw: &str) -> Result<PrimaryKeySpec, ScaffoldError> {
    let columns = parse_list(raw);
    match columns.as_slice() {
        [] => Ok(PrimaryKeySpec::Surrogate),
        [single] if single == SURROGATE_KEY => Ok(PrimaryKeySpec::Surrogate),
        [_] => Err(ScaffoldError::InvalidPrimaryKey { value: raw.to_string() }),
        _ => {
            let distinct: HashSet<&String> = columns.iter().collect();
            if distinct.len() != columns.len() {
                return Err(ScaffoldError::InvalidPrimaryKey { value: raw.to_string() });
            }
            Ok(PrimaryKeySpec::Composite { columns })
        }
    }
}

fn read_columns(path: &Path, delimiter: u8, keys: &[String]) -> Result<Vec<ColumnSpec>, ScaffoldError> {
    let mut columns: Vec<ColumnSpec> = Vec::new();

    for record in TabularReader::open(path, delimiter)? {
        let record = record?;
        let column = parse_column(&record, keys)?;

        if columns.iter().any(|c| c.name == column.name) {
            return Err(ScaffoldError::DuplicateColumn {
                name: column.name,
                line: record.line(),
            });
        }
        columns.push(column);
    }

    Ok(columns)
}

/// Composite key columns are forced non-null before the default is checked.
fn parse_column(record: &Record, keys: &[String]) -> Result<ColumnSpec, ScaffoldError> {
    let line = record.line();
    let name = record.require("name")?.to_string();
    let token = record.require("type")?;

    let column_type = parse_type(&name, token, record.get("length"), record.get("values"))?;
    let nullable = parse_flag("nullable", record.get("nullable"), line)? && !keys.contains(&name);
    let unique = parse_flag("unique", record.get("unique"), line)?;

    let default_value = record
        .get("default")
        .map(|raw| parse_default(&name, &column_type, nullable, raw))
        .transpose()?;

    let mut foreign_key = match record.get("foreign_key") {
        Some(raw) => Some(parse_foreign_key(&name, raw)?),
        None if is_foreign_id(token) => infer_foreign_key(&name),
        None => None,
    };
    if let Some(raw) = record.get("on_delete") {
        let policy = OnDelete::parse(raw).ok_or_else(|| ScaffoldError::UnknownOnDelete {
            column: name.clone(),
            value: raw.to_string(),
        })?;
        match foreign_key.as_mut() {
            Some(fk) => fk.on_delete = Some(policy),
            None => return Err(ScaffoldError::OnDeleteWithoutForeignKey { column: name }),
        }
    }

    let action = match record.get("action").map(str::to_ascii_lowercase).as_deref() {
        None | Some("add") => ColumnAction::Add,
        Some("change" | "modify") => ColumnAction::Change,
        Some(other) => {
            return Err(ScaffoldError::UnknownColumnAction {
                column: name,
                value: other.to_string(),
            })
        }
    };

    Ok(ColumnSpec {
        column_type,
        nullable,
        unique,
        default_value,
        foreign_key,
        comment: record.get("comment").map(str::to_string),
        action,
        name,
    })
}

fn read_indexes(path: &Path, delimiter: u8) -> Result<Vec<IndexSpec>, ScaffoldError> {
    let mut indexes: Vec<IndexSpec> = Vec::new();

    for record in TabularReader::open(path, delimiter)? {
        let record = record?;
        let index = IndexSpec {
            name: record.get("name").map(str::to_string),
            columns: parse_list(record.require("columns")?),
        };
        if !indexes.iter().any(|existing| existing.columns == index.columns) {
            indexes.push(index);
        }
    }

    Ok(indexes)
}

fn read_relations(path: &Path, delimiter: u8) -> Result<Vec<RelationSpec>, ScaffoldError> {
    let mut relations = Vec::new();

    for record in TabularReader::open(path, delimiter)? {
        let record = record?;
        let raw_kind = record.require("kind")?;
        let kind = RelationKind::parse(raw_kind).ok_or_else(|| ScaffoldError::UnknownRelationKind {
            kind: raw_kind.to_string(),
        })?;
        relations.push(RelationSpec {
            kind,
            target_table: record.require("target")?.to_string(),
            pivot_table: record.get("pivot").map(str::to_string),
            foreign_key: record.get("foreign_key").map(str::to_string),
        });
    }

    Ok(relations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    use crate::ir::{ColumnType, DefaultValue};

    fn inputs(dir: &TempDir, name: &str, files: &[(&str, &str)]) -> InputSet {
        for (suffix, content) in files {
            fs::write(dir.path().join(format!("{}_{}.csv", name, suffix)), content).unwrap();
        }
        let path = |suffix: &str| {
            let p = dir.path().join(format!("{}_{}.csv", name, suffix));
            p.exists().then_some(p)
        };
        InputSet {
            dir: dir.path().to_path_buf(),
            name: name.to_string(),
            table: path("table"),
            columns: dir.path().join(format!("{}_columns.csv", name)),
            indexes: path("indexes"),
            relations: path("relations"),
            unrecognized: Vec::new(),
        }
    }

    const POSTS_COLUMNS: &str = "\
name,type,length,nullable,unique,default,foreign_key,on_delete,values,comment
user_id,foreignId,,,,,,cascade,,Author
title,string,255,,,,,,,Title
slug,string,255,,yes,,,,,URL slug
body,text,,yes,,,,,,Body
status,enum,,,,draft,,,draft|published|archived,State
published_at,timestamp,,yes,,,,,,Published
";

    #[test]
    fn test_surrogate_defaults_without_table_meta() {
        let dir = TempDir::new().unwrap();
        let doc = assemble(&inputs(&dir, "posts", &[("columns", POSTS_COLUMNS)]), b',').unwrap();

        assert_eq!(doc.table_name, "posts");
        assert_eq!(doc.primary_key, PrimaryKeySpec::Surrogate);
        assert!(doc.timestamps);
        assert!(!doc.soft_delete);

        let names: Vec<&str> = doc.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["user_id", "title", "slug", "body", "status", "published_at"]);

        let user_id = doc.column("user_id").unwrap();
        let fk = user_id.foreign_key.as_ref().unwrap();
        assert_eq!(fk.table, "users");
        assert_eq!(fk.on_delete, Some(OnDelete::Cascade));

        let status = doc.column("status").unwrap();
        assert_eq!(status.default_value, Some(DefaultValue::String("draft".into())));
        assert!(doc.column("slug").unwrap().unique);
        assert!(doc.column("body").unwrap().nullable);
        assert_eq!(doc.column("published_at").unwrap().column_type, ColumnType::DateTime);
    }

    #[test]
    fn test_composite_key_from_table_meta() {
        let dir = TempDir::new().unwrap();
        let doc = assemble(
            &inputs(
                &dir,
                "rooms",
                &[
                    ("table", "table_name,comment,primary_key,soft_delete,timestamps\nrooms,Rooms,region|facility_code,yes,\n"),
                    ("columns", "name,type,nullable\nregion,string(50),yes\nfacility_code,string(10),\nname,string(100),\n"),
                ],
            ),
            b',',
        )
        .unwrap();

        assert_eq!(
            doc.primary_key,
            PrimaryKeySpec::Composite { columns: vec!["region".into(), "facility_code".into()] }
        );
        assert!(doc.soft_delete);
        assert!(doc.timestamps);
        assert_eq!(doc.comment.as_deref(), Some("Rooms"));
        assert!(!doc.column("region").unwrap().nullable);
    }

    #[test]
    fn test_null_default_rejected_on_key_column() {
        let dir = TempDir::new().unwrap();
        let result = assemble(
            &inputs(
                &dir,
                "rooms",
                &[
                    ("table", "primary_key\nregion|code\n"),
                    ("columns", "name,type,nullable,default\nregion,string,yes,null\ncode,string,,\n"),
                ],
            ),
            b',',
        );
        assert!(matches!(
            result,
            Err(ScaffoldError::InvalidDefault { column, .. }) if column == "region"
        ));
    }

    #[test]
    fn test_null_default_kept_on_nullable_column() {
        let dir = TempDir::new().unwrap();
        let doc = assemble(
            &inputs(&dir, "notes", &[("columns", "name,type,nullable,default\nbody,text,yes,null\n")]),
            b',',
        )
        .unwrap();
        let body = doc.column("body").unwrap();
        assert!(body.nullable);
        assert_eq!(body.default_value, Some(DefaultValue::Null));
    }

    #[test]
    fn test_on_delete_without_foreign_key() {
        let dir = TempDir::new().unwrap();
        let result = assemble(
            &inputs(&dir, "books", &[("columns", "name,type,on_delete\nauthor,integer,cascade\n")]),
            b',',
        );
        assert!(matches!(
            result,
            Err(ScaffoldError::OnDeleteWithoutForeignKey { column }) if column == "author"
        ));
    }

    #[test]
    fn test_dangling_primary_key_column() {
        let dir = TempDir::new().unwrap();
        let result = assemble(
            &inputs(
                &dir,
                "rooms",
                &[
                    ("table", "primary_key\nregion|room_number\n"),
                    ("columns", "name,type\nregion,string\n"),
                ],
            ),
            b',',
        );
        assert!(matches!(
            result,
            Err(ScaffoldError::DanglingPrimaryKeyColumn { column }) if column == "room_number"
        ));
    }

    #[test]
    fn test_single_natural_key_rejected() {
        assert!(matches!(parse_primary_key("code"), Err(ScaffoldError::InvalidPrimaryKey { .. })));
        assert!(matches!(parse_primary_key("a|a"), Err(ScaffoldError::InvalidPrimaryKey { .. })));
        assert_eq!(parse_primary_key("id").unwrap(), PrimaryKeySpec::Surrogate);
    }

    #[test]
    fn test_duplicate_column() {
        let dir = TempDir::new().unwrap();
        let result = assemble(
            &inputs(&dir, "tags", &[("columns", "name,type\nlabel,string\nlabel,text\n")]),
            b',',
        );
        assert!(matches!(
            result,
            Err(ScaffoldError::DuplicateColumn { name, line: 3 }) if name == "label"
        ));
    }

    #[test]
    fn test_unknown_type_token() {
        let dir = TempDir::new().unwrap();
        let result = assemble(&inputs(&dir, "tags", &[("columns", "name,type\nprice,money\n")]), b',');
        assert!(matches!(result, Err(ScaffoldError::UnknownColumnType { .. })));
    }

    #[test]
    fn test_indexes_and_relations() {
        let dir = TempDir::new().unwrap();
        let doc = assemble(
            &inputs(
                &dir,
                "posts",
                &[
                    ("columns", POSTS_COLUMNS),
                    ("indexes", "columns\nuser_id|status\nuser_id|status\nstatus|published_at\n"),
                    ("relations", "kind,target,pivot\nbelongs_to,users,\nhas_many,comments,\nbelongs_to_many,tags,post_tag\n"),
                ],
            ),
            b',',
        )
        .unwrap();

        assert_eq!(doc.indexes.len(), 2);
        assert_eq!(doc.indexes[0].columns, vec!["user_id", "status"]);
        assert_eq!(doc.relations.len(), 3);
        assert_eq!(doc.relations[2].pivot_table.as_deref(), Some("post_tag"));
    }

    #[test]
    fn test_unknown_relation_kind() {
        let dir = TempDir::new().unwrap();
        let result = assemble(
            &inputs(
                &dir,
                "posts",
                &[("columns", POSTS_COLUMNS), ("relations", "kind,target\nmorph_to,images\n")],
            ),
            b',',
        );
        assert!(matches!(result, Err(ScaffoldError::UnknownRelationKind { .. })));
    }

    #[test]
    fn test_change_action_parsed() {
        let dir = TempDir::new().unwrap();
        let doc = assemble(
            &inputs(
                &dir,
                "posts_body_nullable",
                &[
                    ("table", "table_name\nposts\n"),
                    ("columns", "name,type,nullable,action\nbody,text,yes,change\n"),
                ],
            ),
            b',',
        )
        .unwrap();
        assert_eq!(doc.source_name, "posts_body_nullable");
        assert_eq!(doc.table_name, "posts");
        assert_eq!(doc.columns[0].action, ColumnAction::Change);
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let set = inputs(&dir, "posts", &[("columns", POSTS_COLUMNS)]);
        let first = assemble(&set, b',').unwrap();
        let second = assemble(&set, b',').unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
