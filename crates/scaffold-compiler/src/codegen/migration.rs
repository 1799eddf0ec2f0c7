//! Migration plans.
//!
//! A fresh table gets one `CreateTable` operation carrying every column,
//! key, index and audit column. An alter request gets one guarded
//! operation per touched column or index, so re-running it is a no-op.

use serde::Serialize;

use crate::ir::{
    ColumnAction, ColumnSpec, ColumnType, DefaultValue, ForeignKey, GenerationMode, IndexSpec,
    PrimaryKeySpec, SchemaDocument, SURROGATE_KEY,
};
use crate::naming::NameSet;

/// Condition under which a migration step does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    SkipIfTableExists,
    SkipIfColumnExists,
    SkipIfIndexExists,
}

/// How the table's rows are keyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrimaryKeyDefinition {
    AutoIncrement { column: String },
    Composite { columns: Vec<String> },
}

/// A column as the migration declares it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub nullable: bool,
    pub unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl From<&ColumnSpec> for ColumnDefinition {
    fn from(column: &ColumnSpec) -> Self {
        Self {
            name: column.name.clone(),
            column_type: column.column_type.clone(),
            nullable: column.nullable,
            unique: column.unique,
            default: column.default_value.clone(),
            foreign_key: column.foreign_key.clone(),
            comment: column.comment.clone(),
        }
    }
}

/// A named secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDefinition {
    pub name: String,
    pub columns: Vec<String>,
}

impl IndexDefinition {
    fn new(index: &IndexSpec, table: &str) -> Self {
        Self {
            name: index.resolved_name(table),
            columns: index.columns.clone(),
        }
    }
}

/// One schema change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MigrationOp {
    CreateTable {
        #[serde(rename = "primaryKey")]
        primary_key: PrimaryKeyDefinition,
        columns: Vec<ColumnDefinition>,
        indexes: Vec<IndexDefinition>,
        timestamps: bool,
        #[serde(rename = "softDeletes")]
        soft_deletes: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
    },
    AddColumn {
        column: ColumnDefinition,
        guard: Guard,
    },
    ChangeColumn {
        column: ColumnDefinition,
    },
    AddIndex {
        index: IndexDefinition,
        guard: Guard,
    },
    DropTable {
        table: String,
    },
    DropColumn {
        column: String,
    },
    DropIndex {
        name: String,
    },
}

/// The full migration for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPlan {
    /// Migration name without the timestamp prefix.
    pub name: String,
    pub table: String,
    pub mode: GenerationMode,
    /// Guard around the whole `up` step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard: Option<Guard>,
    pub up: Vec<MigrationOp>,
    pub down: Vec<MigrationOp>,
    /// False when `down` cannot fully restore the previous shape.
    pub reversible: bool,
}

/// Derives the migration plan.
pub fn derive_migration(document: &SchemaDocument, names: &NameSet) -> MigrationPlan {
    match document.mode {
        GenerationMode::Create => create_plan(document, names),
        GenerationMode::Alter => alter_plan(document, names),
    }
}

fn create_plan(document: &SchemaDocument, names: &NameSet) -> MigrationPlan {
    let table = document.table_name.clone();

    let primary_key = match &document.primary_key {
        PrimaryKeySpec::Surrogate => PrimaryKeyDefinition::AutoIncrement {
            column: SURROGATE_KEY.to_string(),
        },
        PrimaryKeySpec::Composite { columns } => PrimaryKeyDefinition::Composite {
            columns: columns.clone(),
        },
    };

    // Composite-key tables are often re-applied; only they carry the guard.
    let guard = document
        .primary_key
        .is_composite()
        .then_some(Guard::SkipIfTableExists);

    MigrationPlan {
        name: names.migration.clone(),
        table: table.clone(),
        mode: GenerationMode::Create,
        guard,
        up: vec![MigrationOp::CreateTable {
            primary_key,
            columns: document.columns.iter().map(ColumnDefinition::from).collect(),
            indexes: document
                .indexes
                .iter()
                .map(|index| IndexDefinition::new(index, &table))
                .collect(),
            timestamps: document.timestamps,
            soft_deletes: document.soft_delete,
            comment: document.comment.clone(),
        }],
        down: vec![MigrationOp::DropTable { table }],
        reversible: true,
    }
}

fn alter_plan(document: &SchemaDocument, names: &NameSet) -> MigrationPlan {
    let mut up = Vec::new();
    let mut down = Vec::new();
    let mut reversible = true;

    for column in &document.columns {
        let definition = ColumnDefinition::from(column);
        match column.action {
            ColumnAction::Add => {
                down.push(MigrationOp::DropColumn {
                    column: column.name.clone(),
                });
                up.push(MigrationOp::AddColumn {
                    column: definition,
                    guard: Guard::SkipIfColumnExists,
                });
            }
            ColumnAction::Change => {
                // The previous definition is not part of the request.
                reversible = false;
                up.push(MigrationOp::ChangeColumn { column: definition });
            }
        }
    }

    for index in &document.indexes {
        let index = IndexDefinition::new(index, &document.table_name);
        down.push(MigrationOp::DropIndex {
            name: index.name.clone(),
        });
        up.push(MigrationOp::AddIndex {
            index,
            guard: Guard::SkipIfIndexExists,
        });
    }

    // Undo in reverse order of application.
    down.reverse();

    MigrationPlan {
        name: names.migration.clone(),
        table: document.table_name.clone(),
        mode: GenerationMode::Alter,
        guard: None,
        up,
        down,
        reversible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::fixtures;
    use crate::naming::derive_names;

    #[test]
    fn test_create_plan_for_surrogate_key() {
        let doc = fixtures::posts();
        let plan = derive_migration(&doc, &derive_names(&doc));

        assert_eq!(plan.name, "create_posts_table");
        assert_eq!(plan.guard, None);
        assert_eq!(plan.down, vec![MigrationOp::DropTable { table: "posts".into() }]);

        let MigrationOp::CreateTable { primary_key, columns, indexes, timestamps, soft_deletes, .. } =
            &plan.up[0]
        else {
            panic!("expected CreateTable");
        };
        assert_eq!(primary_key, &PrimaryKeyDefinition::AutoIncrement { column: "id".into() });
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["user_id", "title", "slug", "body", "status", "published_at"]);
        assert_eq!(indexes[0].name, "posts_user_id_status_index");
        assert!(*timestamps);
        assert!(*soft_deletes);
        assert_eq!(columns[0].foreign_key.as_ref().unwrap().table, "users");
    }

    #[test]
    fn test_composite_create_is_guarded() {
        let doc = fixtures::rooms();
        let plan = derive_migration(&doc, &derive_names(&doc));

        assert_eq!(plan.guard, Some(Guard::SkipIfTableExists));
        let MigrationOp::CreateTable { primary_key, .. } = &plan.up[0] else {
            panic!("expected CreateTable");
        };
        assert_eq!(
            primary_key,
            &PrimaryKeyDefinition::Composite {
                columns: vec!["region".into(), "facility_code".into(), "room_number".into()],
            }
        );
    }

    #[test]
    fn test_alter_plan_is_guarded_per_step() {
        let mut doc = SchemaDocument::new("posts");
        doc.source_name = "posts_add_view_count".into();
        doc.mode = GenerationMode::Alter;
        doc.columns = vec![ColumnSpec::new("view_count", ColumnType::Integer)];
        doc.indexes = vec![IndexSpec::new(vec!["view_count".into(), "created_at".into()])];

        let plan = derive_migration(&doc, &derive_names(&doc));
        assert_eq!(plan.name, "posts_add_view_count");
        assert!(plan.reversible);
        assert!(matches!(
            &plan.up[0],
            MigrationOp::AddColumn { guard: Guard::SkipIfColumnExists, column } if column.name == "view_count"
        ));
        assert!(matches!(&plan.up[1], MigrationOp::AddIndex { guard: Guard::SkipIfIndexExists, .. }));
        assert!(matches!(&plan.down[0], MigrationOp::DropIndex { .. }));
        assert!(matches!(&plan.down[1], MigrationOp::DropColumn { column } if column == "view_count"));
    }

    #[test]
    fn test_change_column_is_not_reversible() {
        let mut doc = SchemaDocument::new("posts");
        doc.mode = GenerationMode::Alter;
        doc.columns = vec![ColumnSpec::new("body", ColumnType::Text)
            .nullable()
            .with_action(ColumnAction::Change)];

        let plan = derive_migration(&doc, &derive_names(&doc));
        assert!(!plan.reversible);
        assert!(matches!(&plan.up[0], MigrationOp::ChangeColumn { column } if column.nullable));
        assert!(plan.down.is_empty());
    }
}
