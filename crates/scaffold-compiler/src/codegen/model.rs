//! Persistence model descriptor.

use serde::Serialize;

use crate::ir::{ColumnType, PrimaryKeySpec, RelationKind, SchemaDocument, SURROGATE_KEY};
use crate::naming::{pluralize, singularize, to_camel_case, to_pascal_case, ClassName, NameSet};

/// Attribute cast applied by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CastKind {
    Integer,
    Boolean,
    Date,
    Datetime,
}

impl CastKind {
    /// The cast a column type needs, if any.
    pub fn for_type(column_type: &ColumnType) -> Option<Self> {
        match column_type {
            ColumnType::Integer => Some(CastKind::Integer),
            ColumnType::Boolean => Some(CastKind::Boolean),
            ColumnType::Date => Some(CastKind::Date),
            ColumnType::DateTime => Some(CastKind::Datetime),
            ColumnType::String { .. } | ColumnType::Text | ColumnType::Enum { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cast {
    pub column: String,
    pub cast: CastKind,
}

/// Key handling on the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelKey {
    Incrementing { column: String },
    /// `incrementing = false` plus the ordered key column list.
    Composite { columns: Vec<String> },
}

/// A relation accessor on the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRelation {
    pub method: String,
    pub kind: RelationKind,
    /// Related model, fully qualified.
    pub related: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot_table: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub class: ClassName,
    pub table: String,
    pub key: ModelKey,
    pub fillable: Vec<String>,
    pub casts: Vec<Cast>,
    pub timestamps: bool,
    pub soft_deletes: bool,
    pub relations: Vec<ModelRelation>,
    pub factory: String,
}

/// Derives the model descriptor.
pub fn derive_model(document: &SchemaDocument, names: &NameSet) -> ModelDescriptor {
    let key = match &document.primary_key {
        PrimaryKeySpec::Surrogate => ModelKey::Incrementing {
            column: SURROGATE_KEY.to_string(),
        },
        PrimaryKeySpec::Composite { columns } => ModelKey::Composite {
            columns: columns.clone(),
        },
    };

    let casts = document
        .columns
        .iter()
        .filter_map(|column| {
            CastKind::for_type(&column.column_type).map(|cast| Cast {
                column: column.name.clone(),
                cast,
            })
        })
        .collect();

    let relations = document
        .relations
        .iter()
        .map(|relation| {
            let target_singular = singularize(&relation.target_table);
            let method = match relation.kind {
                RelationKind::BelongsTo => to_camel_case(&target_singular),
                RelationKind::HasMany | RelationKind::BelongsToMany => {
                    to_camel_case(&pluralize(&target_singular))
                }
            };
            ModelRelation {
                method,
                kind: relation.kind,
                related: format!("{}\\{}", names.model.namespace, to_pascal_case(&target_singular)),
                foreign_key: relation.foreign_key.clone(),
                pivot_table: relation.pivot_table.clone(),
            }
        })
        .collect();

    ModelDescriptor {
        class: names.model.clone(),
        table: document.table_name.clone(),
        key,
        fillable: document.columns.iter().map(|c| c.name.clone()).collect(),
        casts,
        timestamps: document.timestamps,
        soft_deletes: document.soft_delete,
        relations,
        factory: names.factory.qualified(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::fixtures;
    use crate::naming::derive_names;

    #[test]
    fn test_surrogate_model() {
        let doc = fixtures::posts();
        let model = derive_model(&doc, &derive_names(&doc));

        assert_eq!(model.key, ModelKey::Incrementing { column: "id".into() });
        assert_eq!(model.fillable.len(), doc.columns.len());
        assert!(model.soft_deletes);
        assert_eq!(
            model.casts,
            vec![
                Cast { column: "user_id".into(), cast: CastKind::Integer },
                Cast { column: "published_at".into(), cast: CastKind::Datetime },
            ]
        );

        let methods: Vec<&str> = model.relations.iter().map(|r| r.method.as_str()).collect();
        assert_eq!(methods, vec!["user", "comments", "tags"]);
        assert_eq!(model.relations[0].related, "App\\Models\\User");
        assert_eq!(model.relations[2].pivot_table.as_deref(), Some("post_tag"));
    }

    #[test]
    fn test_composite_model() {
        let doc = fixtures::rooms();
        let model = derive_model(&doc, &derive_names(&doc));

        assert_eq!(
            model.key,
            ModelKey::Composite {
                columns: vec!["region".into(), "facility_code".into(), "room_number".into()],
            }
        );
        assert_eq!(model.class.qualified(), "App\\Models\\Room");
        assert_eq!(
            model.casts,
            vec![
                Cast { column: "capacity".into(), cast: CastKind::Integer },
                Cast { column: "is_active".into(), cast: CastKind::Boolean },
            ]
        );
    }
}
