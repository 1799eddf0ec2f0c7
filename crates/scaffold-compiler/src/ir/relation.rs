//! Index and relation intermediate representation.

use serde::{Deserialize, Serialize};

/// A composite, non-unique secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Explicit index name, if the input gave one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,

    /// Indexed columns, in declaration order (at least two).
    pub columns: Vec<String>,
}

impl IndexSpec {
    pub fn new(columns: Vec<String>) -> Self {
        Self { name: None, columns }
    }

    /// The index name, falling back to `{table}_{col}_{col}_index`.
    pub fn resolved_name(&self, table: &str) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{}_{}_index", table, self.columns.join("_")),
        }
    }
}

/// Relation cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    BelongsTo,
    HasMany,
    BelongsToMany,
}

impl RelationKind {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "belongs_to" | "belongsto" => Some(RelationKind::BelongsTo),
            "has_many" | "hasmany" => Some(RelationKind::HasMany),
            "belongs_to_many" | "belongstomany" => Some(RelationKind::BelongsToMany),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::BelongsTo => "belongs_to",
            RelationKind::HasMany => "has_many",
            RelationKind::BelongsToMany => "belongs_to_many",
        }
    }
}

/// IR representation of a relation to another table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationSpec {
    pub kind: RelationKind,

    /// Related table (not checked against a live catalog).
    pub target_table: String,

    /// Pivot table, present exactly for `BelongsToMany`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pivot_table: Option<String>,

    /// Explicit foreign key column, when it departs from convention.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub foreign_key: Option<String>,
}
