//! Column intermediate representation.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Length used for `string` columns that declare none.
pub const DEFAULT_STRING_LENGTH: u32 = 255;

/// Upper bound applied to `text` columns by validators.
pub const TEXT_MAX_LENGTH: u32 = 65535;

/// IR representation of one declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Column name (snake_case).
    pub name: String,

    /// The column type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// Whether the column accepts NULL.
    pub nullable: bool,

    /// Whether the column carries a single-column unique constraint.
    pub unique: bool,

    /// Default value, typed against `column_type`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default_value: Option<DefaultValue>,

    /// Foreign key reference (intent only, never resolved against a catalog).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub foreign_key: Option<ForeignKey>,

    /// Free-form column comment.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,

    /// What an alter migration does with this column.
    #[serde(default)]
    pub action: ColumnAction,
}

impl ColumnSpec {
    /// Creates a non-null, non-unique column with no extras.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            unique: false,
            default_value: None,
            foreign_key: None,
            comment: None,
            action: ColumnAction::Add,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKey {
            table: table.into(),
            column: column.into(),
            on_delete: None,
        });
        self
    }

    pub fn with_default(mut self, value: DefaultValue) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_action(mut self, action: ColumnAction) -> Self {
        self.action = action;
        self
    }
}

/// Closed set of column types.
///
/// Every deriver matches on this exhaustively, so a new variant fails to
/// compile until each artifact knows how to handle it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnType {
    String {
        #[serde(rename = "maxLength")]
        max_length: u32,
    },
    Text,
    Integer,
    Boolean,
    Enum {
        values: Vec<String>,
    },
    Date,
    DateTime,
}

impl ColumnType {
    /// Canonical type token, as accepted by the columns input.
    pub fn token(&self) -> &'static str {
        match self {
            ColumnType::String { .. } => "string",
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Boolean => "boolean",
            ColumnType::Enum { .. } => "enum",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::DateTime)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::String { max_length } => write!(f, "string({})", max_length),
            ColumnType::Enum { values } => write!(f, "enum({})", values.join("|")),
            other => f.write_str(other.token()),
        }
    }
}

/// A typed default literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    Null,
    Boolean(bool),
    Integer(i64),
    String(String),
    CurrentTimestamp,
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Null => f.write_str("null"),
            DefaultValue::Boolean(b) => write!(f, "{}", b),
            DefaultValue::Integer(i) => write!(f, "{}", i),
            DefaultValue::String(s) => write!(f, "'{}'", s),
            DefaultValue::CurrentTimestamp => f.write_str("CURRENT_TIMESTAMP"),
        }
    }
}

/// A foreign key reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub on_delete: Option<OnDelete>,
}

/// Referential action on delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnDelete {
    Cascade,
    Restrict,
    SetNull,
    NoAction,
}

impl OnDelete {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "cascade" => Some(OnDelete::Cascade),
            "restrict" => Some(OnDelete::Restrict),
            "set_null" | "setnull" | "null" => Some(OnDelete::SetNull),
            "no_action" | "noaction" => Some(OnDelete::NoAction),
            _ => None,
        }
    }
}

/// What an alter migration does with a column. Ignored for fresh tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnAction {
    #[default]
    Add,
    Change,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display() {
        assert_eq!(ColumnType::String { max_length: 100 }.to_string(), "string(100)");
        assert_eq!(
            ColumnType::Enum { values: vec!["draft".into(), "published".into()] }.to_string(),
            "enum(draft|published)"
        );
        assert_eq!(ColumnType::DateTime.to_string(), "datetime");
    }

    #[test]
    fn test_on_delete_parse() {
        assert_eq!(OnDelete::parse("CASCADE"), Some(OnDelete::Cascade));
        assert_eq!(OnDelete::parse("set null"), Some(OnDelete::SetNull));
        assert_eq!(OnDelete::parse("no-action"), Some(OnDelete::NoAction));
        assert_eq!(OnDelete::parse("explode"), None);
    }

    #[test]
    fn test_column_serializes_type_tag() {
        let column = ColumnSpec::new("title", ColumnType::String { max_length: 255 });
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["type"]["kind"], "string");
        assert_eq!(json["type"]["maxLength"], 255);
        assert!(json.get("defaultValue").is_none());
    }
}
