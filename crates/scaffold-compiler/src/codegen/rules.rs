//! Validation rule vocabulary shared by the request descriptors.

use std::fmt;

use serde::{Serialize, Serializer};

/// How a unique rule excludes the row being updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// Store requests: nothing to exclude.
    None,
    /// Exclude the row bound to this route parameter.
    RouteParameter(String),
    /// Composite keys: the exclusion must be written by hand.
    ManualRequired,
}

/// One validation rule, serialized as its rule token (`max:100`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Required,
    Sometimes,
    Filled,
    Nullable,
    String,
    Integer,
    Boolean,
    Date,
    Max(u32),
    Min(i64),
    In(Vec<String>),
    Exists { table: String, column: String },
    Unique { table: String, column: String, exclusion: Exclusion },
    AfterOrEqual(String),
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => f.write_str("required"),
            Rule::Sometimes => f.write_str("sometimes"),
            Rule::Filled => f.write_str("filled"),
            Rule::Nullable => f.write_str("nullable"),
            Rule::String => f.write_str("string"),
            Rule::Integer => f.write_str("integer"),
            Rule::Boolean => f.write_str("boolean"),
            Rule::Date => f.write_str("date"),
            Rule::Max(n) => write!(f, "max:{}", n),
            Rule::Min(n) => write!(f, "min:{}", n),
            Rule::In(values) => write!(f, "in:{}", values.join(",")),
            Rule::Exists { table, column } => write!(f, "exists:{},{}", table, column),
            Rule::Unique { table, column, exclusion } => match exclusion {
                Exclusion::RouteParameter(param) => {
                    write!(f, "unique:{},{},{{{}}}", table, column, param)
                }
                Exclusion::None | Exclusion::ManualRequired => {
                    write!(f, "unique:{},{}", table, column)
                }
            },
            Rule::AfterOrEqual(field) => write!(f, "after_or_equal:{}", field),
        }
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The rules for one request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRules {
    pub field: String,
    pub rules: Vec<Rule>,
    /// Set when the rule list cannot be completed automatically.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub needs_review: bool,
}

impl FieldRules {
    pub fn new(field: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            field: field.into(),
            rules,
            needs_review: false,
        }
    }

    pub fn contains(&self, rule: &Rule) -> bool {
        self.rules.contains(rule)
    }

    /// Rules joined with `|`.
    pub fn pipe(&self) -> String {
        self.rules
            .iter()
            .map(Rule::to_string)
            .collect::<Vec<_>>()
            .join("|")
    }
}
