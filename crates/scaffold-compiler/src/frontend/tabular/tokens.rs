//! Parsing of individual cell values into typed IR pieces.

use crate::diagnostic::ScaffoldError;
use crate::ir::{ColumnType, DefaultValue, ForeignKey, DEFAULT_STRING_LENGTH, TEXT_MAX_LENGTH};
use crate::naming::pluralize;

/// Parses a yes/no cell. Empty cells are `false`.
pub fn parse_flag(field: &str, value: Option<&str>, line: usize) -> Result<bool, ScaffoldError> {
    let Some(raw) = value else {
        return Ok(false);
    };
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "○" | "✓" => Ok(true),
        "false" | "no" | "n" | "0" | "×" | "-" => Ok(false),
        _ => Err(ScaffoldError::InvalidFlag {
            field: field.to_string(),
            value: raw.to_string(),
            line,
        }),
    }
}

/// Parses a flag that defaults to `true` when the cell is empty.
pub fn parse_flag_or(field: &str, value: Option<&str>, default: bool, line: usize) -> Result<bool, ScaffoldError> {
    match value {
        None => Ok(default),
        some => parse_flag(field, some, line),
    }
}

/// Splits a `a|b|c` list. Commas are accepted as separators too.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(['|', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a type token such as `string`, `string(100)` or `enum(a|b)`.
///
/// `length` and `values` are the dedicated cells; inline arguments win.
pub fn parse_type(
    column: &str,
    token: &str,
    length: Option<&str>,
    values: Option<&str>,
) -> Result<ColumnType, ScaffoldError> {
    let token = token.trim();
    let (base, args) = match token.split_once('(') {
        Some((base, rest)) => (base.trim(), Some(rest.trim_end_matches(')').trim())),
        None => (token, None),
    };

    let unknown = || ScaffoldError::UnknownColumnType {
        column: column.to_string(),
        token: token.to_string(),
    };

    match base.to_ascii_lowercase().as_str() {
        "string" | "varchar" | "char" => {
            let max_length = match args.or(length) {
                Some(raw) => parse_length(column, raw)?,
                None => DEFAULT_STRING_LENGTH,
            };
            Ok(ColumnType::String { max_length })
        }
        "text" | "mediumtext" | "longtext" => Ok(ColumnType::Text),
        "integer" | "int" | "bigint" | "biginteger" | "unsignedbiginteger" | "smallint" | "tinyint"
        | "foreignid" => Ok(ColumnType::Integer),
        "boolean" | "bool" => Ok(ColumnType::Boolean),
        "enum" => {
            let values = args.or(values).map(parse_list).unwrap_or_default();
            if values.is_empty() {
                return Err(ScaffoldError::MissingEnumValues {
                    column: column.to_string(),
                });
            }
            Ok(ColumnType::Enum { values })
        }
        "date" => Ok(ColumnType::Date),
        "datetime" | "timestamp" => Ok(ColumnType::DateTime),
        _ => Err(unknown()),
    }
}

/// Whether a type token asks for an inferred foreign key (`foreignId`).
pub fn is_foreign_id(token: &str) -> bool {
    token.trim().eq_ignore_ascii_case("foreignid")
}

fn parse_length(column: &str, raw: &str) -> Result<u32, ScaffoldError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if (1..=TEXT_MAX_LENGTH).contains(&n) => Ok(n),
        _ => Err(ScaffoldError::InvalidLength {
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Parses a default literal against the column type.
pub fn parse_default(
    column: &str,
    column_type: &ColumnType,
    nullable: bool,
    raw: &str,
) -> Result<DefaultValue, ScaffoldError> {
    let invalid = |reason: &str| ScaffoldError::InvalidDefault {
        column: column.to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("null") {
        return if nullable {
            Ok(DefaultValue::Null)
        } else {
            Err(invalid("column is not nullable"))
        };
    }
    let literal = unquote(trimmed);

    match column_type {
        ColumnType::Boolean => parse_flag(column, Some(literal), 0)
            .map(DefaultValue::Boolean)
            .map_err(|_| invalid("expected a boolean")),
        ColumnType::Integer => literal
            .parse::<i64>()
            .map(DefaultValue::Integer)
            .map_err(|_| invalid("expected an integer")),
        ColumnType::Enum { values } => {
            if values.iter().any(|v| v == literal) {
                Ok(DefaultValue::String(literal.to_string()))
            } else {
                Err(invalid("not one of the enum values"))
            }
        }
        ColumnType::String { max_length } => {
            if literal.chars().count() > *max_length as usize {
                Err(invalid("longer than the column length"))
            } else {
                Ok(DefaultValue::String(literal.to_string()))
            }
        }
        ColumnType::Date | ColumnType::DateTime => {
            match literal.to_ascii_lowercase().as_str() {
                "now" | "now()" | "current_timestamp" | "current_timestamp()" | "usecurrent" => {
                    Ok(DefaultValue::CurrentTimestamp)
                }
                _ => Ok(DefaultValue::String(literal.to_string())),
            }
        }
        ColumnType::Text => Ok(DefaultValue::String(literal.to_string())),
    }
}

fn unquote(s: &str) -> &str {
    for quote in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Parses `table.column` or `table` (column defaults to `id`).
pub fn parse_foreign_key(column: &str, raw: &str) -> Result<ForeignKey, ScaffoldError> {
    let invalid = || ScaffoldError::InvalidForeignKey {
        column: column.to_string(),
        value: raw.to_string(),
    };

    let (table, target) = match raw.trim().split_once('.') {
        Some((table, target)) => (table.trim(), target.trim()),
        None => (raw.trim(), "id"),
    };
    if table.is_empty() || target.is_empty() || target.contains('.') {
        return Err(invalid());
    }

    Ok(ForeignKey {
        table: table.to_string(),
        column: target.to_string(),
        on_delete: None,
    })
}

/// Infers the referenced table for a `foreignId` column (`user_id` → `users.id`).
pub fn infer_foreign_key(column: &str) -> Option<ForeignKey> {
    let stem = column.strip_suffix("_id")?;
    if stem.is_empty() {
        return None;
    }
    Some(ForeignKey {
        table: pluralize(stem),
        column: "id".to_string(),
        on_delete: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("nullable", Some("TRUE"), 2).unwrap());
        assert!(parse_flag("nullable", Some("○"), 2).unwrap());
        assert!(!parse_flag("nullable", Some("no"), 2).unwrap());
        assert!(!parse_flag("nullable", None, 2).unwrap());
        assert!(matches!(
            parse_flag("nullable", Some("maybe"), 7),
            Err(ScaffoldError::InvalidFlag { line: 7, .. })
        ));
        assert!(parse_flag_or("timestamps", None, true, 2).unwrap());
    }

    #[test]
    fn test_parse_type_tokens() {
        assert_eq!(
            parse_type("title", "string", None, None).unwrap(),
            ColumnType::String { max_length: 255 }
        );
        assert_eq!(
            parse_type("name", "String(100)", None, None).unwrap(),
            ColumnType::String { max_length: 100 }
        );
        assert_eq!(
            parse_type("code", "varchar", Some("10"), None).unwrap(),
            ColumnType::String { max_length: 10 }
        );
        assert_eq!(parse_type("published_at", "timestamp", None, None).unwrap(), ColumnType::DateTime);
        assert_eq!(parse_type("user_id", "foreignId", None, None).unwrap(), ColumnType::Integer);
        assert_eq!(
            parse_type("status", "enum", None, Some("draft|published")).unwrap(),
            ColumnType::Enum { values: vec!["draft".into(), "published".into()] }
        );
        assert_eq!(
            parse_type("status", "enum(a|b)", None, Some("x|y")).unwrap(),
            ColumnType::Enum { values: vec!["a".into(), "b".into()] }
        );
    }

    #[test]
    fn test_parse_type_errors() {
        assert!(matches!(
            parse_type("price", "money", None, None),
            Err(ScaffoldError::UnknownColumnType { column, token }) if column == "price" && token == "money"
        ));
        assert!(matches!(
            parse_type("status", "enum", None, None),
            Err(ScaffoldError::MissingEnumValues { .. })
        ));
        assert!(matches!(
            parse_type("code", "string", Some("0"), None),
            Err(ScaffoldError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_parse_default() {
        let status = ColumnType::Enum { values: vec!["draft".into(), "published".into()] };
        assert_eq!(
            parse_default("status", &status, false, "'draft'").unwrap(),
            DefaultValue::String("draft".into())
        );
        assert!(parse_default("status", &status, false, "deleted").is_err());
        assert_eq!(
            parse_default("is_active", &ColumnType::Boolean, false, "true").unwrap(),
            DefaultValue::Boolean(true)
        );
        assert_eq!(
            parse_default("capacity", &ColumnType::Integer, false, "4").unwrap(),
            DefaultValue::Integer(4)
        );
        assert!(parse_default("capacity", &ColumnType::Integer, false, "four").is_err());
        assert!(parse_default("body", &ColumnType::Text, false, "null").is_err());
        assert_eq!(parse_default("body", &ColumnType::Text, true, "NULL").unwrap(), DefaultValue::Null);
        assert_eq!(
            parse_default("seen_at", &ColumnType::DateTime, false, "CURRENT_TIMESTAMP").unwrap(),
            DefaultValue::CurrentTimestamp
        );
    }

    #[test]
    fn test_foreign_keys() {
        let fk = parse_foreign_key("user_id", "users.id").unwrap();
        assert_eq!((fk.table.as_str(), fk.column.as_str()), ("users", "id"));

        let fk = parse_foreign_key("author_id", "users").unwrap();
        assert_eq!(fk.column, "id");

        assert!(parse_foreign_key("x", ".id").is_err());
        assert!(parse_foreign_key("x", "a.b.c").is_err());

        let inferred = infer_foreign_key("category_id").unwrap();
        assert_eq!(inferred.table, "categories");
        assert!(infer_foreign_key("title").is_none());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("region | facility_code|room_number"), vec!["region", "facility_code", "room_number"]);
        assert_eq!(parse_list("a,b"), vec!["a", "b"]);
        assert!(parse_list(" | ").is_empty());
    }
}
