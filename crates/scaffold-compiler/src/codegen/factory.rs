//! Test data factory descriptor.

use serde::Serialize;

use crate::ir::{ColumnSpec, ColumnType, SchemaDocument};
use crate::naming::{singularize, to_pascal_case, ClassName, NameSet};

/// Smallest length `word()` output reliably fits.
const WORD_MIN_LENGTH: u32 = 10;

/// Fake data generator for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "generator", rename_all = "snake_case")]
pub enum Generator {
    /// Create the related row through its own factory.
    RelatedFactory { model: String },
    RandomElement { values: Vec<String> },
    Boolean,
    NumberBetween { min: i64, max: i64 },
    Date,
    DateTime,
    Paragraph,
    Name,
    Sentence,
    SafeEmail,
    Slug,
    Url,
    PhoneNumber,
    Word,
    /// Random letters, one per `?`.
    Lexify { pattern: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactoryField {
    pub column: String,
    #[serde(flatten)]
    pub generator: Generator,
    /// Draw through the unique generator.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryDescriptor {
    pub class: ClassName,
    pub model: String,
    pub fields: Vec<FactoryField>,
}

fn string_generator(name: &str, max_length: u32) -> Generator {
    let by_name = match name {
        "name" => Some(Generator::Name),
        "title" => Some(Generator::Sentence),
        "slug" => Some(Generator::Slug),
        _ if name.ends_with("_name") => Some(Generator::Name),
        _ if name.contains("email") => Some(Generator::SafeEmail),
        _ if name.contains("url") => Some(Generator::Url),
        _ if name.contains("phone") || name.contains("tel") => Some(Generator::PhoneNumber),
        _ => None,
    };
    match by_name {
        Some(generator) => generator,
        None if max_length < WORD_MIN_LENGTH => Generator::Lexify {
            pattern: "?".repeat(max_length as usize),
        },
        None => Generator::Word,
    }
}

fn generator(column: &ColumnSpec, names: &NameSet) -> Generator {
    if let Some(fk) = &column.foreign_key {
        let model = to_pascal_case(&singularize(&fk.table));
        return Generator::RelatedFactory {
            model: format!("{}\\{}", names.model.namespace, model),
        };
    }
    match &column.column_type {
        ColumnType::String { max_length } => string_generator(&column.name, *max_length),
        ColumnType::Text => Generator::Paragraph,
        ColumnType::Integer => Generator::NumberBetween { min: 1, max: 100 },
        ColumnType::Boolean => Generator::Boolean,
        ColumnType::Enum { values } => Generator::RandomElement {
            values: values.clone(),
        },
        ColumnType::Date => Generator::Date,
        ColumnType::DateTime => Generator::DateTime,
    }
}

/// Derives the factory descriptor.
pub fn derive_factory(document: &SchemaDocument, names: &NameSet) -> FactoryDescriptor {
    let fields = document
        .columns
        .iter()
        .map(|column| FactoryField {
            column: column.name.clone(),
            generator: generator(column, names),
            unique: column.unique && column.foreign_key.is_none(),
        })
        .collect();

    FactoryDescriptor {
        class: names.factory.clone(),
        model: names.model.qualified(),
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::fixtures;
    use crate::naming::derive_names;

    #[test]
    fn test_post_factory() {
        let doc = fixtures::posts();
        let factory = derive_factory(&doc, &derive_names(&doc));

        let generators: Vec<&Generator> = factory.fields.iter().map(|f| &f.generator).collect();
        assert_eq!(generators[0], &Generator::RelatedFactory { model: "App\\Models\\User".into() });
        assert_eq!(generators[1], &Generator::Sentence);
        assert_eq!(generators[2], &Generator::Slug);
        assert!(factory.fields[2].unique);
        assert_eq!(generators[3], &Generator::Paragraph);
        assert!(matches!(generators[4], Generator::RandomElement { values } if values.len() == 3));
        assert_eq!(generators[5], &Generator::DateTime);
    }

    #[test]
    fn test_short_strings_fit_their_length() {
        assert_eq!(string_generator("facility_code", 4), Generator::Lexify { pattern: "????".into() });
        assert_eq!(string_generator("facility_code", 50), Generator::Word);
        assert_eq!(string_generator("contact_email", 255), Generator::SafeEmail);
        assert_eq!(string_generator("display_name", 100), Generator::Name);
    }

    #[test]
    fn test_generator_serializes_flat() {
        let doc = fixtures::rooms();
        let factory = derive_factory(&doc, &derive_names(&doc));
        let json = serde_json::to_value(&factory.fields[4]).unwrap();
        assert_eq!(json["column"], "capacity");
        assert_eq!(json["generator"], "number_between");
        assert_eq!(json["max"], 100);
    }
}
