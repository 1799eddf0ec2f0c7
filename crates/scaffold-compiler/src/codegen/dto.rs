//! Transfer object descriptor.

use serde::Serialize;

use crate::ir::{ColumnSpec, ColumnType, DefaultValue, SchemaDocument};
use crate::naming::{ClassName, NameSet};

/// Scalar type a DTO property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    String,
    Int,
    Bool,
}

impl PropertyType {
    pub fn for_type(column_type: &ColumnType) -> Self {
        match column_type {
            ColumnType::Integer => PropertyType::Int,
            ColumnType::Boolean => PropertyType::Bool,
            ColumnType::String { .. }
            | ColumnType::Text
            | ColumnType::Enum { .. }
            | ColumnType::Date
            | ColumnType::DateTime => PropertyType::String,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DtoProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub nullable: bool,
    /// Value used when the input omits the property.
    pub default: DefaultValue,
    /// Whether the input value is coerced to the property type.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub coerce: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DtoDescriptor {
    pub class: ClassName,
    /// Declared columns, in order.
    pub properties: Vec<DtoProperty>,
    /// Update payloads drop null values.
    pub update_omits_null: bool,
}

/// Default a DTO property takes when the input omits it.
pub fn property_default(column: &ColumnSpec) -> DefaultValue {
    if column.nullable {
        return DefaultValue::Null;
    }
    match PropertyType::for_type(&column.column_type) {
        PropertyType::String => DefaultValue::String(String::new()),
        PropertyType::Int => DefaultValue::Integer(0),
        PropertyType::Bool => DefaultValue::Boolean(false),
    }
}

/// Derives the DTO descriptor.
pub fn derive_dto(document: &SchemaDocument, names: &NameSet) -> DtoDescriptor {
    let properties = document
        .columns
        .iter()
        .map(|column| {
            let property_type = PropertyType::for_type(&column.column_type);
            DtoProperty {
                name: column.name.clone(),
                property_type,
                nullable: column.nullable,
                default: property_default(column),
                coerce: property_type == PropertyType::Bool,
            }
        })
        .collect();

    DtoDescriptor {
        class: names.dto.clone(),
        properties,
        update_omits_null: true,
    }
}
