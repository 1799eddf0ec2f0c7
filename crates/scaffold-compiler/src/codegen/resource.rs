//! API resource (response shape) descriptor.

use serde::Serialize;

use crate::ir::{SchemaDocument, SURROGATE_KEY, TIMESTAMP_COLUMNS};
use crate::naming::{ClassName, NameSet};

/// How a value is rendered in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    Raw,
    /// ISO-8601 string, null-safe.
    Iso8601,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceField {
    pub key: String,
    pub column: String,
    pub format: ValueFormat,
}

impl ResourceField {
    fn raw(column: &str) -> Self {
        Self {
            key: column.to_string(),
            column: column.to_string(),
            format: ValueFormat::Raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub class: ClassName,
    pub model: String,
    pub fields: Vec<ResourceField>,
}

impl ResourceDescriptor {
    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.key.as_str()).collect()
    }
}

/// Derives the resource descriptor.
pub fn derive_resource(document: &SchemaDocument, names: &NameSet) -> ResourceDescriptor {
    let mut fields = Vec::new();
    if !document.primary_key.is_composite() {
        fields.push(ResourceField::raw(SURROGATE_KEY));
    }
    fields.extend(document.columns.iter().map(|c| ResourceField::raw(&c.name)));
    if document.timestamps {
        fields.extend(TIMESTAMP_COLUMNS.iter().map(|column| ResourceField {
            format: ValueFormat::Iso8601,
            ..ResourceField::raw(column)
        }));
    }

    ResourceDescriptor {
        class: names.resource.clone(),
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
    fn test_surrogate_resource_includes_id() {
        let doc = fixtures::posts();
        let resource = derive_resource(&doc, &derive_names(&doc));
        assert_eq!(
            resource.keys(),
            vec!["id", "user_id", "title", "slug", "body", "status", "published_at", "created_at", "updated_at"]
        );
        assert_eq!(resource.fields.last().unwrap().format, ValueFormat::Iso8601);
    }

    #[test]
    fn test_composite_resource_has_no_id() {
        let mut doc = fixtures::rooms();
        doc.timestamps = false;
        let resource = derive_resource(&doc, &derive_names(&doc));
        assert_eq!(
            resource.keys(),
            vec!["region", "facility_code", "room_number", "name", "capacity", "is_active"]
        );
    }
}
