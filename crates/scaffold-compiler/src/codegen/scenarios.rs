//! Test scenario descriptors: API feature suite, validation suite and DTO
//! unit suite.
//!
//! Scenarios reuse the controller, request and DTO descriptors so the tests
//! assert exactly what those artifacts produce.

use serde::Serialize;
use serde_json::{json, Value};

use crate::ir::{ColumnSpec, ColumnType, DefaultValue, GenerationMode, SchemaDocument};
use crate::naming::{singularize, to_pascal_case, ClassName, NameSet};
use super::controller::{ControllerDescriptor, HttpMethod};
use super::dto::DtoDescriptor;
use super::rules::Rule;
use super::requests::RequestDescriptor;

/// A request payload value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SampleValue {
    Literal(Value),
    /// Key of a row created through the related model's factory.
    FactoryKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadField {
    pub field: String,
    pub value: SampleValue,
}

/// One check made after the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "assert", rename_all = "snake_case")]
pub enum Assertion {
    Status { code: u16 },
    JsonCount { count: usize },
    JsonStructure { keys: Vec<String> },
    ValidationError { field: String },
    DatabaseHas { table: String, columns: Vec<String> },
    DatabaseMissing { table: String },
    SoftDeleted { table: String },
    PropertyEquals { property: String, value: DefaultValue },
}

/// Rows seeded through the factory before the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    pub model: String,
    pub count: usize,
    /// Field values the seeded rows must carry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub with: Vec<PayloadField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<Seed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payload: Vec<PayloadField>,
    pub assertions: Vec<Assertion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteDescriptor {
    pub class: ClassName,
    /// Class under test.
    pub subject: String,
    pub refresh_database: bool,
    pub cases: Vec<TestCase>,
}

impl TestSuiteDescriptor {
    pub fn case(&self, name: &str) -> Option<&TestCase> {
        self.cases.iter().find(|c| c.name == name)
    }
}

/// A valid sample value for a column.
pub fn sample_value(column: &ColumnSpec) -> SampleValue {
    if let Some(fk) = &column.foreign_key {
        return SampleValue::FactoryKey(to_pascal_case(&singularize(&fk.table)));
    }
    let value = match &column.column_type {
        ColumnType::String { max_length } => {
            let mut text = format!("test_{}", column.name);
            text.truncate(*max_length as usize);
            json!(text)
        }
        ColumnType::Text => json!("Sample text"),
        ColumnType::Integer => json!(1),
        ColumnType::Boolean => json!(true),
        ColumnType::Enum { values } => json!(values.first().cloned().unwrap_or_default()),
        ColumnType::Date => json!("2025-01-01"),
        ColumnType::DateTime => json!("2025-01-01 00:00:00"),
    };
    SampleValue::Literal(value)
}

fn payload(document: &SchemaDocument) -> Vec<PayloadField> {
    document
        .columns
        .iter()
        .map(|column| PayloadField {
            field: column.name.clone(),
            value: sample_value(column),
        })
        .collect()
}

fn seed(names: &NameSet, count: usize) -> Seed {
    Seed {
        model: names.model.qualified(),
        count,
        with: Vec::new(),
    }
}

/// Endpoint of a controller action, with its placeholders unfilled.
fn member_uri(controller: &ControllerDescriptor, action: &str) -> Option<String> {
    controller.action(action).map(|a| format!("/api/{}", a.uri))
}

/// Derives the API feature suite.
pub fn derive_feature_suite(
    document: &SchemaDocument,
    names: &NameSet,
    controller: &ControllerDescriptor,
    resource_keys: &[&str],
) -> TestSuiteDescriptor {
    let collection = Some(names.endpoint.clone());
    let plural = &names.plural;
    let singular = &names.singular;
    let structure = Assertion::JsonStructure {
        keys: resource_keys.iter().map(|k| k.to_string()).collect(),
    };
    let declared: Vec<String> = document.columns.iter().map(|c| c.name.clone()).collect();

    let mut cases = vec![
        TestCase {
            name: format!("test_can_list_{}", plural),
            seed: Some(seed(names, 3)),
            method: Some(HttpMethod::Get),
            uri: collection.clone(),
            payload: Vec::new(),
            assertions: vec![Assertion::Status { code: 200 }, Assertion::JsonCount { count: 3 }],
        },
        TestCase {
            name: format!("test_can_show_{}", singular),
            seed: Some(seed(names, 1)),
            method: Some(HttpMethod::Get),
            uri: member_uri(controller, "show"),
            payload: Vec::new(),
            assertions: vec![Assertion::Status { code: 200 }, structure],
        },
        TestCase {
            name: format!("test_can_create_{}", singular),
            seed: None,
            method: Some(HttpMethod::Post),
            uri: collection,
            payload: payload(document),
            assertions: vec![
                Assertion::Status { code: 201 },
                Assertion::DatabaseHas {
                    table: document.table_name.clone(),
                    columns: declared.clone(),
                },
            ],
        },
        TestCase {
            name: format!("test_can_update_{}", singular),
            seed: Some(seed(names, 1)),
            method: Some(HttpMethod::Put),
            uri: member_uri(controller, "update"),
            payload: payload(document),
            assertions: vec![
                Assertion::Status { code: 200 },
                Assertion::DatabaseHas {
                    table: document.table_name.clone(),
                    columns: declared,
                },
            ],
        },
        TestCase {
            name: format!("test_can_delete_{}", singular),
            seed: Some(seed(names, 1)),
            method: Some(HttpMethod::Delete),
            uri: member_uri(controller, "destroy"),
            payload: Vec::new(),
            assertions: vec![
                Assertion::Status { code: 204 },
                if document.soft_delete {
                    Assertion::SoftDeleted { table: document.table_name.clone() }
                } else {
                    Assertion::DatabaseMissing { table: document.table_name.clone() }
                },
            ],
        },
    ];

    if names.finder.is_some() {
        cases.push(TestCase {
            name: format!("test_show_returns_404_for_unknown_{}", singular),
            seed: None,
            method: Some(HttpMethod::Get),
            uri: member_uri(controller, "show"),
            payload: Vec::new(),
            assertions: vec![Assertion::Status { code: 404 }],
        });
    }

    TestSuiteDescriptor {
        class: names.feature_test.clone(),
        subject: names.controller.qualified(),
        refresh_database: true,
        cases,
    }
}

/// Derives the validation suite from the store request.
pub fn derive_validation_suite(
    document: &SchemaDocument,
    names: &NameSet,
    store: &RequestDescriptor,
) -> TestSuiteDescriptor {
    let endpoint = Some(names.endpoint.clone());
    let mut cases = Vec::new();

    let rejected = |name: String, payload: Vec<PayloadField>, field: &str, seeded: Option<Seed>| TestCase {
        name,
        seed: seeded,
        method: Some(HttpMethod::Post),
        uri: endpoint.clone(),
        payload,
        assertions: vec![
            Assertion::Status { code: 422 },
            Assertion::ValidationError { field: field.to_string() },
        ],
    };

    for (column, rules) in document.columns.iter().zip(&store.fields) {
        if document.mode == GenerationMode::Create && rules.contains(&Rule::Required) {
            let without: Vec<PayloadField> =
                payload(document).into_iter().filter(|f| f.field != column.name).collect();
            cases.push(rejected(
                format!("test_store_requires_{}", column.name),
                without,
                &column.name,
                None,
            ));
        }

        if let ColumnType::Enum { .. } = column.column_type {
            let invalid: Vec<PayloadField> = payload(document)
                .into_iter()
                .map(|mut f| {
                    if f.field == column.name {
                        f.value = SampleValue::Literal(json!("__invalid__"));
                    }
                    f
                })
                .collect();
            cases.push(rejected(
                format!("test_store_rejects_invalid_{}", column.name),
                invalid,
                &column.name,
                None,
            ));
        }

        let has_unique = rules.rules.iter().any(|r| matches!(r, Rule::Unique { .. }));
        if has_unique {
            let existing = Seed {
                with: vec![PayloadField {
                    field: column.name.clone(),
                    value: sample_value(column),
                }],
                ..seed(names, 1)
            };
            cases.push(rejected(
                format!("test_store_rejects_duplicate_{}", column.name),
                payload(document),
                &column.name,
                Some(existing),
            ));
        }
    }

    TestSuiteDescriptor {
        class: names.validation_test.clone(),
        subject: names.store_request.qualified(),
        refresh_database: true,
        cases,
    }
}

/// Derives the DTO unit suite.
pub fn derive_dto_suite(names: &NameSet, dto: &DtoDescriptor) -> TestSuiteDescriptor {
    let defaults = TestCase {
        name: "test_from_array_applies_defaults".to_string(),
        seed: None,
        method: None,
        uri: None,
        payload: Vec::new(),
        assertions: dto
            .properties
            .iter()
            .map(|p| Assertion::PropertyEquals {
                property: p.name.clone(),
                value: p.default.clone(),
            })
            .collect(),
    };

    let round_trip = TestCase {
        name: "test_to_create_array_contains_every_property".to_string(),
        seed: None,
        method: None,
        uri: None,
        payload: Vec::new(),
        assertions: vec![Assertion::JsonStructure {
            keys: dto.properties.iter().map(|p| p.name.clone()).collect(),
        }],
    };

    TestSuiteDescriptor {
        class: names.dto_test.clone(),
        subject: dto.class.qualified(),
        refresh_database: false,
        cases: vec![defaults, round_trip],
    }
}
