//! Artifact derivation from schema IR.
//!
//! Every deriver is a pure function of the document and its `NameSet`. The
//! output is a set of structured descriptors, not source text: rendering a
//! descriptor into framework code is the job of an `Emitter`.
//!
//! A fresh table yields the full vertical slice:
//! - Migration, model, DTO
//! - Store / update / index requests
//! - Resource, service, controller, routes
//! - Factory and the three test suites
//!
//! An alter request yields only the migration and the store / update
//! requests for the columns it touches.

mod controller;
mod dto;
mod emit;
mod factory;
mod migration;
mod model;
mod requests;
mod resource;
mod rules;
mod scenarios;
mod service;

pub use controller::{
    ControllerAction, ControllerDescriptor, HttpMethod, Registration, ResponseShape, RouteDescriptor,
    RouteEntry,
};
pub use dto::{DtoDescriptor, DtoProperty, PropertyType};
pub use emit::{EmitStatus, EmittedFile, Emitter, JsonEmitter, OverwritePolicy};
pub(crate) use emit::write_file;
pub use factory::{FactoryDescriptor, FactoryField, Generator};
pub use migration::{
    ColumnDefinition, Guard, IndexDefinition, MigrationOp, MigrationPlan, PrimaryKeyDefinition,
};
pub use model::{Cast, CastKind, ModelDescriptor, ModelKey, ModelRelation};
pub use requests::{FilterKind, FilterSpec, IndexRequestDescriptor, RequestDescriptor, LIST_PARAMETERS};
pub use resource::{ResourceDescriptor, ResourceField, ValueFormat};
pub use rules::{Exclusion, FieldRules, Rule};
pub use scenarios::{Assertion, PayloadField, SampleValue, Seed, TestCase, TestSuiteDescriptor};
pub use service::{Lookup, SearchSpec, ServiceDescriptor, ServiceOperation, WriteStrategy};

use serde::Serialize;
use tracing::debug;

use crate::diagnostic::GenerationWarning;
use crate::ir::{GenerationMode, SchemaDocument};
use crate::naming::NameSet;

/// Kinds of generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Migration,
    Model,
    Dto,
    StoreRequest,
    UpdateRequest,
    IndexRequest,
    Resource,
    Service,
    Controller,
    Routes,
    Factory,
    FeatureTest,
    ValidationTest,
    DtoTest,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Migration => "migration",
            ArtifactKind::Model => "model",
            ArtifactKind::Dto => "dto",
            ArtifactKind::StoreRequest => "store_request",
            ArtifactKind::UpdateRequest => "update_request",
            ArtifactKind::IndexRequest => "index_request",
            ArtifactKind::Resource => "resource",
            ArtifactKind::Service => "service",
            ArtifactKind::Controller => "controller",
            ArtifactKind::Routes => "routes",
            ArtifactKind::Factory => "factory",
            ArtifactKind::FeatureTest => "feature_test",
            ArtifactKind::ValidationTest => "validation_test",
            ArtifactKind::DtoTest => "dto_test",
        }
    }
}

/// One derived artifact descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "descriptor", rename_all = "snake_case")]
pub enum Artifact {
    Migration(MigrationPlan),
    Model(ModelDescriptor),
    Dto(DtoDescriptor),
    StoreRequest(RequestDescriptor),
    UpdateRequest(RequestDescriptor),
    IndexRequest(IndexRequestDescriptor),
    Resource(ResourceDescriptor),
    Service(ServiceDescriptor),
    Controller(ControllerDescriptor),
    Routes(RouteDescriptor),
    Factory(FactoryDescriptor),
    FeatureTest(TestSuiteDescriptor),
    ValidationTest(TestSuiteDescriptor),
    DtoTest(TestSuiteDescriptor),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Migration(_) => ArtifactKind::Migration,
            Artifact::Model(_) => ArtifactKind::Model,
            Artifact::Dto(_) => ArtifactKind::Dto,
            Artifact::StoreRequest(_) => ArtifactKind::StoreRequest,
            Artifact::UpdateRequest(_) => ArtifactKind::UpdateRequest,
            Artifact::IndexRequest(_) => ArtifactKind::IndexRequest,
            Artifact::Resource(_) => ArtifactKind::Resource,
            Artifact::Service(_) => ArtifactKind::Service,
            Artifact::Controller(_) => ArtifactKind::Controller,
            Artifact::Routes(_) => ArtifactKind::Routes,
            Artifact::Factory(_) => ArtifactKind::Factory,
            Artifact::FeatureTest(_) => ArtifactKind::FeatureTest,
            Artifact::ValidationTest(_) => ArtifactKind::ValidationTest,
            Artifact::DtoTest(_) => ArtifactKind::DtoTest,
        }
    }

    /// What the artifact defines: a class name, migration name or route file.
    pub fn identifier(&self) -> String {
        match self {
            Artifact::Migration(plan) => plan.name.clone(),
            Artifact::Model(d) => d.class.qualified(),
            Artifact::Dto(d) => d.class.qualified(),
            Artifact::StoreRequest(d) | Artifact::UpdateRequest(d) => d.class.qualified(),
            Artifact::IndexRequest(d) => d.class.qualified(),
            Artifact::Resource(d) => d.class.qualified(),
            Artifact::Service(d) => d.class.qualified(),
            Artifact::Controller(d) => d.class.qualified(),
            Artifact::Routes(d) => d.endpoint.clone(),
            Artifact::Factory(d) => d.class.qualified(),
            Artifact::FeatureTest(d) | Artifact::ValidationTest(d) | Artifact::DtoTest(d) => {
                d.class.qualified()
            }
        }
    }

    /// Where the rendered source would live in the target project.
    pub fn target_path(&self) -> String {
        match self {
            Artifact::Migration(plan) => format!("database/migrations/{}.php", plan.name),
            Artifact::Model(d) => d.class.path.clone(),
            Artifact::Dto(d) => d.class.path.clone(),
            Artifact::StoreRequest(d) | Artifact::UpdateRequest(d) => d.class.path.clone(),
            Artifact::IndexRequest(d) => d.class.path.clone(),
            Artifact::Resource(d) => d.class.path.clone(),
            Artifact::Service(d) => d.class.path.clone(),
            Artifact::Controller(d) => d.class.path.clone(),
            Artifact::Routes(d) => d.file.clone(),
            Artifact::Factory(d) => d.class.path.clone(),
            Artifact::FeatureTest(d) | Artifact::ValidationTest(d) | Artifact::DtoTest(d) => {
                d.class.path.clone()
            }
        }
    }
}

/// Every descriptor derived for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSet {
    pub artifacts: Vec<Artifact>,
    pub warnings: Vec<GenerationWarning>,
}

impl ArtifactSet {
    pub fn get(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.kind() == kind)
    }

    pub fn kinds(&self) -> Vec<ArtifactKind> {
        self.artifacts.iter().map(Artifact::kind).collect()
    }
}

/// Derives every artifact for the document's mode.
pub fn generate(document: &SchemaDocument, names: &NameSet) -> ArtifactSet {
    let mut artifacts = Vec::new();

    artifacts.push(Artifact::Migration(migration::derive_migration(document, names)));

    let store = requests::derive_store_request(document, names);
    let (update, mut warnings) = requests::derive_update_request(document, names);

    if document.mode == GenerationMode::Create {
        let dto = dto::derive_dto(document, names);
        let resource = resource::derive_resource(document, names);
        let controller = controller::derive_controller(names);
        let routes = controller::derive_routes(names, &controller);

        let feature = scenarios::derive_feature_suite(document, names, &controller, &resource.keys());
        let validation = scenarios::derive_validation_suite(document, names, &store);
        let dto_suite = scenarios::derive_dto_suite(names, &dto);
        warnings.extend(requests::filter_warnings(document));

        artifacts.push(Artifact::Model(model::derive_model(document, names)));
        artifacts.push(Artifact::Dto(dto));
        artifacts.push(Artifact::StoreRequest(store));
        artifacts.push(Artifact::UpdateRequest(update));
        artifacts.push(Artifact::IndexRequest(requests::derive_index_request(document, names)));
        artifacts.push(Artifact::Resource(resource));
        artifacts.push(Artifact::Service(service::derive_service(document, names)));
        artifacts.push(Artifact::Controller(controller));
        artifacts.push(Artifact::Routes(routes));
        artifacts.push(Artifact::Factory(factory::derive_factory(document, names)));
        artifacts.push(Artifact::FeatureTest(feature));
        artifacts.push(Artifact::ValidationTest(validation));
        artifacts.push(Artifact::DtoTest(dto_suite));
    } else {
        artifacts.push(Artifact::StoreRequest(store));
        artifacts.push(Artifact::UpdateRequest(update));
    }

    debug!(
        table = %document.table_name,
        mode = document.mode.as_str(),
        artifacts = artifacts.len(),
        warnings = warnings.len(),
        "derived artifacts"
    );

    ArtifactSet { artifacts, warnings }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::ir::{
        ColumnSpec, ColumnType, DefaultValue, IndexSpec, OnDelete, PrimaryKeySpec, RelationKind,
        RelationSpec, SchemaDocument,
    };

    /// Surrogate-keyed, soft-deleting posts table.
    pub fn posts() -> SchemaDocument {
        let mut doc = SchemaDocument::new("posts");
        doc.soft_delete = true;

        let mut user_id = ColumnSpec::new("user_id", ColumnType::Integer).references("users", "id");
        if let Some(fk) = user_id.foreign_key.as_mut() {
            fk.on_delete = Some(OnDelete::Cascade);
        }

        doc.columns = vec![
            user_id,
            ColumnSpec::new("title", ColumnType::String { max_length: 255 }),
            ColumnSpec::new("slug", ColumnType::String { max_length: 255 }).unique(),
            ColumnSpec::new("body", ColumnType::Text).nullable(),
            ColumnSpec::new(
                "status",
                ColumnType::Enum {
                    values: vec!["draft".into(), "published".into(), "archived".into()],
                },
            )
            .with_default(DefaultValue::String("draft".into())),
            ColumnSpec::new("published_at", ColumnType::DateTime).nullable(),
        ];
        doc.indexes = vec![IndexSpec::new(vec!["user_id".into(), "status".into()])];
        doc.relations = vec![
            RelationSpec {
                kind: RelationKind::BelongsTo,
                target_table: "users".into(),
                pivot_table: None,
                foreign_key: None,
            },
            RelationSpec {
                kind: RelationKind::HasMany,
                target_table: "comments".into(),
                pivot_table: None,
                foreign_key: None,
            },
            RelationSpec {
                kind: RelationKind::BelongsToMany,
                target_table: "tags".into(),
                pivot_table: Some("post_tag".into()),
                foreign_key: None,
            },
        ];
        doc
    }

    /// Composite-keyed rooms table on the v2 surface.
    pub fn rooms() -> SchemaDocument {
        let mut doc = SchemaDocument::new("rooms");
        doc.api_version = Some("v2".into());
        doc.soft_delete = true;
        doc.primary_key = PrimaryKeySpec::Composite {
            columns: vec!["region".into(), "facility_code".into(), "room_number".into()],
        };
        doc.columns = vec![
            ColumnSpec::new("region", ColumnType::String { max_length: 50 }).unique(),
            ColumnSpec::new("facility_code", ColumnType::String { max_length: 10 }).unique(),
            ColumnSpec::new("room_number", ColumnType::String { max_length: 10 }).unique(),
            ColumnSpec::new("name", ColumnType::String { max_length: 100 }),
            ColumnSpec::new("capacity", ColumnType::Integer),
            ColumnSpec::new("is_active", ColumnType::Boolean).with_default(DefaultValue::Boolean(true)),
        ];
        doc
    }
}
