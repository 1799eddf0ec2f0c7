//! Deterministic naming for every generated artifact.
//!
//! Names are computed once per document and shared by every deriver, so
//! a controller, its routes and its tests can never disagree about a class
//! name or the number of path parameters.

mod inflect;

pub use inflect::{pluralize, singularize, to_camel_case, to_kebab_case, to_pascal_case, to_snake_case};

use serde::Serialize;

use crate::ir::{GenerationMode, PrimaryKeySpec, SchemaDocument};

/// Name of the service-level lookup used for composite keys.
pub const COMPOSITE_FINDER: &str = "findByCompositeKey";

/// A generated class: namespace, short name and file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassName {
    pub namespace: String,
    pub name: String,
    pub path: String,
}

impl ClassName {
    fn new(namespace: &[&str], dir: &[&str], name: String) -> Self {
        let mut path = dir.join("/");
        path.push('/');
        path.push_str(&name);
        path.push_str(".php");
        Self {
            namespace: namespace.join("\\"),
            name,
            path,
        }
    }

    /// Fully qualified class name.
    pub fn qualified(&self) -> String {
        format!("{}\\{}", self.namespace, self.name)
    }
}

/// One path parameter in a member route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteParameter {
    /// Placeholder in the route URI (`{region}`).
    pub name: String,
    /// Handler argument name (camelCase).
    pub argument: String,
    /// Key column this parameter resolves.
    pub column: String,
}

/// Every identifier derived from a table name, API version and key shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameSet {
    pub table: String,
    pub singular: String,
    pub plural: String,
    /// PascalCase singular entity name (`FavoritePoint`).
    pub entity: String,
    /// Namespace segment for the API version (`V2`).
    pub version_namespace: Option<String>,

    pub model: ClassName,
    pub dto: ClassName,
    pub service: ClassName,
    pub controller: ClassName,
    pub store_request: ClassName,
    pub update_request: ClassName,
    pub index_request: ClassName,
    pub resource: ClassName,
    pub factory: ClassName,
    pub feature_test: ClassName,
    pub validation_test: ClassName,
    pub dto_test: ClassName,

    /// Migration name, without the timestamp prefix.
    pub migration: String,

    /// Collection URI relative to the API routes file (`v2/rooms`).
    pub route_uri: String,
    /// Full collection endpoint (`/api/v2/rooms`).
    pub endpoint: String,
    /// Member route parameters: one per key column for composite keys.
    pub route_parameters: Vec<RouteParameter>,
    /// Composite-key finder, absent for surrogate keys.
    pub finder: Option<String>,
}

impl NameSet {
    /// Member URI relative to the API routes file (`v2/rooms/{region}/...`).
    pub fn member_uri(&self) -> String {
        let mut uri = self.route_uri.clone();
        for param in &self.route_parameters {
            uri.push_str("/{");
            uri.push_str(&param.name);
            uri.push('}');
        }
        uri
    }

    /// Full member endpoint (`/api/v2/rooms/{region}/...`).
    pub fn member_endpoint(&self) -> String {
        format!("/api/{}", self.member_uri())
    }
}

fn versioned<'a>(base: &[&'a str], version: Option<&'a str>) -> Vec<&'a str> {
    let mut segments = base.to_vec();
    segments.extend(version);
    segments
}

/// Derives the full name set for a document.
pub fn derive_names(document: &SchemaDocument) -> NameSet {
    let table = document.table_name.clone();
    let singular = singularize(&table);
    let plural = pluralize(&singular);
    let entity = to_pascal_case(&singular);

    let version_namespace = document.api_version.as_deref().map(to_pascal_case);
    let version_path = document.api_version.as_deref().map(str::to_ascii_lowercase);
    let v = version_namespace.as_deref();

    let request_ns = {
        let mut ns = versioned(&["App", "Http", "Requests", "Api"], v);
        ns.push(&entity);
        ns
    };
    let request_dir = {
        let mut dir = versioned(&["app", "Http", "Requests", "Api"], v);
        dir.push(&entity);
        dir
    };

    let model = ClassName::new(&["App", "Models"], &["app", "Models"], entity.clone());
    let dto = ClassName::new(&versioned(&["App", "DTOs"], v), &versioned(&["app", "DTOs"], v), format!("{}DTO", entity));
    let service = ClassName::new(
        &versioned(&["App", "Services"], v),
        &versioned(&["app", "Services"], v),
        format!("{}Service", entity),
    );
    let controller = ClassName::new(
        &versioned(&["App", "Http", "Controllers", "Api"], v),
        &versioned(&["app", "Http", "Controllers", "Api"], v),
        format!("Api{}Controller", entity),
    );
    let store_request = ClassName::new(&request_ns, &request_dir, "StoreRequest".to_string());
    let update_request = ClassName::new(&request_ns, &request_dir, "UpdateRequest".to_string());
    let index_request = ClassName::new(&request_ns, &request_dir, "IndexRequest".to_string());
    let resource = ClassName::new(
        &versioned(&["App", "Http", "Resources"], v),
        &versioned(&["app", "Http", "Resources"], v),
        format!("{}Resource", entity),
    );
    let factory = ClassName::new(
        &["Database", "Factories"],
        &["database", "factories"],
        format!("{}Factory", entity),
    );
    let feature_test = ClassName::new(
        &versioned(&["Tests", "Feature", "Api"], v),
        &versioned(&["tests", "Feature", "Api"], v),
        format!("{}ApiTest", entity),
    );
    let validation_test = ClassName::new(
        &versioned(&["Tests", "Feature", "Api"], v),
        &versioned(&["tests", "Feature", "Api"], v),
        format!("{}ApiValidationTest", entity),
    );
    let dto_test = ClassName::new(
        &versioned(&["Tests", "Unit", "DTOs"], v),
        &versioned(&["tests", "Unit", "DTOs"], v),
        format!("{}DTOTest", entity),
    );

    let migration = match document.mode {
        GenerationMode::Create => format!("create_{}_table", table),
        GenerationMode::Alter if document.source_name != table => document.source_name.clone(),
        GenerationMode::Alter => format!("alter_{}_table", table),
    };

    let segment = to_kebab_case(&plural);
    let route_uri = match &version_path {
        Some(version) => format!("{}/{}", version, segment),
        None => segment,
    };
    let endpoint = format!("/api/{}", route_uri);

    let (route_parameters, finder) = match &document.primary_key {
        PrimaryKeySpec::Surrogate => (
            vec![RouteParameter {
                name: singular.clone(),
                argument: to_camel_case(&singular),
                column: crate::ir::SURROGATE_KEY.to_string(),
            }],
            None,
        ),
        PrimaryKeySpec::Composite { columns } => (
            columns
                .iter()
                .map(|column| RouteParameter {
                    name: column.clone(),
                    argument: to_camel_case(column),
                    column: column.clone(),
                })
                .collect(),
            Some(COMPOSITE_FINDER.to_string()),
        ),
    };

    NameSet {
        table,
        singular,
        plural,
        entity,
        version_namespace,
        model,
        dto,
        service,
        controller,
        store_request,
        update_request,
        index_request,
        resource,
        factory,
        feature_test,
        validation_test,
        dto_test,
        migration,
        route_uri,
        endpoint,
        route_parameters,
        finder,
    }
}
