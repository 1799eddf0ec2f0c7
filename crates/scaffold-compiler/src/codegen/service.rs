//! CRUD and search service descriptor.

use serde::Serialize;

use crate::ir::{ColumnType, PrimaryKeySpec, SchemaDocument, SURROGATE_KEY};
use crate::naming::{ClassName, NameSet, RouteParameter};
use super::requests::{filter_specs, FilterSpec, DEFAULT_PER_PAGE};

/// Time appended to a date used as a lower bound.
pub const RANGE_START_TIME: &str = "00:00:00";
/// Time appended to a date used as an upper bound.
pub const RANGE_END_TIME: &str = "23:59:59";

/// How a single row is found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Lookup {
    /// The framework resolves the row from the route parameter.
    RouteBinding { parameter: String },
    /// The service queries by every key column.
    CompositeKey {
        finder: String,
        parameters: Vec<RouteParameter>,
    },
}

/// How a write reaches the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WriteStrategy {
    /// Fill the bound model, save it and reload it.
    FillSaveRefresh,
    /// Delete through the bound model.
    ModelDelete,
    /// Query constrained by every key column, then re-fetch.
    KeyConstrainedQuery { columns: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum ServiceOperation {
    Search,
    Find { lookup: Lookup },
    Create,
    Update { lookup: Lookup, strategy: WriteStrategy },
    Delete { lookup: Lookup, strategy: WriteStrategy, soft: bool },
}

impl ServiceOperation {
    pub fn name(&self) -> &'static str {
        match self {
            ServiceOperation::Search => "search",
            ServiceOperation::Find { .. } => "find",
            ServiceOperation::Create => "create",
            ServiceOperation::Update { .. } => "update",
            ServiceOperation::Delete { .. } => "delete",
        }
    }
}

/// Parameters of the `search` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSpec {
    /// Columns matched by the keyword with a substring search.
    pub keyword_columns: Vec<String>,
    pub filters: Vec<FilterSpec>,
    pub default_sort_by: String,
    pub default_sort_order: String,
    pub default_per_page: u32,
    pub range_start_time: String,
    pub range_end_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptor {
    pub class: ClassName,
    pub model: String,
    pub dto: String,
    pub search: SearchSpec,
    pub operations: Vec<ServiceOperation>,
}

impl ServiceDescriptor {
    pub fn operation(&self, name: &str) -> Option<&ServiceOperation> {
        self.operations.iter().find(|op| op.name() == name)
    }
}

/// The lookup every member operation uses; shared with the controller.
pub fn member_lookup(names: &NameSet) -> Lookup {
    match &names.finder {
        Some(finder) => Lookup::CompositeKey {
            finder: finder.clone(),
            parameters: names.route_parameters.clone(),
        },
        None => Lookup::RouteBinding {
            parameter: names
                .route_parameters
                .first()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| names.singular.clone()),
        },
    }
}

/// Derives the service descriptor.
pub fn derive_service(document: &SchemaDocument, names: &NameSet) -> ServiceDescriptor {
    let keyword_columns = document
        .columns
        .iter()
        .filter(|c| matches!(c.column_type, ColumnType::String { .. } | ColumnType::Text))
        .map(|c| c.name.clone())
        .collect();

    let default_sort_by = if document.timestamps {
        "created_at".to_string()
    } else {
        document
            .primary_key
            .columns()
            .first()
            .map_or(SURROGATE_KEY, |c| *c)
            .to_string()
    };

    let lookup = member_lookup(names);
    let operations = match &document.primary_key {
        PrimaryKeySpec::Surrogate => vec![
            ServiceOperation::Search,
            ServiceOperation::Create,
            ServiceOperation::Update {
                lookup: lookup.clone(),
                strategy: WriteStrategy::FillSaveRefresh,
            },
            ServiceOperation::Delete {
                lookup,
                strategy: WriteStrategy::ModelDelete,
                soft: document.soft_delete,
            },
        ],
        PrimaryKeySpec::Composite { columns } => vec![
            ServiceOperation::Search,
            ServiceOperation::Find { lookup: lookup.clone() },
            ServiceOperation::Create,
            ServiceOperation::Update {
                lookup: lookup.clone(),
                strategy: WriteStrategy::KeyConstrainedQuery { columns: columns.clone() },
            },
            ServiceOperation::Delete {
                lookup,
                strategy: WriteStrategy::KeyConstrainedQuery { columns: columns.clone() },
                soft: document.soft_delete,
            },
        ],
    };

    ServiceDescriptor {
        class: names.service.clone(),
        model: names.model.qualified(),
        dto: names.dto.qualified(),
        search: SearchSpec {
            keyword_columns,
            filters: filter_specs(document),
            default_sort_by,
            default_sort_order: "desc".to_string(),
            default_per_page: DEFAULT_PER_PAGE,
            range_start_time: RANGE_START_TIME.to_string(),
            range_end_time: RANGE_END_TIME.to_string(),
        },
        operations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::fixtures;
    use crate::naming::{derive_names, COMPOSITE_FINDER};

    #[test]
    fn test_surrogate_service_uses_route_binding() {
        let doc = fixtures::posts();
        let service = derive_service(&doc, &derive_names(&doc));

        let ops: Vec<&str> = service.operations.iter().map(ServiceOperation::name).collect();
        assert_eq!(ops, vec!["search", "create", "update", "delete"]);
        assert!(matches!(
            service.operation("update"),
            Some(ServiceOperation::Update {
                lookup: Lookup::RouteBinding { parameter },
                strategy: WriteStrategy::FillSaveRefresh,
            }) if parameter == "post"
        ));
        assert!(matches!(service.operation("delete"), Some(ServiceOperation::Delete { soft: true, .. })));
        assert_eq!(service.search.keyword_columns, vec!["title", "slug", "body"]);
        assert_eq!(service.search.default_sort_by, "created_at");
        assert_eq!(service.search.default_per_page, 15);
    }

    #[test]
    fn test_composite_service_uses_finder() {
        let doc = fixtures::rooms();
        let service = derive_service(&doc, &derive_names(&doc));

        let Some(ServiceOperation::Find { lookup: Lookup::CompositeKey { finder, parameters } }) =
            service.operation("find")
        else {
            panic!("expected composite finder");
        };
        assert_eq!(finder, COMPOSITE_FINDER);
        assert_eq!(parameters.len(), 3);
        assert!(matches!(
            service.operation("delete"),
            Some(ServiceOperation::Delete {
                strategy: WriteStrategy::KeyConstrainedQuery { columns },
                ..
            }) if columns.len() == 3
        ));
    }

    #[test]
    fn test_default_sort_without_timestamps() {
        let mut doc = fixtures::rooms();
        doc.timestamps = false;
        let service = derive_service(&doc, &derive_names(&doc));
        assert_eq!(service.search.default_sort_by, "region");
    }
}
