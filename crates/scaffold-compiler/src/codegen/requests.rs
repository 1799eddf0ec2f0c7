//! Request validator descriptors (store, update, index).
//!
//! Rule lists are built in a fixed order: presence rules first, then type
//! rules, then relational rules (`exists`, `unique`).

use std::collections::HashSet;

use serde::Serialize;

use crate::diagnostic::GenerationWarning;
use crate::ir::{
    ColumnSpec, ColumnType, GenerationMode, PrimaryKeySpec, SchemaDocument, SURROGATE_KEY,
    TEXT_MAX_LENGTH,
};
use crate::naming::{ClassName, NameSet};
use super::rules::{Exclusion, FieldRules, Rule};

/// Upper bound for `per_page`.
pub const MAX_PER_PAGE: u32 = 100;
/// Page size used when `per_page` is absent.
pub const DEFAULT_PER_PAGE: u32 = 15;
/// Maximum keyword length.
pub const KEYWORD_MAX_LENGTH: u32 = 100;

/// A store or update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    pub class: ClassName,
    pub fields: Vec<FieldRules>,
    /// True when any field needs a hand-written rule.
    pub needs_review: bool,
}

impl RequestDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldRules> {
        self.fields.iter().find(|f| f.field == name)
    }
}

/// How a list filter compares its parameter with the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Exact,
    /// `column >= value`; dates start at `00:00:00`.
    From,
    /// `column <= value`; dates end at `23:59:59`.
    To,
}

/// One query parameter of the list endpoint that narrows results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub parameter: String,
    pub column: String,
    pub kind: FilterKind,
    /// Whether bounds compare whole days.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub date_bound: bool,
}

/// The list (index) request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRequestDescriptor {
    pub class: ClassName,
    /// Every accepted parameter with its rules, keyword first.
    pub fields: Vec<FieldRules>,
    pub filters: Vec<FilterSpec>,
    pub sort_columns: Vec<String>,
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl IndexRequestDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldRules> {
        self.fields.iter().find(|f| f.field == name)
    }
}

/// Which request a rule list is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Store,
    Update,
}

fn presence_rules(column: &ColumnSpec, mode: GenerationMode, target: Target) -> Vec<Rule> {
    match (target, mode, column.nullable) {
        (Target::Store, GenerationMode::Create, false) => vec![Rule::Required],
        (Target::Store, GenerationMode::Alter, false) => vec![Rule::Sometimes, Rule::Filled],
        (Target::Store, _, true) => vec![Rule::Nullable],
        (Target::Update, _, false) => vec![Rule::Sometimes, Rule::Filled],
        (Target::Update, _, true) => vec![Rule::Sometimes, Rule::Nullable],
    }
}

/// Type rules for a column, including the foreign key existence check.
pub fn type_rules(column: &ColumnSpec) -> Vec<Rule> {
    match &column.column_type {
        ColumnType::String { max_length } => vec![Rule::String, Rule::Max(*max_length)],
        ColumnType::Text => vec![Rule::String, Rule::Max(TEXT_MAX_LENGTH)],
        ColumnType::Integer => match &column.foreign_key {
            Some(fk) => vec![
                Rule::Integer,
                Rule::Min(0),
                Rule::Exists {
                    table: fk.table.clone(),
                    column: fk.column.clone(),
                },
            ],
            None => vec![Rule::Integer],
        },
        ColumnType::Boolean => vec![Rule::Boolean],
        ColumnType::Enum { values } => vec![Rule::In(values.clone())],
        ColumnType::Date | ColumnType::DateTime => vec![Rule::Date],
    }
}

fn field_rules(
    document: &SchemaDocument,
    names: &NameSet,
    column: &ColumnSpec,
    target: Target,
    warnings: &mut Vec<GenerationWarning>,
) -> FieldRules {
    let mut rules = presence_rules(column, document.mode, target);
    rules.extend(type_rules(column));

    let is_key_column = match &document.primary_key {
        PrimaryKeySpec::Composite { columns } => columns.contains(&column.name),
        PrimaryKeySpec::Surrogate => false,
    };

    let exclusion = match (target, &document.primary_key) {
        (Target::Store, _) => Exclusion::None,
        (Target::Update, PrimaryKeySpec::Surrogate) => names
            .route_parameters
            .first()
            .map_or(Exclusion::ManualRequired, |p| Exclusion::RouteParameter(p.name.clone())),
        (Target::Update, PrimaryKeySpec::Composite { .. }) => Exclusion::ManualRequired,
    };

    let mut needs_review = false;
    if column.unique {
        if exclusion == Exclusion::ManualRequired {
            needs_review = true;
        }
        rules.push(Rule::Unique {
            table: document.table_name.clone(),
            column: column.name.clone(),
            exclusion,
        });
    } else if target == Target::Update && is_key_column {
        // The key tuple is unique even when no single column is.
        needs_review = true;
    }

    if needs_review {
        warnings.push(GenerationWarning::UnsupportedAutoExclusion {
            table: document.table_name.clone(),
            column: column.name.clone(),
            request: names.update_request.qualified(),
        });
    }

    FieldRules {
        field: column.name.clone(),
        rules,
        needs_review,
    }
}

fn request(
    document: &SchemaDocument,
    names: &NameSet,
    class: &ClassName,
    target: Target,
    warnings: &mut Vec<GenerationWarning>,
) -> RequestDescriptor {
    // An alter document only carries the columns it touches.
    let fields: Vec<FieldRules> = document
        .columns
        .iter()
        .map(|column| field_rules(document, names, column, target, warnings))
        .collect();
    RequestDescriptor {
        class: class.clone(),
        needs_review: fields.iter().any(|f| f.needs_review),
        fields,
    }
}

/// Derives the store request.
pub fn derive_store_request(document: &SchemaDocument, names: &NameSet) -> RequestDescriptor {
    request(document, names, &names.store_request, Target::Store, &mut Vec::new())
}

/// Derives the update request and any manual-exclusion warnings.
pub fn derive_update_request(
    document: &SchemaDocument,
    names: &NameSet,
) -> (RequestDescriptor, Vec<GenerationWarning>) {
    let mut warnings = Vec::new();
    let descriptor = request(document, names, &names.update_request, Target::Update, &mut warnings);
    (descriptor, warnings)
}

/// Fixed list-endpoint parameters alongside the column filters.
pub const LIST_PARAMETERS: [&str; 4] = ["keyword", "sort_by", "sort_order", "per_page"];

/// Filters offered by the list endpoint, in column order.
///
/// Text columns get none; they are reached through the keyword search.
/// Filters whose parameter is already taken are left out, see
/// [`filter_warnings`].
pub fn filter_specs(document: &SchemaDocument) -> Vec<FilterSpec> {
    plan_filters(document).0
}

/// One warning per filter left out because its query parameter is taken.
pub fn filter_warnings(document: &SchemaDocument) -> Vec<GenerationWarning> {
    plan_filters(document).1
}

/// Fixed parameters win over column filters, and exact filters win over
/// range pairs. A range pair is kept or dropped as a whole.
fn plan_filters(document: &SchemaDocument) -> (Vec<FilterSpec>, Vec<GenerationWarning>) {
    let mut taken: HashSet<String> = LIST_PARAMETERS.iter().map(|p| p.to_string()).collect();
    let mut warnings = Vec::new();
    let dropped = |column: &ColumnSpec, parameter: &str| GenerationWarning::FilterDropped {
        table: document.table_name.clone(),
        column: column.name.clone(),
        parameter: parameter.to_string(),
    };

    let mut candidates = Vec::new();
    for column in &document.columns {
        let ranged = match &column.column_type {
            ColumnType::Text => continue,
            ColumnType::String { .. } | ColumnType::Enum { .. } | ColumnType::Boolean => false,
            ColumnType::Integer => column.foreign_key.is_none(),
            ColumnType::Date | ColumnType::DateTime => true,
        };
        let exact = !taken.contains(&column.name);
        if exact {
            taken.insert(column.name.clone());
        } else {
            warnings.push(dropped(column, &column.name));
        }
        candidates.push((column, exact, ranged));
    }

    let mut filters = Vec::new();
    for (column, exact, ranged) in candidates {
        if exact {
            filters.push(FilterSpec {
                parameter: column.name.clone(),
                column: column.name.clone(),
                kind: FilterKind::Exact,
                date_bound: false,
            });
        }
        if !ranged {
            continue;
        }

        let from = format!("{}_from", column.name);
        let to = format!("{}_to", column.name);
        if let Some(clash) = [&from, &to].into_iter().find(|p| taken.contains(*p)) {
            warnings.push(dropped(column, clash));
            continue;
        }
        taken.insert(from.clone());
        taken.insert(to.clone());

        let date_bound = column.column_type.is_temporal();
        for (parameter, kind) in [(from, FilterKind::From), (to, FilterKind::To)] {
            filters.push(FilterSpec {
                parameter,
                column: column.name.clone(),
                kind,
                date_bound,
            });
        }
    }

    (filters, warnings)
}

/// Columns the list endpoint may sort by.
pub fn sort_columns(document: &SchemaDocument) -> Vec<String> {
    let mut columns = Vec::new();
    if !document.primary_key.is_composite() {
        columns.push(SURROGATE_KEY.to_string());
    }
    if document.timestamps {
        columns.push("created_at".to_string());
    }
    columns.extend(document.columns.iter().map(|c| c.name.clone()));
    columns
}

/// Derives the list request.
pub fn derive_index_request(document: &SchemaDocument, names: &NameSet) -> IndexRequestDescriptor {
    let filters = filter_specs(document);
    let sort = sort_columns(document);

    let mut fields = vec![FieldRules::new(
        "keyword",
        vec![Rule::Nullable, Rule::String, Rule::Max(KEYWORD_MAX_LENGTH)],
    )];

    for filter in &filters {
        let Some(column) = document.column(&filter.column) else {
            continue;
        };
        let mut rules = vec![Rule::Nullable];
        match (&column.column_type, filter.kind) {
            (ColumnType::Integer, FilterKind::From | FilterKind::To) => rules.push(Rule::Integer),
            (_, FilterKind::Exact) => rules.extend(type_rules(column)),
            _ => rules.push(Rule::Date),
        }
        if filter.kind == FilterKind::To && filter.date_bound {
            rules.push(Rule::AfterOrEqual(format!("{}_from", column.name)));
        }
        fields.push(FieldRules::new(filter.parameter.clone(), rules));
    }

    fields.push(FieldRules::new("sort_by", vec![Rule::Nullable, Rule::In(sort.clone())]));
    fields.push(FieldRules::new(
        "sort_order",
        vec![Rule::Nullable, Rule::In(vec!["asc".to_string(), "desc".to_string()])],
    ));
    fields.push(FieldRules::new(
        "per_page",
        vec![Rule::Nullable, Rule::Integer, Rule::Min(1), Rule::Max(MAX_PER_PAGE)],
    ));

    IndexRequestDescriptor {
        class: names.index_request.clone(),
        fields,
        filters,
        sort_columns: sort,
        default_per_page: DEFAULT_PER_PAGE,
        max_per_page: MAX_PER_PAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::fixtures;
    use crate::naming::derive_names;

    #[test]
    fn test_create_store_requires_non_null_columns() {
        let doc = fixtures::posts();
        let store = derive_store_request(&doc, &derive_names(&doc));

        for column in doc.columns.iter().filter(|c| !c.nullable) {
            let field = store.field(&column.name).unwrap();
            assert!(field.contains(&Rule::Required), "{} should be required", column.name);
            assert!(!field.contains(&Rule::Nullable));
        }
        assert_eq!(store.field("body").unwrap().pipe(), "nullable|string|max:65535");
        assert_eq!(store.field("user_id").unwrap().pipe(), "required|integer|min:0|exists:users,id");
        assert_eq!(store.field("slug").unwrap().pipe(), "required|string|max:255|unique:posts,slug");
        assert_eq!(store.field("status").unwrap().pipe(), "required|in:draft,published,archived");
        assert!(!store.needs_review);
    }

    #[test]
    fn test_update_uses_optional_semantics() {
        let doc = fixtures::posts();
        let (update, warnings) = derive_update_request(&doc, &derive_names(&doc));

        assert_eq!(update.field("title").unwrap().pipe(), "sometimes|filled|string|max:255");
        assert_eq!(update.field("body").unwrap().pipe(), "sometimes|nullable|string|max:65535");
        assert_eq!(
            update.field("slug").unwrap().pipe(),
            "sometimes|filled|string|max:255|unique:posts,slug,{post}"
        );
        assert!(update.fields.iter().all(|f| !f.contains(&Rule::Required)));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_alter_never_requires() {
        let mut doc = fixtures::posts();
        doc.mode = GenerationMode::Alter;
        let names = derive_names(&doc);

        let store = derive_store_request(&doc, &names);
        let (update, _) = derive_update_request(&doc, &names);
        for column in doc.columns.iter().filter(|c| !c.nullable) {
            let rules = update.field(&column.name).unwrap();
            assert!(rules.contains(&Rule::Sometimes) && rules.contains(&Rule::Filled));
            assert!(!rules.contains(&Rule::Required));
            assert!(!store.field(&column.name).unwrap().contains(&Rule::Required));
        }
    }

    #[test]
    fn test_composite_unique_is_flagged_not_excluded() {
        let doc = fixtures::rooms();
        let names = derive_names(&doc);
        let (update, warnings) = derive_update_request(&doc, &names);

        for key in ["region", "facility_code", "room_number"] {
            let field = update.field(key).unwrap();
            assert!(field.needs_review);
            assert!(field.pipe().ends_with(&format!("unique:rooms,{}", key)));
        }
        assert!(!update.field("name").unwrap().needs_review);
        assert!(update.needs_review);
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().all(|w| matches!(
            w,
            GenerationWarning::UnsupportedAutoExclusion { table, .. } if table == "rooms"
        )));

        let store = derive_store_request(&doc, &names);
        assert_eq!(store.field("region").unwrap().pipe(), "required|string|max:50|unique:rooms,region");
        assert!(!store.needs_review);
    }

    #[test]
    fn test_index_request_parameters() {
        let doc = fixtures::posts();
        let index = derive_index_request(&doc, &derive_names(&doc));

        let params: Vec<&str> = index.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            params,
            vec![
                "keyword",
                "user_id",
                "title",
                "slug",
                "status",
                "published_at",
                "published_at_from",
                "published_at_to",
                "sort_by",
                "sort_order",
                "per_page",
            ]
        );
        assert_eq!(index.field("keyword").unwrap().pipe(), "nullable|string|max:100");
        assert_eq!(
            index.field("published_at_to").unwrap().pipe(),
            "nullable|date|after_or_equal:published_at_from"
        );
        assert_eq!(
            index.field("sort_by").unwrap().pipe(),
            "nullable|in:id,created_at,user_id,title,slug,body,status,published_at"
        );
        assert_eq!(index.field("per_page").unwrap().pipe(), "nullable|integer|min:1|max:100");
    }

    #[test]
    fn test_integer_range_filters() {
        let doc = fixtures::rooms();
        let index = derive_index_request(&doc, &derive_names(&doc));

        assert_eq!(index.field("capacity_from").unwrap().pipe(), "nullable|integer");
        assert_eq!(index.field("capacity_to").unwrap().pipe(), "nullable|integer");
        assert_eq!(index.sort_columns[0], "created_at");
        assert!(!index.sort_columns.contains(&"id".to_string()));
    }

    #[test]
    fn test_colliding_filters_are_dropped_with_warning() {
        let mut doc = SchemaDocument::new("products");
        doc.columns = vec![
            ColumnSpec::new("price", ColumnType::Integer),
            ColumnSpec::new("price_from", ColumnType::Integer),
            ColumnSpec::new("keyword", ColumnType::String { max_length: 50 }),
            ColumnSpec::new("sort_order", ColumnType::Integer),
        ];
        let index = derive_index_request(&doc, &derive_names(&doc));

        let params: Vec<&str> = index.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            params,
            vec![
                "keyword",
                "price",
                "price_from",
                "price_from_from",
                "price_from_to",
                "sort_order_from",
                "sort_order_to",
                "sort_by",
                "sort_order",
                "per_page",
            ]
        );
        let distinct: HashSet<&str> = params.iter().copied().collect();
        assert_eq!(distinct.len(), params.len());

        // The exact `price_from` filter belongs to the declared column.
        let price_from = index.filters.iter().find(|f| f.parameter == "price_from").unwrap();
        assert_eq!(price_from.column, "price_from");
        assert_eq!(price_from.kind, FilterKind::Exact);

        let dropped: Vec<(String, String)> = filter_warnings(&doc)
            .into_iter()
            .filter_map(|w| match w {
                GenerationWarning::FilterDropped { column, parameter, .. } => Some((column, parameter)),
                _ => None,
            })
            .collect();
        assert_eq!(
            dropped,
            vec![
                ("keyword".to_string(), "keyword".to_string()),
                ("sort_order".to_string(), "sort_order".to_string()),
                ("price".to_string(), "price_from".to_string()),
            ]
        );
    }
}
