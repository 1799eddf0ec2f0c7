//! Controller and route registration descriptors.
//!
//! Both are driven by the route parameters in the `NameSet`: one parameter
//! for surrogate keys, one per key column for composite keys.

use serde::Serialize;

use crate::naming::{ClassName, NameSet, RouteParameter};
use super::service::{member_lookup, Lookup};

/// File the routes are registered in.
pub const ROUTES_FILE: &str = "routes/api.php";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// What an action responds with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// Paginated resource collection.
    Collection,
    Item,
    NoContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerAction {
    pub name: String,
    pub method: HttpMethod,
    /// URI relative to the API routes file.
    pub uri: String,
    pub parameters: Vec<RouteParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup: Option<Lookup>,
    pub status: u16,
    pub response: ResponseShape,
    /// Missing rows answer 404 from the action itself.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub not_found_guard: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerDescriptor {
    pub class: ClassName,
    pub service: String,
    pub resource: String,
    pub dto: String,
    pub actions: Vec<ControllerAction>,
}

impl ControllerDescriptor {
    pub fn action(&self, name: &str) -> Option<&ControllerAction> {
        self.actions.iter().find(|a| a.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    pub method: HttpMethod,
    pub uri: String,
    pub action: String,
    pub name: String,
}

/// How the routes are registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Registration {
    /// One resource registration with a single `{parameter}`.
    ApiResource { uri: String, parameter: String },
    /// Explicit routes, one path segment per key column.
    Explicit { routes: Vec<RouteEntry> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    pub file: String,
    pub controller: String,
    pub endpoint: String,
    pub registration: Registration,
    /// The five routes as served, whatever the registration style.
    pub routes: Vec<RouteEntry>,
}

/// Derives the controller descriptor.
pub fn derive_controller(names: &NameSet) -> ControllerDescriptor {
    let collection = names.route_uri.clone();
    let member = names.member_uri();
    let lookup = member_lookup(names);
    let composite = names.finder.is_some();

    let member_action = |name: &str, method, request: Option<&ClassName>, status, response| {
        ControllerAction {
            name: name.to_string(),
            method,
            uri: member.clone(),
            parameters: names.route_parameters.clone(),
            request: request.map(ClassName::qualified),
            lookup: Some(lookup.clone()),
            status,
            response,
            not_found_guard: composite,
        }
    };

    let actions = vec![
        ControllerAction {
            name: "index".to_string(),
            method: HttpMethod::Get,
            uri: collection.clone(),
            parameters: Vec::new(),
            request: Some(names.index_request.qualified()),
            lookup: None,
            status: 200,
            response: ResponseShape::Collection,
            not_found_guard: false,
        },
        ControllerAction {
            name: "store".to_string(),
            method: HttpMethod::Post,
            uri: collection,
            parameters: Vec::new(),
            request: Some(names.store_request.qualified()),
            lookup: None,
            status: 201,
            response: ResponseShape::Item,
            not_found_guard: false,
        },
        member_action("show", HttpMethod::Get, None, 200, ResponseShape::Item),
        member_action(
            "update",
            HttpMethod::Put,
            Some(&names.update_request),
            200,
            ResponseShape::Item,
        ),
        member_action("destroy", HttpMethod::Delete, None, 204, ResponseShape::NoContent),
    ];

    ControllerDescriptor {
        class: names.controller.clone(),
        service: names.service.qualified(),
        resource: names.resource.qualified(),
        dto: names.dto.qualified(),
        actions,
    }
}

/// Derives the route registration from the controller's actions.
pub fn derive_routes(names: &NameSet, controller: &ControllerDescriptor) -> RouteDescriptor {
    let routes: Vec<RouteEntry> = controller
        .actions
        .iter()
        .map(|action| RouteEntry {
            method: action.method,
            uri: action.uri.clone(),
            action: action.name.clone(),
            name: format!("{}.{}", names.route_uri.replace('/', "."), action.name),
        })
        .collect();

    let registration = match (&names.finder, names.route_parameters.first()) {
        (None, Some(param)) => Registration::ApiResource {
            uri: names.route_uri.clone(),
            parameter: param.name.clone(),
        },
        _ => Registration::Explicit {
            routes: routes.clone(),
        },
    };

    RouteDescriptor {
        file: ROUTES_FILE.to_string(),
        controller: controller.class.qualified(),
        endpoint: names.endpoint.clone(),
        registration,
        routes,
    }
}
