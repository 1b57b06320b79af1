// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{authenticate, Principal},
    config::{AllowList, CorsConfig},
    error::ApiError,
    models::{HelloResponse, Person, PersonPage, PersonRequest},
    state::AppState,
};

pub mod health;
pub mod hello;
pub mod persons;

/// Build the application router.
///
/// Everything under `/api`, unmatched paths included, passes the bearer
/// filter when one is configured in `state`; health and docs routes are
/// always open.
pub fn router(state: AppState, cors: &CorsConfig) -> Router {
    let mut api_routes = Router::new()
        .route("/v1/hello", get(hello::hello))
        .route(
            "/v1/persons",
            get(persons::list_persons).post(persons::create_person),
        )
        .route(
            "/v1/persons/{id}",
            get(persons::get_person)
                .patch(persons::update_person)
                .delete(persons::delete_person),
        )
        .fallback(api_not_found);

    match state.auth_filter.clone() {
        Some(filter) => {
            api_routes = api_routes.layer(middleware::from_fn_with_state(filter, authenticate));
        }
        None => tracing::warn!("Client behaviour enabled, /api is served without bearer filter"),
    }

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors_layer(cors))
}

async fn api_not_found() -> ApiError {
    ApiError::not_found("Not found")
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new();
    let layer = match &cors.origins {
        AllowList::Any => layer.allow_origin(Any),
        AllowList::List(origins) => layer.allow_origin(origins.clone()),
    };
    let layer = match &cors.methods {
        AllowList::Any => layer.allow_methods(Any),
        AllowList::List(methods) => layer.allow_methods(methods.clone()),
    };
    match &cors.headers {
        AllowList::Any => layer.allow_headers(Any),
        AllowList::List(headers) => layer.allow_headers(headers.clone()),
    }
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        hello::hello,
        persons::create_person,
        persons::list_persons,
        persons::get_person,
        persons::update_person,
        persons::delete_person,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            HelloResponse,
            Person,
            PersonPage,
            PersonRequest,
            Principal,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Hello", description = "Authenticated greeting"),
        (name = "Persons", description = "Person management"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
