// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    auth::AdminOnly,
    error::ApiError,
    models::{Person, PersonPage, PersonRequest, DEFAULT_PAGE_SIZE},
    state::AppState,
    store::PersonQuery,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PersonListParams {
    /// Substring of the first name (case-sensitive).
    pub name: Option<String>,
    /// Substring of the phone number.
    pub phone: Option<String>,
    /// Zero-based page number; negative values count as 0.
    pub page: Option<i64>,
    /// Page size; values below 1 count as 1.
    pub size: Option<i64>,
}

impl From<PersonListParams> for PersonQuery {
    fn from(params: PersonListParams) -> Self {
        let page = params.page.unwrap_or(0).max(0);
        let size = params
            .size
            .unwrap_or(DEFAULT_PAGE_SIZE as i64)
            .max(1);
        Self {
            name: params.name,
            phone: params.phone,
            page: usize::try_from(page).unwrap_or(usize::MAX),
            size: usize::try_from(size).unwrap_or(usize::MAX),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/persons",
    request_body = PersonRequest,
    tag = "Persons",
    security(("bearer" = [])),
    responses(
        (status = 201, body = Person),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Phone number already in use")
    )
)]
pub async fn create_person(
    State(state): State<AppState>,
    payload: Result<Json<PersonRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Person>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let mut store = state.store.write().await;
    let person = store.create_person(request)?;
    tracing::debug!(id = %person.id, "Created person");
    Ok((StatusCode::CREATED, Json(person)))
}

#[utoipa::path(
    get,
    path = "/api/v1/persons",
    params(PersonListParams),
    tag = "Persons",
    security(("bearer" = [])),
    responses((status = 200, body = PersonPage))
)]
pub async fn list_persons(
    State(state): State<AppState>,
    params: Result<Query<PersonListParams>, QueryRejection>,
) -> Result<Json<PersonPage>, ApiError> {
    let Query(params) = params?;
    let store = state.store.read().await;
    Ok(Json(store.find_persons(&params.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/persons/{id}",
    params(("id" = Uuid, Path, description = "Person identifier")),
    tag = "Persons",
    security(("bearer" = [])),
    responses(
        (status = 200, body = Person),
        (status = 404, description = "Person not found")
    )
)]
pub async fn get_person(
    id: Result<Path<Uuid>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<Person>, ApiError> {
    let Path(id) = id?;
    let store = state.store.read().await;
    Ok(Json(store.get_person(&id)?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/persons/{id}",
    params(("id" = Uuid, Path, description = "Person identifier")),
    request_body = PersonRequest,
    tag = "Persons",
    security(("bearer" = [])),
    responses(
        (status = 200, body = Person),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Person not found"),
        (status = 409, description = "Phone number already in use")
    )
)]
pub async fn update_person(
    id: Result<Path<Uuid>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<PersonRequest>, JsonRejection>,
) -> Result<Json<Person>, ApiError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    request.validate()?;

    let mut store = state.store.write().await;
    Ok(Json(store.update_person(&id, request)?))
}

/// Delete a person. Requires the `ROLE_admin` grant.
#[utoipa::path(
    delete,
    path = "/api/v1/persons/{id}",
    params(("id" = Uuid, Path, description = "Person identifier")),
    tag = "Persons",
    security(("bearer" = [])),
    responses(
        (status = 204),
        (status = 403, description = "Missing ROLE_admin"),
        (status = 404, description = "Person not found")
    )
)]
pub async fn delete_person(
    AdminOnly(admin): AdminOnly,
    id: Result<Path<Uuid>, PathRejection>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let mut store = state.store.write().await;
    store.delete_person(&id)?;
    tracing::info!(%id, admin = %admin.username, "Deleted person");
    Ok(StatusCode::NO_CONTENT)
}
