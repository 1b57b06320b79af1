// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Greeting for the authenticated principal.

use axum::Json;
use chrono::{SecondsFormat, Utc};

use crate::auth::{Auth, Principal};
use crate::models::HelloResponse;

impl From<Principal> for HelloResponse {
    fn from(principal: Principal) -> Self {
        Self {
            message: format!(
                "Hello {} at {}",
                principal.username,
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
            roles: principal.grant_names(),
        }
    }
}

/// Greet the caller and echo their grants.
#[utoipa::path(
    get,
    path = "/api/v1/hello",
    tag = "Hello",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Greeting", body = HelloResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn hello(Auth(principal): Auth) -> Json<HelloResponse> {
    Json(principal.into())
}
