// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer authentication middleware for Axum.
//!
//! Mounted once on the `/api` router so every request under that prefix is
//! authenticated before any handler runs:
//!
//! ```rust,ignore
//! let api = Router::new()
//!     .route("/v1/hello", get(hello))
//!     .layer(axum::middleware::from_fn_with_state(filter, authenticate));
//! ```
//!
//! On success the [`Principal`] is inserted into the request extensions,
//! which live exactly as long as the request.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::claims::{ClaimNames, Principal};
use super::error::{AuthError, VerifyError};
use super::verifier::TokenVerifier;

/// Scheme prefix of the Authorization header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Default deadline for one verification, key fetch included.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns a bearer header into a [`Principal`].
pub struct AuthFilter {
    verifier: TokenVerifier,
    claims: ClaimNames,
    /// Identity provider label copied into every principal
    provider: String,
    verify_timeout: Duration,
}

impl AuthFilter {
    pub fn new(verifier: TokenVerifier, claims: ClaimNames, provider: impl Into<String>) -> Self {
        Self {
            verifier,
            claims,
            provider: provider.into(),
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
        }
    }

    pub fn with_verify_timeout(mut self, timeout: Duration) -> Self {
        self.verify_timeout = timeout;
        self
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Authenticate the value of an Authorization header.
    ///
    /// The verifier is not consulted unless the header carries the bearer
    /// scheme. Verification failures are logged with their kind and
    /// reported as [`AuthError::InvalidToken`].
    pub async fn authenticate(&self, header: Option<&HeaderValue>) -> Result<Principal, AuthError> {
        let token = header
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .ok_or(AuthError::MissingAuthHeader)?;

        let claims = match tokio::time::timeout(self.verify_timeout, self.verifier.verify(token)).await
        {
            Ok(result) => result,
            Err(_) => Err(VerifyError::DeadlineExceeded),
        }
        .map_err(|e| {
            tracing::warn!(kind = e.kind(), error = %e, "Bearer token rejected");
            AuthError::InvalidToken(e)
        })?;

        let principal = Principal::from_claims(&claims, &self.claims, &self.provider)
            .inspect_err(|_| {
                tracing::warn!(claim = %self.claims.username, "Verified token has no username claim");
            })?;

        tracing::info!(username = %principal.username, "Authenticated bearer token");
        tracing::debug!(
            username = %principal.username,
            grants = ?principal.grant_names(),
            "Resolved grants"
        );

        Ok(principal)
    }
}

/// Authentication middleware function.
pub async fn authenticate(
    State(filter): State<Arc<AuthFilter>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request.headers().get(AUTHORIZATION).cloned();
    match filter.authenticate(header.as_ref()).await {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
