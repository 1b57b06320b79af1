// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Three layers, innermost first:
//!
//! - [`ResolveError`]: fetching a signing key from the JWKS endpoint
//! - [`VerifyError`]: verifying a bearer token
//! - [`AuthError`]: what the request boundary reports to the client
//!
//! Only [`AuthError`] is ever rendered into a response, and it exposes a
//! fixed message per variant. The verification detail stays in the logs.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Message returned when the Authorization header is missing or not a bearer.
pub const MISSING_HEADER_MESSAGE: &str = "Missing or invalid Authorization header";

/// Message returned for every token verification failure.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid Authorization header";

/// Message returned when a verified token carries no username claim.
pub const MISSING_USERNAME_MESSAGE: &str = "Unable to get username from token";

/// Failure to resolve a signing key for a key identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The published key set has no key with this identifier.
    #[error("no key with kid '{0}' in the published key set")]
    UnknownKey(String),

    /// The key set could not be fetched (network, timeout, bad status or body).
    #[error("key set endpoint unavailable: {0}")]
    Unavailable(String),

    /// The fetch quota for the key set endpoint is exhausted.
    #[error("key set fetch rate limit exceeded")]
    Throttled,

    /// The key exists but is not a usable RSA verification key.
    #[error("key '{0}' is not a usable RSA key")]
    UnsupportedKey(String),
}

/// Failure to verify a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("token is malformed")]
    MalformedToken,

    #[error("token header has no key identifier")]
    MissingKeyId,

    /// The signature cannot be checked because no key was resolved.
    #[error("signature unverifiable: {0}")]
    KeyResolution(#[from] ResolveError),

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    TokenExpired,

    #[error("token is not yet valid")]
    TokenNotYetValid,

    #[error("token issuer does not match the trusted issuer")]
    IssuerMismatch,

    #[error("token verification did not finish before the deadline")]
    DeadlineExceeded,
}

impl VerifyError {
    /// Stable identifier for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            VerifyError::MalformedToken => "malformed_token",
            VerifyError::MissingKeyId => "missing_key_id",
            VerifyError::KeyResolution(ResolveError::UnknownKey(_)) => "unknown_key",
            VerifyError::KeyResolution(ResolveError::Unavailable(_)) => "resolver_unavailable",
            VerifyError::KeyResolution(ResolveError::Throttled) => "resolver_throttled",
            VerifyError::KeyResolution(ResolveError::UnsupportedKey(_)) => "unsupported_key",
            VerifyError::InvalidSignature => "invalid_signature",
            VerifyError::TokenExpired => "token_expired",
            VerifyError::TokenNotYetValid => "token_not_yet_valid",
            VerifyError::IssuerMismatch => "issuer_mismatch",
            VerifyError::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

/// Error reported at the request boundary.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header, or one without the `Bearer ` scheme.
    #[error("{}", MISSING_HEADER_MESSAGE)]
    MissingAuthHeader,

    /// The bearer token failed verification.
    #[error("{}", INVALID_TOKEN_MESSAGE)]
    InvalidToken(#[source] VerifyError),

    /// The verified claim set has no username.
    #[error("{}", MISSING_USERNAME_MESSAGE)]
    MissingUsername,

    /// The principal lacks the grant the endpoint requires.
    #[error("Insufficient permissions for this operation")]
    InsufficientPermissions,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Coarse error code for the response body.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidToken(_) => "invalid_auth_header",
            AuthError::MissingUsername => "missing_username",
            AuthError::InsufficientPermissions => "insufficient_permissions",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidToken(_)
            | AuthError::MissingUsername => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
        }
    }
}

impl From<VerifyError> for AuthError {
    fn from(error: VerifyError) -> Self {
        AuthError::InvalidToken(error)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
