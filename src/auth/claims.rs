// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified claims and the authenticated principal derived from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::roles::Grant;
use super::AuthError;

/// Every payload claim of a verified token.
pub type ClaimSet = serde_json::Map<String, Value>;

/// Which claims carry the username and the roles.
///
/// Cognito puts group membership in `cognito:groups`; the username claim
/// depends on the token type (`sub`, `username`, `cognito:username`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimNames {
    pub username: String,
    pub roles: String,
}

impl Default for ClaimNames {
    fn default() -> Self {
        Self {
            username: "sub".to_string(),
            roles: "cognito:groups".to_string(),
        }
    }
}

/// Authenticated identity for the current request.
///
/// Built by the authentication middleware and stored in the request
/// extensions; handlers read it through the `Auth` extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    /// Value of the configured username claim
    pub username: String,

    /// One grant per role, in claim order
    pub grants: Vec<Grant>,

    /// Identity provider label (e.g. `cognito`)
    pub provider: String,
}

impl Principal {
    /// Derive a principal from a verified claim set.
    ///
    /// Fails with [`AuthError::MissingUsername`] when the username claim is
    /// absent or not a string. A missing roles claim yields no grants.
    pub fn from_claims(
        claims: &ClaimSet,
        names: &ClaimNames,
        provider: &str,
    ) -> Result<Self, AuthError> {
        let username = claims
            .get(&names.username)
            .and_then(Value::as_str)
            .ok_or(AuthError::MissingUsername)?;

        let grants = roles(claims, &names.roles)
            .into_iter()
            .map(Grant::from_role)
            .collect();

        Ok(Self {
            username: username.to_string(),
            grants,
            provider: provider.to_string(),
        })
    }

    /// Check for a grant by its full name (e.g. `ROLE_admin`).
    pub fn has_grant(&self, grant: &str) -> bool {
        self.grants.iter().any(|g| g.as_str() == grant)
    }

    pub fn grant_names(&self) -> Vec<String> {
        self.grants.iter().map(ToString::to_string).collect()
    }
}

/// Role strings from the roles claim; anything but an array counts as none.
fn roles<'a>(claims: &'a ClaimSet, claim: &str) -> Vec<&'a str> {
    match claims.get(claim) {
        Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
        Some(other) => {
            tracing::debug!(claim, value = %other, "Roles claim is not an array, ignoring");
            Vec::new()
        }
        None => Vec::new(),
    }
}
