// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization grants derived from token roles.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Marker prepended to every role to form its grant.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Grant required by admin-only endpoints.
pub const ADMIN_GRANT: &str = "ROLE_admin";

/// An authorization grant, e.g. role `admin` becomes `ROLE_admin`.
///
/// Roles map 1:1 to grants; the role text is kept verbatim (no case folding).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Grant(String);

impl Grant {
    /// Build the grant for a role claim entry.
    pub fn from_role(role: &str) -> Self {
        Grant(format!("{ROLE_PREFIX}{role}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Grant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
