// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Cognito JWT authentication for the `/api` routes.
//!
//! ## Auth Flow
//!
//! 1. Client authenticates with Cognito and obtains a token
//! 2. Client sends `Authorization: Bearer <token>`
//! 3. Server:
//!    - Resolves the token's `kid` against the Cognito JWKS (cached, rate-limited)
//!    - Verifies the RS256 signature, expiry and issuer
//!    - Extracts:
//!      - the username claim → `Principal::username`
//!      - the roles claim (`cognito:groups`) → `ROLE_<group>` grants
//! 4. The `Principal` is stored in the request extensions for handlers
//!
//! ## Security
//!
//! - Every route under `/api` requires authentication
//! - Verification failures return a fixed 401 message; the reason is only logged
//! - One `KeyResolver` is shared by all requests

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod middleware;
pub mod roles;
pub mod verifier;

pub use claims::{ClaimNames, ClaimSet, Principal};
pub use error::{AuthError, ResolveError, VerifyError};
pub use extractor::{AdminOnly, Auth};
pub use jwks::{KeyResolver, ResolverSettings};
pub use middleware::{authenticate, AuthFilter};
pub use roles::Grant;
pub use verifier::TokenVerifier;
