// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification.
//!
//! Steps run in a fixed order and stop at the first failure:
//!
//! 1. Structural decode (three segments, JSON header, JSON object payload)
//! 2. `kid` from the header
//! 3. Key lookup through the [`KeyResolver`]
//! 4. RS256 signature, `exp` and `nbf` checks
//! 5. Exact match of `iss` against the trusted issuer
//!
//! Only RS256 is accepted. A token announcing any other algorithm fails
//! signature verification even when its `kid` resolves.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Header, Validation};

use super::claims::ClaimSet;
use super::error::VerifyError;
use super::jwks::KeyResolver;

/// The only accepted signature algorithm.
pub const SIGNATURE_ALGORITHM: Algorithm = Algorithm::RS256;

/// Default clock skew tolerance (60 seconds).
pub const DEFAULT_LEEWAY_SECS: u64 = 60;

/// Verifies tokens issued by one trusted issuer.
pub struct TokenVerifier {
    resolver: Arc<KeyResolver>,
    issuer: String,
    leeway: u64,
}

impl TokenVerifier {
    pub fn new(resolver: Arc<KeyResolver>, issuer: impl Into<String>) -> Self {
        Self {
            resolver,
            issuer: issuer.into(),
            leeway: DEFAULT_LEEWAY_SECS,
        }
    }

    /// Set the clock skew tolerance for `exp` and `nbf`.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway = leeway_secs;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn resolver(&self) -> &Arc<KeyResolver> {
        &self.resolver
    }

    /// Verify `token` and return its full claim set.
    pub async fn verify(&self, token: &str) -> Result<ClaimSet, VerifyError> {
        let header = decode_structure(token)?;

        let kid = header
            .kid
            .filter(|kid| !kid.is_empty())
            .ok_or(VerifyError::MissingKeyId)?;

        let key = self.resolver.resolve(&kid).await?;

        let claims = decode::<ClaimSet>(token, &key, &self.validation())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => VerifyError::TokenExpired,
                ErrorKind::ImmatureSignature => VerifyError::TokenNotYetValid,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    VerifyError::InvalidSignature
                }
                _ => VerifyError::MalformedToken,
            })?
            .claims;

        match claims.get("iss").and_then(|iss| iss.as_str()) {
            Some(iss) if iss == self.issuer => Ok(claims),
            _ => Err(VerifyError::IssuerMismatch),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(SIGNATURE_ALGORITHM);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;
        // Cognito access tokens carry no `aud`; issuer is checked separately.
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation
    }
}

/// Check the compact serialization and decode the header.
fn decode_structure(token: &str) -> Result<Header, VerifyError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(VerifyError::MalformedToken);
    };

    let header = decode_header(token).map_err(|_| VerifyError::MalformedToken)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| VerifyError::MalformedToken)?;
    serde_json::from_slice::<ClaimSet>(&payload).map_err(|_| VerifyError::MalformedToken)?;

    Ok(header)
}
