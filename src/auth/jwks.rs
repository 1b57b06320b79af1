// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing key resolution against the provider's JWKS endpoint.
//!
//! ## Caching
//!
//! - Keys are cached per `kid` with a fixed TTL (10 hours by default)
//! - Concurrent misses for the same `kid` share one fetch (moka's
//!   `try_get_with` runs a single init future per key)
//! - Failures are never cached; the next lookup fetches again
//!
//! ## Rate limiting
//!
//! Every remote fetch takes a permit from a GCRA limiter (10 per minute by
//! default). Cache hits are free. When the quota is exhausted the lookup
//! fails with [`ResolveError::Throttled`] instead of calling the endpoint.
//!
//! [`KeyResolver::refresh`] (startup warm-up and readiness checks) draws on
//! a separate bucket with the same quota, so readiness polling cannot
//! throttle lookups.
//!
//! ## Usage
//!
//! Build one `KeyResolver` at startup and share it through `Arc`; the cache
//! and the limiter only work if every request goes through the same instance.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::DecodingKey;
use moka::future::Cache;

use super::error::ResolveError;

/// Default key cache TTL (10 hours).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60 * 60);

/// Default number of cached keys.
pub const DEFAULT_MAX_KEYS: u64 = 10;

/// Default number of remote fetches allowed per minute.
pub const DEFAULT_FETCHES_PER_MINUTE: u32 = 10;

/// Default timeout for one JWKS fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Tunables for a [`KeyResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    pub cache_ttl: Duration,
    pub max_keys: u64,
    /// Fetch quota: at most `max_fetches` per `fetch_window`.
    pub max_fetches: NonZeroU32,
    pub fetch_window: Duration,
    pub fetch_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            max_keys: DEFAULT_MAX_KEYS,
            max_fetches: NonZeroU32::new(DEFAULT_FETCHES_PER_MINUTE).unwrap_or(NonZeroU32::MIN),
            fetch_window: Duration::from_secs(60),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl ResolverSettings {
    fn quota(&self) -> Quota {
        let period = self.fetch_window / self.max_fetches.get();
        Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(self.max_fetches))
            .allow_burst(self.max_fetches)
    }
}

/// Resolves key identifiers to RSA verification keys.
pub struct KeyResolver {
    /// JWKS URL (provider endpoint)
    jwks_url: String,
    /// kid -> verification key
    keys: Cache<String, Arc<DecodingKey>>,
    limiter: DefaultDirectRateLimiter,
    /// Quota for `refresh`, kept apart from `limiter`
    refresh_limiter: DefaultDirectRateLimiter,
    /// HTTP client
    client: reqwest::Client,
}

impl KeyResolver {
    /// Create a resolver with default settings.
    ///
    /// # Arguments
    /// - `jwks_url`: The JWKS endpoint URL (e.g., `https://cognito-idp.<region>.amazonaws.com/<pool>/.well-known/jwks.json`)
    pub fn new(jwks_url: impl Into<String>) -> Self {
        Self::with_settings(jwks_url, ResolverSettings::default())
    }

    pub fn with_settings(jwks_url: impl Into<String>, settings: ResolverSettings) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.fetch_timeout)
            .timeout(settings.fetch_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            jwks_url: jwks_url.into(),
            keys: Cache::builder()
                .max_capacity(settings.max_keys)
                .time_to_live(settings.cache_ttl)
                .build(),
            limiter: RateLimiter::direct(settings.quota()),
            refresh_limiter: RateLimiter::direct(settings.quota()),
            client,
        }
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Resolve the verification key for `kid`.
    ///
    /// Served from the cache when present; otherwise fetched once, even if
    /// several callers miss on the same `kid` at the same time.
    pub async fn resolve(&self, kid: &str) -> Result<Arc<DecodingKey>, ResolveError> {
        self.keys
            .try_get_with(kid.to_string(), self.fetch_key(kid))
            .await
            .map_err(|e| (*e).clone())
    }

    /// Fetch the full key set and cache every RSA key in it.
    ///
    /// Returns the number of keys cached. Used to warm the cache at startup
    /// and by the readiness check.
    pub async fn refresh(&self) -> Result<usize, ResolveError> {
        let jwks = self.fetch_jwks(&self.refresh_limiter).await?;

        let mut cached = 0;
        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.as_deref() else {
                continue;
            };
            match rsa_decoding_key(kid, jwk) {
                Ok(key) => {
                    self.keys.insert(kid.to_string(), Arc::new(key)).await;
                    cached += 1;
                }
                Err(e) => tracing::debug!(kid, error = %e, "Skipping JWKS entry"),
            }
        }
        Ok(cached)
    }

    /// Number of keys currently cached.
    pub async fn cached_key_count(&self) -> u64 {
        self.keys.run_pending_tasks().await;
        self.keys.entry_count()
    }

    async fn fetch_key(&self, kid: &str) -> Result<Arc<DecodingKey>, ResolveError> {
        let jwks = self.fetch_jwks(&self.limiter).await?;
        let jwk = jwks
            .find(kid)
            .ok_or_else(|| ResolveError::UnknownKey(kid.to_string()))?;
        Ok(Arc::new(rsa_decoding_key(kid, jwk)?))
    }

    /// Fetch JWKS from the endpoint, subject to the rate limit.
    async fn fetch_jwks(&self, limiter: &DefaultDirectRateLimiter) -> Result<JwkSet, ResolveError> {
        if limiter.check().is_err() {
            tracing::warn!(url = %self.jwks_url, "JWKS fetch rate limit exceeded");
            return Err(ResolveError::Throttled);
        }

        tracing::debug!(url = %self.jwks_url, "Fetching JWKS");

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| unavailable(&self.jwks_url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(
                &self.jwks_url,
                format!("HTTP {} from JWKS endpoint", response.status()),
            ));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| unavailable(&self.jwks_url, e.to_string()))
    }
}

fn unavailable(url: &str, reason: String) -> ResolveError {
    tracing::warn!(url, reason = %reason, "JWKS fetch failed");
    ResolveError::Unavailable(reason)
}

/// Convert an RSA JWK to a DecodingKey.
fn rsa_decoding_key(kid: &str, jwk: &Jwk) -> Result<DecodingKey, ResolveError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
            .map_err(|_| ResolveError::UnsupportedKey(kid.to_string())),
        _ => Err(ResolveError::UnsupportedKey(kid.to_string())),
    }
}
