// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded once from the environment at startup. Invalid
//! numbers and missing required variables fail with a [`ConfigError`].
//! Cache sizes, rates and timeouts must be positive; only the leeway may be `0`.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `COGNITO_JWKS_URL` | Cognito JWKS endpoint | Required unless client behaviour is enabled |
//! | `COGNITO_ISSUER` | Trusted `iss` claim | Required unless client behaviour is enabled |
//! | `COGNITO_PROVIDER` | Provider label on every principal | `cognito` |
//! | `COGNITO_USERNAME_CLAIM` | Claim holding the username | `sub` |
//! | `COGNITO_ROLES_CLAIM` | Claim holding the group list | `cognito:groups` |
//! | `COGNITO_CLIENT_BEHAVIOUR_ENABLED` | Skip the bearer filter on `/api` | `false` |
//! | `JWKS_CACHE_TTL_SECS` | Lifetime of a cached key | `36000` |
//! | `JWKS_CACHE_MAX_KEYS` | Key cache capacity | `10` |
//! | `JWKS_RATE_LIMIT_PER_MINUTE` | Remote JWKS fetches per minute | `10` |
//! | `JWKS_FETCH_TIMEOUT_SECS` | Timeout of one JWKS fetch | `5` |
//! | `AUTH_VERIFY_TIMEOUT_SECS` | Deadline of one token verification | `10` |
//! | `JWT_LEEWAY_SECS` | Clock skew allowed on `exp`/`nbf` | `60` |
//! | `CORS_ORIGINS` | Allowed origins, `*` for any | `*` |
//! | `CORS_METHODS` | Allowed methods, `*` for any | `GET,POST,PATCH,DELETE,OPTIONS` |
//! | `CORS_HEADERS` | Allowed request headers, `*` for any | `Authorization,Content-Type` |
//! | `TLS_CERT_PATH` | PEM certificate chain; HTTPS when set with the key | Unset |
//! | `TLS_KEY_PATH` | PEM private key | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use url::Url;

use crate::auth::{
    middleware::DEFAULT_VERIFY_TIMEOUT,
    verifier::DEFAULT_LEEWAY_SECS,
    AuthFilter, ClaimNames, KeyResolver, ResolverSettings, TokenVerifier,
};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const COGNITO_JWKS_URL_ENV: &str = "COGNITO_JWKS_URL";
pub const COGNITO_ISSUER_ENV: &str = "COGNITO_ISSUER";
pub const COGNITO_PROVIDER_ENV: &str = "COGNITO_PROVIDER";
pub const COGNITO_USERNAME_CLAIM_ENV: &str = "COGNITO_USERNAME_CLAIM";
pub const COGNITO_ROLES_CLAIM_ENV: &str = "COGNITO_ROLES_CLAIM";

/// When `true`, the service acts as a plain client of Cognito and `/api`
/// is served without the bearer filter.
pub const COGNITO_CLIENT_BEHAVIOUR_ENV: &str = "COGNITO_CLIENT_BEHAVIOUR_ENABLED";

pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";
pub const JWKS_CACHE_MAX_KEYS_ENV: &str = "JWKS_CACHE_MAX_KEYS";
pub const JWKS_RATE_LIMIT_ENV: &str = "JWKS_RATE_LIMIT_PER_MINUTE";
pub const JWKS_FETCH_TIMEOUT_ENV: &str = "JWKS_FETCH_TIMEOUT_SECS";
pub const AUTH_VERIFY_TIMEOUT_ENV: &str = "AUTH_VERIFY_TIMEOUT_SECS";
pub const JWT_LEEWAY_ENV: &str = "JWT_LEEWAY_SECS";
pub const CORS_ORIGINS_ENV: &str = "CORS_ORIGINS";
pub const CORS_METHODS_ENV: &str = "CORS_METHODS";
pub const CORS_HEADERS_ENV: &str = "CORS_HEADERS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_PROVIDER: &str = "cognito";

/// Default `RUST_LOG` filter when the variable is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for environment variable {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// A CORS allow-list; `*` in the variable means any value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowList<T> {
    Any,
    List(Vec<T>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    pub origins: AllowList<HeaderValue>,
    pub methods: AllowList<Method>,
    pub headers: AllowList<HeaderName>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: AllowList::Any,
            methods: AllowList::List(vec![
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ]),
            headers: AllowList::List(vec![AUTHORIZATION, CONTENT_TYPE]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Cognito bearer filter settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwks_url: Url,
    pub issuer: String,
    pub provider: String,
    pub claims: ClaimNames,
    pub resolver: ResolverSettings,
    pub verify_timeout: Duration,
    pub leeway_secs: u64,
}

impl AuthConfig {
    /// Build the filter with one shared resolver.
    pub fn build_filter(&self) -> AuthFilter {
        let resolver = Arc::new(KeyResolver::with_settings(
            self.jwks_url.as_str(),
            self.resolver.clone(),
        ));
        let verifier =
            TokenVerifier::new(resolver, self.issuer.clone()).with_leeway(self.leeway_secs);
        AuthFilter::new(verifier, self.claims.clone(), self.provider.clone())
            .with_verify_timeout(self.verify_timeout)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `None` when client behaviour is enabled.
    pub auth: Option<AuthConfig>,
    pub cors: CorsConfig,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&var, PORT_ENV, 8080u16)?;

        let client_behaviour = var(COGNITO_CLIENT_BEHAVIOUR_ENV)
            .map(|v| v.trim().to_ascii_lowercase().parse::<bool>())
            .transpose()
            .map_err(|_| ConfigError::Invalid(COGNITO_CLIENT_BEHAVIOUR_ENV))?
            .unwrap_or(false);

        let auth = if client_behaviour {
            None
        } else {
            Some(auth_config(&var)?)
        };

        let cors_defaults = CorsConfig::default();
        let cors = CorsConfig {
            origins: allow_list(&var, CORS_ORIGINS_ENV, |s| HeaderValue::from_str(s).ok())?
                .unwrap_or(cors_defaults.origins),
            methods: allow_list(&var, CORS_METHODS_ENV, |s| {
                Method::from_str(&s.to_ascii_uppercase()).ok()
            })?
            .unwrap_or(cors_defaults.methods),
            headers: allow_list(&var, CORS_HEADERS_ENV, |s| HeaderName::from_str(s).ok())?
                .unwrap_or(cors_defaults.headers),
        };

        let tls = match (var(TLS_CERT_PATH_ENV), var(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
            (None, None) => None,
        };

        let log_format = match var(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(_) => return Err(ConfigError::Invalid(LOG_FORMAT_ENV)),
        };

        Ok(Self {
            host,
            port,
            auth,
            cors,
            tls,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid(HOST_ENV))
    }
}

fn auth_config<V>(var: &V) -> Result<AuthConfig, ConfigError>
where
    V: Fn(&str) -> Option<String>,
{
    let jwks_url = var(COGNITO_JWKS_URL_ENV).ok_or(ConfigError::Missing(COGNITO_JWKS_URL_ENV))?;
    let jwks_url = Url::parse(jwks_url.trim()).map_err(|_| ConfigError::Invalid(COGNITO_JWKS_URL_ENV))?;
    let issuer = var(COGNITO_ISSUER_ENV).ok_or(ConfigError::Missing(COGNITO_ISSUER_ENV))?;

    let default_claims = ClaimNames::default();
    let claims = ClaimNames {
        username: var(COGNITO_USERNAME_CLAIM_ENV).unwrap_or(default_claims.username),
        roles: var(COGNITO_ROLES_CLAIM_ENV).unwrap_or(default_claims.roles),
    };

    let tunables = ResolverSettings::default();
    let resolver = ResolverSettings {
        cache_ttl: secs_or(var, JWKS_CACHE_TTL_ENV, tunables.cache_ttl)?,
        max_keys: nonzero_or(var, JWKS_CACHE_MAX_KEYS_ENV, tunables.max_keys)?,
        max_fetches: parse_or(var, JWKS_RATE_LIMIT_ENV, tunables.max_fetches)?,
        fetch_window: tunables.fetch_window,
        fetch_timeout: secs_or(var, JWKS_FETCH_TIMEOUT_ENV, tunables.fetch_timeout)?,
    };

    Ok(AuthConfig {
        jwks_url,
        issuer: issuer.trim().to_string(),
        provider: var(COGNITO_PROVIDER_ENV).unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
        claims,
        resolver,
        verify_timeout: secs_or(var, AUTH_VERIFY_TIMEOUT_ENV, DEFAULT_VERIFY_TIMEOUT)?,
        leeway_secs: parse_or(var, JWT_LEEWAY_ENV, DEFAULT_LEEWAY_SECS)?,
    })
}

fn parse_or<V, T>(var: &V, name: &'static str, default: T) -> Result<T, ConfigError>
where
    V: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match var(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        None => Ok(default),
    }
}

/// Like [`parse_or`], but `0` is rejected.
fn nonzero_or<V>(var: &V, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    V: Fn(&str) -> Option<String>,
{
    match parse_or(var, name, default)? {
        0 => Err(ConfigError::Invalid(name)),
        n => Ok(n),
    }
}

/// Whole seconds; `0` is rejected.
fn secs_or<V>(var: &V, name: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    V: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(_) => nonzero_or(var, name, 0).map(Duration::from_secs),
        None => Ok(default),
    }
}

fn allow_list<V, T>(
    var: &V,
    name: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<AllowList<T>>, ConfigError>
where
    V: Fn(&str) -> Option<String>,
{
    let Some(raw) = var(name) else {
        return Ok(None);
    };
    if raw.trim() == "*" {
        return Ok(Some(AllowList::Any));
    }
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse(item).ok_or(ConfigError::Invalid(name)))
        .collect::<Result<Vec<_>, _>>()
        .map(|items| Some(AllowList::List(items)))
}
