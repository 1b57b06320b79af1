// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cognito Starter - JWT-protected REST starter service
//!
//! Every request under `/api` must carry a Cognito-issued RS256 bearer
//! token. Signing keys come from the Cognito JWKS endpoint through a
//! bounded, rate-limited cache.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Bearer token authentication (Cognito JWT)
//! - `config` - Environment configuration
//! - `store` - In-memory person store

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;
