// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures for the REST API. All types derive
//! `Serialize`, `Deserialize`, and `ToSchema` for JSON handling and OpenAPI
//! documentation. Field names are camelCase on the wire.
//!
//! ## Model Categories
//!
//! - **Person**: the sample resource and its request DTO
//! - **Paging**: page envelope for list responses
//! - **Hello**: greeting for the authenticated principal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: usize = 20;

// =============================================================================
// Person Models
// =============================================================================

/// A stored person.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Unique identifier, assigned on creation.
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    /// Phone number; unique across all persons.
    pub phone_number: String,
    /// Free-form label.
    pub tag: String,
    /// When the person was created.
    pub create_time: DateTime<Utc>,
}

/// Request body for creating or updating a person.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonRequest {
    /// Must not be empty.
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    /// Must not be blank.
    pub phone_number: String,
    pub tag: String,
}

impl PersonRequest {
    /// Check field constraints, reporting every violation at once.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut violations = Vec::new();
        if self.first_name.is_empty() {
            violations.push("First name must not be blank");
        }
        if self.phone_number.trim().is_empty() {
            violations.push("Phone number must not be blank");
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::bad_request(violations.join(", ")))
        }
    }
}

// =============================================================================
// Paging
// =============================================================================

/// One page of persons, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonPage {
    pub content: Vec<Person>,
    /// Zero-based page number.
    pub number: usize,
    /// Requested page size.
    pub size: usize,
    /// Matching persons across all pages.
    pub total_elements: usize,
    pub total_pages: usize,
}

// =============================================================================
// Hello
// =============================================================================

/// Greeting returned to the authenticated principal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct HelloResponse {
    /// `Hello <username> at <timestamp>`
    pub message: String,
    /// Grants of the principal, e.g. `ROLE_admin`.
    pub roles: Vec<String>,
}
