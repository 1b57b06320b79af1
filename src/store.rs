// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory person store.
//!
//! Shared through `AppState` behind a `tokio::sync::RwLock`. Phone numbers
//! are unique; a create or update that would duplicate one is a conflict.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Person, PersonPage, PersonRequest};

/// Message for a create/update that would duplicate a phone number.
pub const DUPLICATE_PHONE_MESSAGE: &str = "Error : Possibly duplicate data for phone_number";

/// Filters and paging for [`InMemoryStore::find_persons`].
#[derive(Debug, Clone, Default)]
pub struct PersonQuery {
    /// Substring of `first_name`; empty matches everything.
    pub name: Option<String>,
    /// Substring of `phone_number`; empty matches everything.
    pub phone: Option<String>,
    pub page: usize,
    /// Clamped to at least 1.
    pub size: usize,
}

#[derive(Default)]
pub struct InMemoryStore {
    persons: HashMap<Uuid, Person>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_person(&mut self, request: PersonRequest) -> Result<Person, ApiError> {
        self.ensure_phone_free(&request.phone_number, None)?;

        let person = Person {
            id: Uuid::new_v4(),
            first_name: request.first_name,
            last_name: request.last_name,
            age: request.age,
            phone_number: request.phone_number,
            tag: request.tag,
            create_time: Utc::now(),
        };
        self.persons.insert(person.id, person.clone());
        Ok(person)
    }

    pub fn get_person(&self, id: &Uuid) -> Result<Person, ApiError> {
        self.persons
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Person not found"))
    }

    /// Replace every mutable field; `id` and `create_time` are kept.
    pub fn update_person(&mut self, id: &Uuid, request: PersonRequest) -> Result<Person, ApiError> {
        if !self.persons.contains_key(id) {
            return Err(ApiError::not_found("Person not found"));
        }
        self.ensure_phone_free(&request.phone_number, Some(id))?;

        let person = self
            .persons
            .get_mut(id)
            .ok_or_else(|| ApiError::not_found("Person not found"))?;
        person.first_name = request.first_name;
        person.last_name = request.last_name;
        person.age = request.age;
        person.phone_number = request.phone_number;
        person.tag = request.tag;
        Ok(person.clone())
    }

    pub fn delete_person(&mut self, id: &Uuid) -> Result<(), ApiError> {
        if self.persons.remove(id).is_some() {
            Ok(())
        } else {
            Err(ApiError::not_found("Person not found"))
        }
    }

    /// Filter, sort newest first (ties by id) and slice one page.
    pub fn find_persons(&self, query: &PersonQuery) -> PersonPage {
        let name = query.name.as_deref().unwrap_or_default();
        let phone = query.phone.as_deref().unwrap_or_default();
        let size = query.size.max(1);

        let mut matches: Vec<&Person> = self
            .persons
            .values()
            .filter(|p| p.first_name.contains(name) && p.phone_number.contains(phone))
            .collect();
        matches.sort_by(|a, b| {
            b.create_time
                .cmp(&a.create_time)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total_elements = matches.len();
        let content = matches
            .into_iter()
            .skip(query.page.saturating_mul(size))
            .take(size)
            .cloned()
            .collect();

        PersonPage {
            content,
            number: query.page,
            size,
            total_elements,
            total_pages: total_elements.div_ceil(size),
        }
    }

    fn ensure_phone_free(&self, phone: &str, except: Option<&Uuid>) -> Result<(), ApiError> {
        let taken = self
            .persons
            .values()
            .any(|p| p.phone_number == phone && Some(&p.id) != except);
        if taken {
            Err(ApiError::conflict(DUPLICATE_PHONE_MESSAGE))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn request(first_name: &str, phone: &str) -> PersonRequest {
        PersonRequest {
            first_name: first_name.into(),
            last_name: "Doe".into(),
            age: 30,
            phone_number: phone.into(),
            tag: "test".into(),
        }
    }

    fn query(name: Option<&str>, phone: Option<&str>, page: usize, size: usize) -> PersonQuery {
        PersonQuery {
            name: name.map(Into::into),
            phone: phone.map(Into::into),
            page,
            size,
        }
    }

    #[test]
    fn create_assigns_id_and_time() {
        let mut store = InMemoryStore::new();
        let person = store.create_person(request("Jane", "555-0100")).unwrap();
        assert_eq!(store.get_person(&person.id).unwrap(), person);
    }

    #[test]
    fn duplicate_phone_is_conflict() {
        let mut store = InMemoryStore::new();
        store.create_person(request("Jane", "555-0100")).unwrap();
        let error = store.create_person(request("John", "555-0100")).unwrap_err();
        assert_eq!(error.status, StatusCode::CONFLICT);
        assert_eq!(error.message, DUPLICATE_PHONE_MESSAGE);
    }

    #[test]
    fn update_keeps_own_phone_but_rejects_others() {
        let mut store = InMemoryStore::new();
        let jane = store.create_person(request("Jane", "555-0100")).unwrap();
        store.create_person(request("John", "555-0101")).unwrap();

        let renamed = store.update_person(&jane.id, request("Janet", "555-0100")).unwrap();
        assert_eq!(renamed.first_name, "Janet");
        assert_eq!(renamed.create_time, jane.create_time);

        let error = store
            .update_person(&jane.id, request("Janet", "555-0101"))
            .unwrap_err();
        assert_eq!(error.status, StatusCode::CONFLICT);
    }

    #[test]
    fn update_missing_is_not_found() {
        let mut store = InMemoryStore::new();
        let error = store
            .update_person(&Uuid::new_v4(), request("Jane", "555-0100"))
            .unwrap_err();
        assert_eq!(error.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn delete_removes_person() {
        let mut store = InMemoryStore::new();
        let jane = store.create_person(request("Jane", "555-0100")).unwrap();
        store.delete_person(&jane.id).unwrap();
        assert_eq!(store.get_person(&jane.id).unwrap_err().status, StatusCode::NOT_FOUND);
        assert_eq!(store.delete_person(&jane.id).unwrap_err().status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn find_filters_by_substring() {
        let mut store = InMemoryStore::new();
        store.create_person(request("Janet", "555-0100")).unwrap();
        store.create_person(request("Jane", "555-0199")).unwrap();
        store.create_person(request("John", "555-0101")).unwrap();

        let by_name = store.find_persons(&query(Some("Jan"), None, 0, 20));
        assert_eq!(by_name.total_elements, 2);

        let by_both = store.find_persons(&query(Some("Jan"), Some("99"), 0, 20));
        assert_eq!(by_both.content.len(), 1);
        assert_eq!(by_both.content[0].first_name, "Jane");

        let case_sensitive = store.find_persons(&query(Some("jan"), None, 0, 20));
        assert_eq!(case_sensitive.total_elements, 0);

        let empty_filter = store.find_persons(&query(Some(""), Some(""), 0, 20));
        assert_eq!(empty_filter.total_elements, 3);
    }

    #[test]
    fn find_pages_newest_first() {
        let mut store = InMemoryStore::new();
        for i in 0..5 {
            store
                .create_person(request(&format!("P{i}"), &format!("555-01{i:02}")))
                .unwrap();
        }

        let first = store.find_persons(&query(None, None, 0, 2));
        assert_eq!(first.total_elements, 5);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.content.len(), 2);
        assert!(first.content[0].create_time >= first.content[1].create_time);

        let last = store.find_persons(&query(None, None, 2, 2));
        assert_eq!(last.content.len(), 1);

        let beyond = store.find_persons(&query(None, None, 9, 2));
        assert!(beyond.content.is_empty());
    }

    #[test]
    fn zero_size_is_clamped() {
        let mut store = InMemoryStore::new();
        store.create_person(request("Jane", "555-0100")).unwrap();
        let page = store.find_persons(&query(None, None, 0, 0));
        assert_eq!(page.size, 1);
        assert_eq!(page.content.len(), 1);
    }
}
