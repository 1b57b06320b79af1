// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::AuthFilter;
use crate::store::InMemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    /// `None` when client behaviour is enabled and `/api` is not filtered.
    pub auth_filter: Option<Arc<AuthFilter>>,
}

impl AppState {
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            auth_filter: None,
        }
    }

    pub fn with_auth_filter(mut self, filter: Arc<AuthFilter>) -> Self {
        self.auth_filter = Some(filter);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(InMemoryStore::new())
    }
}
