//! Shared application state for all routes.

use crate::store::PersonStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// The only path to stored persons; injected so tests can hand in their own store.
    pub store: Arc<dyn PersonStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PersonStore>) -> Self {
        Self { store }
    }
}
