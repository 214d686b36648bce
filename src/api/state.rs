//! Application state for the HRIS API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigurationStore;
use crate::repository::InMemoryStore;

/// Shared application state.
///
/// Holds the payroll configuration, read-only once the server starts, and
/// the record store. Cloning is cheap; every clone shares the same data.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigurationStore>,
    store: Arc<InMemoryStore>,
}

impl AppState {
    /// Creates application state from an initialized configuration and a store.
    pub fn new(config: ConfigurationStore, store: InMemoryStore) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }

    /// The payroll configuration.
    pub fn config(&self) -> &ConfigurationStore {
        &self.config
    }

    /// The record store.
    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// A shared handle to the record store, e.g. for a capture sink.
    pub fn shared_store(&self) -> Arc<InMemoryStore> {
        Arc::clone(&self.store)
    }
}
