//! Plugin-based backend registry
//!
//! The registry allows record stores and state validators to be registered
//! at startup, so the daemon picks a backend by configured name instead of
//! hard-coding one.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use address_core::registry::BackendRegistry;
//!
//! let registry = BackendRegistry::with_builtin_stores();
//! address_store_mongo::register(&registry);
//! address_directory_http::register(&registry);
//!
//! let store = registry.create_store(&config.store).await?;
//! let validator = registry.create_validator(&config.directory)?;
//! ```

use crate::config::{DirectoryConfig, StoreConfig};
use crate::error::{Error, Result};
use crate::store::{FileRecordStoreFactory, MemoryRecordStoreFactory};
use crate::traits::{RecordStore, RecordStoreFactory, StateValidator, StateValidatorFactory};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry of backend factories keyed by type name
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct BackendRegistry {
    stores: RwLock<HashMap<String, Arc<dyn RecordStoreFactory>>>,
    validators: RwLock<HashMap<String, Box<dyn StateValidatorFactory>>>,
}

impl BackendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the "memory" and "file" stores registered
    pub fn with_builtin_stores() -> Self {
        let registry = Self::new();
        registry.register_store("memory", Box::new(MemoryRecordStoreFactory));
        registry.register_store("file", Box::new(FileRecordStoreFactory));
        registry
    }

    /// Register a record store factory
    ///
    /// # Parameters
    ///
    /// - `name`: Store type name (e.g., "mongo", "file")
    /// - `factory`: Factory object for creating store instances
    pub fn register_store(&self, name: impl Into<String>, factory: Box<dyn RecordStoreFactory>) {
        let mut stores = self.stores.write().unwrap_or_else(|e| e.into_inner());
        stores.insert(name.into(), Arc::from(factory));
    }

    /// Register a state validator factory
    pub fn register_validator(
        &self,
        name: impl Into<String>,
        factory: Box<dyn StateValidatorFactory>,
    ) {
        let mut validators = self.validators.write().unwrap_or_else(|e| e.into_inner());
        validators.insert(name.into(), factory);
    }

    /// Create a record store from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn RecordStore>)`: Created store instance
    /// - `Err(Error)`: If the store type is not registered or creation fails
    pub async fn create_store(&self, config: &StoreConfig) -> Result<Box<dyn RecordStore>> {
        let store_type = config.type_name();

        // Release the lock before calling async create
        let factory = {
            let stores = self.stores.read().unwrap_or_else(|e| e.into_inner());
            stores
                .get(store_type)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown store type: {}", store_type)))?
        };

        factory.create(config).await
    }

    /// Create a state validator from configuration
    pub fn create_validator(&self, config: &DirectoryConfig) -> Result<Box<dyn StateValidator>> {
        let validators = self.validators.read().unwrap_or_else(|e| e.into_inner());

        let factory = validators.get(&config.validator).ok_or_else(|| {
            Error::config(format!("Unknown validator type: {}", config.validator))
        })?;

        factory.create(config)
    }

    /// List all registered store types, sorted
    pub fn list_stores(&self) -> Vec<String> {
        let stores = self.stores.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = stores.keys().cloned().collect();
        names.sort();
        names
    }

    /// List all registered validator types, sorted
    pub fn list_validators(&self) -> Vec<String> {
        let validators = self.validators.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = validators.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a store type is registered
    pub fn has_store(&self, name: &str) -> bool {
        let stores = self.stores.read().unwrap_or_else(|e| e.into_inner());
        stores.contains_key(name)
    }

    /// Check if a validator type is registered
    pub fn has_validator(&self, name: &str) -> bool {
        let validators = self.validators.read().unwrap_or_else(|e| e.into_inner());
        validators.contains_key(name)
    }
}
