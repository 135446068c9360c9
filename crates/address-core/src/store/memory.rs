// # Memory Record Store
//
// In-memory implementation of RecordStore.
//
// ## Purpose
//
// Provides a simple, fast store that doesn't persist across restarts.
// Useful for testing and local development without a database.
//
// ## Crash Behavior
//
// - All records are lost on restart/crash

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::RecordTable;
use crate::Error;
use crate::config::StoreConfig;
use crate::record::{AddressPatch, AddressRecord, NewAddress};
use crate::traits::record_store::{RecordStore, RecordStoreFactory};

/// In-memory record store implementation
///
/// This implementation stores all records in a HashMap protected by a RwLock.
///
/// # Example
///
/// ```rust,no_run
/// use address_core::store::MemoryRecordStore;
/// use address_core::{NewAddress, RecordStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryRecordStore::new();
///
///     store
///         .create(NewAddress::new("Jane Doe", "1 Main St", "Springfield", "IL", "United States"))
///         .await?;
///     assert!(store.exists("jane doe").await?);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<RwLock<RecordTable>>,
}

impl MemoryRecordStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of records in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn exists(&self, name: &str) -> Result<bool, Error> {
        Ok(self.inner.read().await.contains_key(name))
    }

    async fn get(&self, name: &str) -> Result<Option<AddressRecord>, Error> {
        Ok(self.inner.read().await.get(name).cloned())
    }

    async fn create(&self, record: NewAddress) -> Result<String, Error> {
        let mut guard = self.inner.write().await;
        super::insert_new(&mut guard, record)
    }

    async fn delete(&self, name: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        super::remove(&mut guard, name)
    }

    async fn update(&self, name: &str, patch: &AddressPatch) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        super::patch(&mut guard, name, patch)
    }

    async fn find(&self, state: &str, country: &str) -> Result<Vec<AddressRecord>, Error> {
        let guard = self.inner.read().await;
        Ok(super::located_in(&guard, state, country))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Factory for the in-memory store
pub struct MemoryRecordStoreFactory;

#[async_trait]
impl RecordStoreFactory for MemoryRecordStoreFactory {
    async fn create(&self, config: &StoreConfig) -> Result<Box<dyn RecordStore>, Error> {
        match config {
            StoreConfig::Memory => Ok(Box::new(MemoryRecordStore::new())),
            _ => Err(Error::config("Invalid config for memory store")),
        }
    }
}
