// # Record Store Trait
//
// Defines the interface for persisting address records.
//
// ## Uniqueness
//
// At most one record exists per normalized name. Implementations enforce
// this themselves: the in-process stores check and insert under a single
// write lock, the MongoDB store relies on a unique index. A caller never
// needs a separate `exists` round trip before `create`.
//
// ## Implementations
//
// - Memory: `MemoryRecordStore`
// - File: `FileRecordStore` (JSON document file)
// - MongoDB: `address-store-mongo` crate
//
// ## Usage
//
// ```rust,ignore
// use address_core::{NewAddress, RecordStore};
//
// let id = store
//     .create(NewAddress::new("Jane Doe", "1 Main St", "Springfield", "IL", "United States"))
//     .await?;
// assert!(store.exists("jane doe").await?);
// ```

use async_trait::async_trait;

use crate::record::{AddressPatch, AddressRecord, NewAddress};

/// Trait for record store implementations
///
/// All names passed in are already normalized. Implementations must be
/// thread-safe and usable across async tasks.
///
/// Any failure of the backing store is reported as
/// [`Error::StorageFault`](crate::Error::StorageFault); nothing is swallowed.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Whether a record exists for the name
    async fn exists(&self, name: &str) -> Result<bool, crate::Error>;

    /// Look up a record by name
    ///
    /// # Returns
    ///
    /// - `Ok(Some(AddressRecord))`: The stored record
    /// - `Ok(None)`: No record found
    /// - `Err(Error)`: Storage error
    async fn get(&self, name: &str) -> Result<Option<AddressRecord>, crate::Error>;

    /// Insert a new record
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: Identifier assigned to the new record
    /// - `Err(Error::AlreadyExists)`: The name is taken
    /// - `Err(Error::CreationFailed)`: The store did not acknowledge the insert
    /// - `Err(Error::StorageFault)`: Storage error
    async fn create(&self, record: NewAddress) -> Result<String, crate::Error>;

    /// Remove the single record with this name
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Removed
    /// - `Err(Error::NotFound)`: No record for this name
    async fn delete(&self, name: &str) -> Result<(), crate::Error>;

    /// Apply a partial update to the record with this name
    ///
    /// An empty patch on an existing record succeeds without writing.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Updated
    /// - `Err(Error::NotFound)`: No record for this name
    async fn update(&self, name: &str, patch: &AddressPatch) -> Result<(), crate::Error>;

    /// All records whose state and country match exactly
    async fn find(&self, state: &str, country: &str)
    -> Result<Vec<AddressRecord>, crate::Error>;

    /// Short backend name for logging (e.g. "memory", "mongo")
    fn backend_name(&self) -> &'static str;
}

/// Helper trait for constructing record stores from configuration
#[async_trait]
pub trait RecordStoreFactory: Send + Sync {
    /// Create a RecordStore instance from configuration
    async fn create(
        &self,
        config: &crate::config::StoreConfig,
    ) -> Result<Box<dyn RecordStore>, crate::Error>;
}
