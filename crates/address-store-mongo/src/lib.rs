// # MongoDB Record Store
//
// This crate provides a RecordStore backed by a MongoDB collection.
//
// ## Collection Layout
//
// One document per record:
//
// ```json
// { "_id": ObjectId("..."), "name": "jane doe", "street": "1 Main St",
//   "city": "Springfield", "state": "IL", "country": "United States" }
// ```
//
// ## Uniqueness
//
// A unique index on `name` is created at connect time. Create inserts
// directly; a taken name fails with a duplicate-key write error (code
// 11000), which is reported as `AlreadyExists`. Delete and update act in a
// single round trip and use the deleted/matched counts to detect a missing
// record.
//
// ## Connections
//
// The driver keeps its own connection pool. One `MongoRecordStore` is
// created at startup and shared by all requests.

use address_core::config::StoreConfig;
use address_core::traits::{RecordStore, RecordStoreFactory};
use address_core::{AddressPatch, AddressRecord, Error, NewAddress, Result};
use async_trait::async_trait;
use mongodb::bson::{Bson, Document, doc, oid::ObjectId};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;

/// Server error code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Stored form of an address record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RecordDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    street: String,
    city: String,
    state: String,
    country: String,
}

impl From<NewAddress> for RecordDocument {
    fn from(new: NewAddress) -> Self {
        Self {
            id: None,
            name: new.name,
            street: new.street,
            city: new.city,
            state: new.state,
            country: new.country,
        }
    }
}

impl From<RecordDocument> for AddressRecord {
    fn from(doc: RecordDocument) -> Self {
        Self {
            id: doc.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: doc.name,
            street: doc.street,
            city: doc.city,
            state: doc.state,
            country: doc.country,
        }
    }
}

fn by_name(name: &str) -> Document {
    doc! { "name": name }
}

fn by_location(state: &str, country: &str) -> Document {
    doc! { "state": state, "country": country }
}

/// `$set` body holding only the patch's present fields
fn set_document(patch: &AddressPatch) -> Document {
    patch
        .fields()
        .into_iter()
        .map(|(field, value)| (field.to_string(), Bson::from(value)))
        .collect()
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

fn storage_fault(operation: &str, err: mongodb::error::Error) -> Error {
    Error::storage(format!("MongoDB {} failed: {}", operation, err))
}

/// MongoDB-backed record store
#[derive(Clone)]
pub struct MongoRecordStore {
    records: Collection<RecordDocument>,
}

impl MongoRecordStore {
    /// Connect to MongoDB and prepare the record collection
    ///
    /// # Parameters
    ///
    /// - `uri`: Connection string (e.g., "mongodb://localhost:27017")
    /// - `database`: Database name
    /// - `collection`: Collection name
    ///
    /// # Returns
    ///
    /// - `Ok(MongoRecordStore)`: Connected, with the unique name index in place
    /// - `Err(Error::StorageFault)`: Unreachable server or index creation failed
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| storage_fault("connect", e))?;

        let store = Self {
            records: client.database(database).collection(collection),
        };
        store.ensure_name_index().await?;

        tracing::info!(
            "Connected to MongoDB collection {}.{}",
            database,
            collection
        );
        Ok(store)
    }

    async fn ensure_name_index(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.records
            .create_index(index)
            .await
            .map_err(|e| storage_fault("create_index", e))?;

        tracing::debug!("Unique index on name is in place");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    async fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.get(name).await?.is_some())
    }

    async fn get(&self, name: &str) -> Result<Option<AddressRecord>> {
        let found = self
            .records
            .find_one(by_name(name))
            .await
            .map_err(|e| storage_fault("find_one", e))?;
        Ok(found.map(AddressRecord::from))
    }

    async fn create(&self, record: NewAddress) -> Result<String> {
        let name = record.name.clone();
        let document = RecordDocument::from(record);
        let inserted = match self.records.insert_one(&document).await {
            Ok(inserted) => inserted,
            // The unique name index is the only uniqueness check
            Err(e) if is_duplicate_key(&e) => return Err(Error::already_exists(name)),
            Err(e) => return Err(storage_fault("insert_one", e)),
        };

        let id = inserted
            .inserted_id
            .as_object_id()
            .map(|oid| oid.to_hex())
            .ok_or_else(|| {
                Error::creation_failed(format!(
                    "insert returned a non-ObjectId identifier: {}",
                    inserted.inserted_id
                ))
            })?;

        tracing::debug!("Inserted record {} ({})", name, id);
        Ok(id)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let deleted = self
            .records
            .delete_one(by_name(name))
            .await
            .map_err(|e| storage_fault("delete_one", e))?;

        if deleted.deleted_count == 0 {
            return Err(Error::not_found(name));
        }
        Ok(())
    }

    async fn update(&self, name: &str, patch: &AddressPatch) -> Result<()> {
        // `$set` rejects an empty document
        if patch.is_empty() {
            return if self.exists(name).await? {
                Ok(())
            } else {
                Err(Error::not_found(name))
            };
        }

        let updated = self
            .records
            .update_one(by_name(name), doc! { "$set": set_document(patch) })
            .await
            .map_err(|e| storage_fault("update_one", e))?;

        if updated.matched_count == 0 {
            return Err(Error::not_found(name));
        }
        Ok(())
    }

    async fn find(&self, state: &str, country: &str) -> Result<Vec<AddressRecord>> {
        let mut cursor = self
            .records
            .find(by_location(state, country))
            .sort(doc! { "name": 1 })
            .await
            .map_err(|e| storage_fault("find", e))?;

        let mut records = Vec::new();
        while let Some(document) = cursor.next().await {
            let document = document.map_err(|e| storage_fault("cursor", e))?;
            records.push(AddressRecord::from(document));
        }
        Ok(records)
    }

    fn backend_name(&self) -> &'static str {
        "mongo"
    }
}

/// Factory for creating MongoDB stores
pub struct MongoRecordStoreFactory;

#[async_trait]
impl RecordStoreFactory for MongoRecordStoreFactory {
    async fn create(&self, config: &StoreConfig) -> Result<Box<dyn RecordStore>> {
        match config {
            StoreConfig::Mongo {
                uri,
                database,
                collection,
            } => {
                config.validate()?;
                Ok(Box::new(
                    MongoRecordStore::connect(uri, database, collection).await?,
                ))
            }
            _ => Err(Error::config("Invalid config for MongoDB store")),
        }
    }
}

/// Register the MongoDB store with a registry
///
/// # Example
///
/// ```rust
/// use address_core::BackendRegistry;
///
/// let registry = BackendRegistry::with_builtin_stores();
/// address_store_mongo::register(&registry);
/// assert!(registry.has_store("mongo"));
/// ```
pub fn register(registry: &address_core::BackendRegistry) {
    registry.register_store("mongo", Box::new(MongoRecordStoreFactory));
}
