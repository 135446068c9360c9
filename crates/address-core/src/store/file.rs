// # File Record Store
//
// File-based implementation of RecordStore with crash recovery.
//
// ## Purpose
//
// Keeps the record collection as a single JSON document on disk, for
// deployments that want persistence without running a database.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Automatic backup: Keeps .backup of last known good state
// - Recovery: Falls back to backup if corruption detected
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "records": {
//     "jane doe": {
//       "_id": "6f1c0d7e2b6d4b1fa3c8a1f0e4d2c9b7",
//       "name": "jane doe",
//       "street": "1 Main St",
//       "city": "Springfield",
//       "state": "IL",
//       "country": "United States"
//     }
//   }
// }
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::RecordTable;
use crate::Error;
use crate::config::StoreConfig;
use crate::record::{AddressPatch, AddressRecord, NewAddress};
use crate::traits::record_store::{RecordStore, RecordStoreFactory};

/// Record file format version
const RECORD_FILE_VERSION: &str = "1.0";

/// File-based record store with crash recovery
///
/// Every mutation is applied to a copy of the table, written to disk, and
/// only then published. A failed write leaves both the file and the
/// in-memory view unchanged and is reported as a storage fault.
#[derive(Debug)]
pub struct FileRecordStore {
    path: PathBuf,
    records: Arc<RwLock<RecordTable>>,
}

/// Serializable record file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct RecordFileFormat {
    version: String,
    records: RecordTable,
}

impl FileRecordStore {
    /// Create or load a file record store
    ///
    /// This will:
    /// 1. Try to load the existing record file
    /// 2. If corruption detected, try to load from backup
    /// 3. If both fail, start with an empty collection
    /// 4. Create parent directories if needed
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create record directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let records = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            records: Arc::new(RwLock::new(records)),
        })
    }

    /// Load records with automatic recovery
    async fn load_with_recovery(path: &Path) -> Result<RecordTable, Error> {
        let err = match Self::load(path).await {
            Ok(records) => {
                tracing::debug!("Loaded record file: {} records", records.len());
                return Ok(records);
            }
            Err(e) => e,
        };

        // Only parse failures are treated as corruption
        if !matches!(err, Error::Json(_)) {
            return Err(err);
        }

        tracing::warn!(
            "Record file appears corrupted: {}. Attempting recovery from backup.",
            err
        );

        let backup_path = Self::backup_path(path);
        if !backup_path.exists() {
            tracing::warn!("No backup file found. Starting with empty collection.");
            return Ok(RecordTable::new());
        }

        match Self::load(&backup_path).await {
            Ok(records) => {
                tracing::info!("Recovered records from backup: {} records", records.len());
                if let Err(restore_err) = fs::copy(&backup_path, path).await {
                    tracing::error!(
                        "Failed to restore record file from backup: {}",
                        restore_err
                    );
                }
                Ok(records)
            }
            Err(backup_err) => {
                tracing::error!(
                    "Backup also corrupted: {}. Starting with empty collection.",
                    backup_err
                );
                Ok(RecordTable::new())
            }
        }
    }

    /// Load records from a file
    async fn load(path: &Path) -> Result<RecordTable, Error> {
        if !path.exists() {
            tracing::debug!("Record file does not exist: {}", path.display());
            return Ok(RecordTable::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::storage(format!(
                "Failed to read record file {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: RecordFileFormat = serde_json::from_str(&content)?;

        if file.version != RECORD_FILE_VERSION {
            tracing::warn!(
                "Record file version mismatch: expected {}, got {}. \
                Attempting to load anyway.",
                RECORD_FILE_VERSION,
                file.version
            );
        }

        Ok(file.records)
    }

    /// Write records to disk atomically
    async fn persist(&self, records: &RecordTable) -> Result<(), Error> {
        let file = RecordFileFormat {
            version: RECORD_FILE_VERSION.to_string(),
            records: records.clone(),
        };

        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| Error::storage(format!("Failed to serialize records: {}", e)))?;

        let temp_path = self.temp_path();
        {
            let mut out = fs::File::create(&temp_path).await.map_err(|e| {
                Error::storage(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            out.write_all(json.as_bytes()).await.map_err(|e| {
                Error::storage(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            out.flush().await.map_err(|e| {
                Error::storage(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::storage(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Records written to file: {}", self.path.display());
        Ok(())
    }

    /// Apply `mutate` to a copy of the table, persist it, then publish it
    async fn commit<T>(
        &self,
        mutate: impl FnOnce(&mut RecordTable) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut guard = self.records.write().await;
        let mut next = guard.clone();
        let out = mutate(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn exists(&self, name: &str) -> Result<bool, Error> {
        Ok(self.records.read().await.contains_key(name))
    }

    async fn get(&self, name: &str) -> Result<Option<AddressRecord>, Error> {
        Ok(self.records.read().await.get(name).cloned())
    }

    async fn create(&self, record: NewAddress) -> Result<String, Error> {
        self.commit(|table| super::insert_new(table, record)).await
    }

    async fn delete(&self, name: &str) -> Result<(), Error> {
        self.commit(|table| super::remove(table, name)).await
    }

    async fn update(&self, name: &str, patch: &AddressPatch) -> Result<(), Error> {
        if patch.is_empty() {
            return if self.exists(name).await? {
                Ok(())
            } else {
                Err(Error::not_found(name))
            };
        }
        self.commit(|table| super::patch(table, name, patch)).await
    }

    async fn find(&self, state: &str, country: &str) -> Result<Vec<AddressRecord>, Error> {
        let guard = self.records.read().await;
        Ok(super::located_in(&guard, state, country))
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

/// Factory for the file store
pub struct FileRecordStoreFactory;

#[async_trait]
impl RecordStoreFactory for FileRecordStoreFactory {
    async fn create(&self, config: &StoreConfig) -> Result<Box<dyn RecordStore>, Error> {
        match config {
            StoreConfig::File { path } => Ok(Box::new(FileRecordStore::new(path).await?)),
            _ => Err(Error::config("Invalid config for file store")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn named(name: &str, street: &str) -> NewAddress {
        NewAddress::new(name, street, "Springfield", "IL", "United States")
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.json");

        let store = FileRecordStore::new(&path).await.unwrap();
        let id = store.create(named("Jane Doe", "1 Main St")).await.unwrap();
        assert!(path.exists());

        let store2 = FileRecordStore::new(&path).await.unwrap();
        let record = store2.get("jane doe").await.unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.street, "1 Main St");
    }

    #[tokio::test]
    async fn test_file_store_update_and_delete_persist() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.json");

        let store = FileRecordStore::new(&path).await.unwrap();
        store.create(named("Jane Doe", "1 Main St")).await.unwrap();
        store.create(named("John Roe", "5 Oak Ave")).await.unwrap();

        store
            .update("jane doe", &AddressPatch::from_fields("2 Elm St", "", "", ""))
            .await
            .unwrap();
        store.delete("john roe").await.unwrap();

        let reloaded = FileRecordStore::new(&path).await.unwrap();
        assert_eq!(
            reloaded.get("jane doe").await.unwrap().unwrap().street,
            "2 Elm St"
        );
        assert!(!reloaded.exists("john roe").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_store_duplicate_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.json");

        let store = FileRecordStore::new(&path).await.unwrap();
        store.create(named("Jane Doe", "1 Main St")).await.unwrap();
        let before = fs::read_to_string(&path).await.unwrap();

        let err = store.create(named("JANE DOE", "9 Other St")).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
        assert_eq!(fs::read_to_string(&path).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_file_store_corruption_recovery() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.json");

        let store = FileRecordStore::new(&path).await.unwrap();
        store.create(named("Jane Doe", "1 Main St")).await.unwrap();
        // Second write creates the backup holding the first state
        store.create(named("John Roe", "5 Oak Ave")).await.unwrap();

        let backup_path = FileRecordStore::backup_path(&path);
        assert!(backup_path.exists(), "Backup file should exist after write");

        fs::write(&path, b"corrupted json data").await.unwrap();

        let recovered = FileRecordStore::new(&path).await.unwrap();
        assert!(recovered.exists("jane doe").await.unwrap());
        assert!(
            !recovered.exists("john roe").await.unwrap(),
            "Backup should contain previous state, not latest"
        );
    }
}
