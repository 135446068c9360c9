//! Configuration types for the address records service
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Default MongoDB connection string
pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";

/// Default database holding the record collection
pub const DEFAULT_MONGO_DATABASE: &str = "address_records_db";

/// Default record collection
pub const DEFAULT_MONGO_COLLECTION: &str = "records";

/// Default state directory search endpoint
pub const DEFAULT_DIRECTORY_URL: &str = "http://www.groupkt.com/state/search";

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP server listens on
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Record store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// State directory configuration
    #[serde(default)]
    pub directory: DirectoryConfig,
}

impl ServiceConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.store.validate()?;
        self.directory.validate()?;
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            store: StoreConfig::default(),
            directory: DirectoryConfig::default(),
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// MongoDB collection
    Mongo {
        /// Connection string
        uri: String,
        /// Database name
        database: String,
        /// Collection name
        collection: String,
    },

    /// JSON document file
    File {
        /// Path to the record file
        path: String,
    },

    /// In-memory store (not persistent)
    Memory,
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::Mongo {
                uri,
                database,
                collection,
            } => {
                if !uri.starts_with("mongodb://") && !uri.starts_with("mongodb+srv://") {
                    return Err(crate::Error::config(format!(
                        "MongoDB URI must use the mongodb:// or mongodb+srv:// scheme. Got: {}",
                        uri
                    )));
                }
                if database.is_empty() {
                    return Err(crate::Error::config("MongoDB database name cannot be empty"));
                }
                if collection.is_empty() {
                    return Err(crate::Error::config(
                        "MongoDB collection name cannot be empty",
                    ));
                }
                Ok(())
            }
            StoreConfig::File { path } => {
                if path.is_empty() {
                    return Err(crate::Error::config("Record file path cannot be empty"));
                }
                Ok(())
            }
            StoreConfig::Memory => Ok(()),
        }
    }

    /// Get the store type name
    pub fn type_name(&self) -> &'static str {
        match self {
            StoreConfig::Mongo { .. } => "mongo",
            StoreConfig::File { .. } => "file",
            StoreConfig::Memory => "memory",
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Mongo {
            uri: DEFAULT_MONGO_URI.to_string(),
            database: DEFAULT_MONGO_DATABASE.to_string(),
            collection: DEFAULT_MONGO_COLLECTION.to_string(),
        }
    }
}

/// State directory configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Validator type (currently only "directory")
    #[serde(default = "default_validator_type")]
    pub validator: String,

    /// Search endpoint; the country code is appended as a path segment
    #[serde(default = "default_directory_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl DirectoryConfig {
    /// Validate the directory configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.validator.is_empty() {
            return Err(crate::Error::config("Validator type cannot be empty"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "Directory URL must use HTTP or HTTPS scheme. Got: {}",
                self.base_url
            )));
        }
        if !(1..=120).contains(&self.timeout_secs) {
            return Err(crate::Error::config(format!(
                "Directory timeout must be between 1 and 120 seconds. Got: {}",
                self.timeout_secs
            )));
        }
        Ok(())
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            validator: default_validator_type(),
            base_url: default_directory_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_validator_type() -> String {
    "directory".to_string()
}

fn default_directory_url() -> String {
    DEFAULT_DIRECTORY_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
