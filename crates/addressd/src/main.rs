// # addressd - Address Records Daemon
//
// Thin integration layer: all record and validation logic lives in
// address-core and the backend crates.
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering record stores and state validators
// 4. Serving the HTTP routes until SIGTERM/SIGINT
//
// ## Configuration
//
// ### Server
// - `ADDRESSD_BIND`: Listen address (default 0.0.0.0:8000)
// - `ADDRESSD_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ### Record Store
// - `ADDRESSD_STORE_TYPE`: mongo, file, memory (default mongo)
// - `ADDRESSD_STORE_PATH`: Path to the record file (for file)
// - `ADDRESSD_MONGO_URI`: Connection string (for mongo)
// - `ADDRESSD_MONGO_DATABASE`: Database name (for mongo)
// - `ADDRESSD_MONGO_COLLECTION`: Collection name (for mongo)
//
// ### State Directory
// - `ADDRESSD_DIRECTORY_URL`: Search endpoint
// - `ADDRESSD_DIRECTORY_TIMEOUT_SECS`: Request timeout, 1-120 (default 30)
//
// ## Example
//
// ```bash
// export ADDRESSD_STORE_TYPE=file
// export ADDRESSD_STORE_PATH=/var/lib/addressd/records.json
//
// addressd
// ```

mod http;

use address_core::config::{
    DEFAULT_DIRECTORY_URL, DEFAULT_MONGO_COLLECTION, DEFAULT_MONGO_DATABASE, DEFAULT_MONGO_URI,
    DirectoryConfig, ServiceConfig, StoreConfig,
};
use address_core::{AddressService, BackendRegistry};
use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum AddressdExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<AddressdExitCode> for ExitCode {
    fn from(code: AddressdExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration, as read from the environment
#[derive(Debug)]
struct Config {
    bind: String,
    store_type: String,
    store_path: Option<String>,
    mongo_uri: String,
    mongo_database: String,
    mongo_collection: String,
    directory_url: String,
    directory_timeout_secs: u64,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let directory_timeout_secs = match lookup("ADDRESSD_DIRECTORY_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().with_context(|| {
                format!("ADDRESSD_DIRECTORY_TIMEOUT_SECS is not a number: '{}'", raw)
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            bind: or("ADDRESSD_BIND", DEFAULT_BIND),
            store_type: or("ADDRESSD_STORE_TYPE", "mongo"),
            store_path: lookup("ADDRESSD_STORE_PATH"),
            mongo_uri: or("ADDRESSD_MONGO_URI", DEFAULT_MONGO_URI),
            mongo_database: or("ADDRESSD_MONGO_DATABASE", DEFAULT_MONGO_DATABASE),
            mongo_collection: or("ADDRESSD_MONGO_COLLECTION", DEFAULT_MONGO_COLLECTION),
            directory_url: or("ADDRESSD_DIRECTORY_URL", DEFAULT_DIRECTORY_URL),
            directory_timeout_secs,
            log_level: or("ADDRESSD_LOG_LEVEL", "info"),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!(
                "Invalid ADDRESSD_LOG_LEVEL '{}'. Must be one of: trace, debug, info, warn, error",
                other
            ),
        }

        self.service_config()?;
        Ok(())
    }

    /// Build the service configuration
    fn service_config(&self) -> Result<ServiceConfig> {
        let bind: SocketAddr = self
            .bind
            .parse()
            .with_context(|| format!("Invalid ADDRESSD_BIND '{}'", self.bind))?;

        let store = match self.store_type.to_lowercase().as_str() {
            "mongo" => StoreConfig::Mongo {
                uri: self.mongo_uri.clone(),
                database: self.mongo_database.clone(),
                collection: self.mongo_collection.clone(),
            },
            "file" => StoreConfig::File {
                path: self
                    .store_path
                    .clone()
                    .context("ADDRESSD_STORE_PATH is required when ADDRESSD_STORE_TYPE=file")?,
            },
            "memory" => StoreConfig::Memory,
            other => anyhow::bail!(
                "Invalid ADDRESSD_STORE_TYPE '{}'. Must be one of: mongo, file, memory",
                other
            ),
        };

        let config = ServiceConfig {
            bind,
            store,
            directory: DirectoryConfig {
                base_url: self.directory_url.clone(),
                timeout_secs: self.directory_timeout_secs,
                ..DirectoryConfig::default()
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn tracing_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return AddressdExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return AddressdExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.tracing_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return AddressdExitCode::ConfigError.into();
    }

    info!("Starting addressd");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return AddressdExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => AddressdExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {:#}", e);
                AddressdExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let service_config = config.service_config()?;

    let registry = BackendRegistry::with_builtin_stores();

    #[cfg(feature = "mongo")]
    {
        info!("Registering MongoDB record store");
        address_store_mongo::register(&registry);
    }

    address_directory_http::register(&registry);

    let store_type = service_config.store.type_name();
    ensure_store_available(&registry, store_type)?;

    info!("Record store: {}", store_type);
    info!("State directory: {}", service_config.directory.base_url);

    let store = registry
        .create_store(&service_config.store)
        .await
        .context("Failed to open record store")?;
    let validator = registry
        .create_validator(&service_config.directory)
        .context("Failed to create state validator")?;

    let service = AddressService::new(Arc::from(store), Arc::from(validator));
    let app = http::build_router(http::AppState { service });

    let listener = tokio::net::TcpListener::bind(service_config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", service_config.bind))?;
    info!("Listening on {}", service_config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Shutting down addressd");
    Ok(())
}

/// Fail early when the configured store type was compiled out
fn ensure_store_available(registry: &BackendRegistry, store_type: &str) -> Result<()> {
    if !registry.has_store(store_type) {
        anyhow::bail!(
            "Record store '{}' is not available in this build (available: {})",
            store_type,
            registry.list_stores().join(", ")
        );
    }
    Ok(())
}

/// Resolve on SIGTERM or SIGINT
#[cfg(unix)]
async fn shutdown_signal() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to set up signal handlers, falling back to CTRL-C: {}", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to wait for CTRL-C: {}", e);
            }
            return;
        }
    };

    let received = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!("Received shutdown signal: {}", received);
}

/// Resolve on CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal: SIGINT"),
        Err(e) => error!("Failed to wait for CTRL-C: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        config.validate().unwrap();

        let service = config.service_config().unwrap();
        assert_eq!(service.bind, "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(
            service.store,
            StoreConfig::Mongo {
                uri: DEFAULT_MONGO_URI.to_string(),
                database: DEFAULT_MONGO_DATABASE.to_string(),
                collection: DEFAULT_MONGO_COLLECTION.to_string(),
            }
        );
        assert_eq!(service.directory.base_url, DEFAULT_DIRECTORY_URL);
        assert_eq!(service.directory.timeout_secs, 30);
        assert_eq!(config.tracing_level(), Level::INFO);
    }

    #[test]
    fn test_file_store_requires_path() {
        let config = config_from(&[("ADDRESSD_STORE_TYPE", "file")]).unwrap();
        assert!(config.validate().is_err());

        let config = config_from(&[
            ("ADDRESSD_STORE_TYPE", "file"),
            ("ADDRESSD_STORE_PATH", "/tmp/records.json"),
        ])
        .unwrap();
        assert_eq!(
            config.service_config().unwrap().store,
            StoreConfig::File {
                path: "/tmp/records.json".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_unknown_store_type() {
        let config = config_from(&[("ADDRESSD_STORE_TYPE", "redis")]).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ADDRESSD_STORE_TYPE"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(config_from(&[("ADDRESSD_DIRECTORY_TIMEOUT_SECS", "soon")]).is_err());

        for (key, value) in [
            ("ADDRESSD_BIND", "not-an-address"),
            ("ADDRESSD_LOG_LEVEL", "loud"),
            ("ADDRESSD_DIRECTORY_TIMEOUT_SECS", "0"),
            ("ADDRESSD_DIRECTORY_URL", "ftp://example.com/search"),
        ] {
            let config = config_from(&[(key, value)]).unwrap();
            assert!(config.validate().is_err(), "{}={} should be rejected", key, value);
        }
    }

    #[test]
    fn test_unregistered_store_names_the_available_ones() {
        let registry = BackendRegistry::with_builtin_stores();
        ensure_store_available(&registry, "memory").unwrap();

        let err = ensure_store_available(&registry, "mongo").unwrap_err();
        assert!(err.to_string().contains("available: file, memory"));
    }

    #[test]
    fn test_memory_store_and_log_level() {
        let config = config_from(&[
            ("ADDRESSD_STORE_TYPE", "MEMORY"),
            ("ADDRESSD_LOG_LEVEL", "Debug"),
            ("ADDRESSD_BIND", "127.0.0.1:9000"),
        ])
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.service_config().unwrap().store, StoreConfig::Memory);
        assert_eq!(config.tracing_level(), Level::DEBUG);
    }
}
