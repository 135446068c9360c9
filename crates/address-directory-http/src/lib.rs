// # HTTP State Directory Validator
//
// This crate provides a StateValidator that asks an external state directory
// whether a state exists under a country.
//
// ## Behavior
//
// - Resolves the country name to an ISO 3166-1 alpha-2 code locally
// - Unknown country: answers `UnknownCountry` without any request
// - One GET per check, no retry, no caching
// - HTTP timeout configured (default 30 seconds)
// - Non-2xx status or malformed body: `Error::Directory`
//
// ## API Reference
//
// ```http
// GET {base_url}/{code}?text={state}
//
// {"RestResponse": {"result": [ { "name": "Illinois", "abbr": "IL", ... } ]}}
// ```
//
// A state is valid iff the `result` list has a first element.

use address_core::config::DirectoryConfig;
use address_core::country;
use address_core::traits::{StateCheck, StateValidator, StateValidatorFactory};
use address_core::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Directory search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "RestResponse")]
    rest_response: RestResponse,
}

#[derive(Debug, Deserialize)]
struct RestResponse {
    #[serde(default)]
    result: Vec<serde_json::Value>,
}

/// State validator backed by an HTTP state directory
#[derive(Debug, Clone)]
pub struct DirectoryStateValidator {
    /// Search endpoint without trailing slash
    base_url: String,

    /// HTTP client for directory requests
    client: reqwest::Client,
}

impl DirectoryStateValidator {
    /// Create a validator for the directory at `base_url`
    ///
    /// # Parameters
    ///
    /// - `base_url`: Search endpoint; the country code is appended as a path segment
    /// - `timeout`: Per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { base_url, client })
    }

    /// Create a validator from configuration
    pub fn from_config(config: &DirectoryConfig) -> Result<Self> {
        config.validate()?;
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    /// Query the directory for a state under a country code
    async fn search(&self, code: &str, state: &str) -> Result<bool> {
        let url = format!("{}/{}", self.base_url, code);
        tracing::debug!("Searching state directory: {} (text: {})", url, state);

        let response = self
            .client
            .get(&url)
            .query(&[("text", state)])
            .send()
            .await
            .map_err(|e| Error::directory(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(match status.as_u16() {
                429 => Error::directory(format!(
                    "Rate limit exceeded. Please retry later. Status: {}",
                    status
                )),
                500..=599 => Error::directory(format!(
                    "Directory server error (transient): {} - {}",
                    status, error_text
                )),
                _ => Error::directory(format!(
                    "State search failed: {} - {}",
                    status, error_text
                )),
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::directory(format!("Failed to parse response: {}", e)))?;

        Ok(body.rest_response.result.first().is_some())
    }
}

#[async_trait]
impl StateValidator for DirectoryStateValidator {
    async fn check(&self, state: &str, country_name: &str) -> Result<StateCheck> {
        let Some(code) = country::code_for(country_name) else {
            tracing::warn!("Country has no ISO code: {:?}", country_name);
            return Ok(StateCheck::UnknownCountry);
        };

        if self.search(code, state).await? {
            Ok(StateCheck::Valid)
        } else {
            tracing::info!("State {:?} not found under {}", state, code);
            Ok(StateCheck::NoMatch)
        }
    }

    fn validator_name(&self) -> &'static str {
        "directory"
    }
}

/// Factory for creating directory validators
pub struct DirectoryValidatorFactory;

impl StateValidatorFactory for DirectoryValidatorFactory {
    fn create(&self, config: &DirectoryConfig) -> Result<Box<dyn StateValidator>> {
        Ok(Box::new(DirectoryStateValidator::from_config(config)?))
    }
}

/// Register the directory validator with a registry
///
/// # Example
///
/// ```rust
/// use address_core::BackendRegistry;
///
/// let registry = BackendRegistry::new();
/// address_directory_http::register(&registry);
/// assert!(registry.has_validator("directory"));
/// ```
pub fn register(registry: &address_core::BackendRegistry) {
    registry.register_validator("directory", Box::new(DirectoryValidatorFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn validator(server: &MockServer) -> DirectoryStateValidator {
        DirectoryStateValidator::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_state_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/US"))
            .and(query_param("text", "Illinois"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "RestResponse": {
                    "result": [
                        { "country": "USA", "name": "Illinois", "abbr": "IL" }
                    ]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let check = validator(&server)
            .check("Illinois", "United States")
            .await
            .unwrap();
        assert_eq!(check, StateCheck::Valid);
    }

    #[tokio::test]
    async fn test_state_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/US"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "RestResponse": { "messages": ["No matching state found"], "result": [] }
            })))
            .mount(&server)
            .await;

        let validator = validator(&server);
        assert_eq!(
            validator.check("QC", "United States of America").await.unwrap(),
            StateCheck::NoMatch
        );
        assert!(
            !validator
                .is_state_valid("QC", "United States of America")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_missing_result_is_no_match() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "RestResponse": {} })),
            )
            .mount(&server)
            .await;

        assert_eq!(
            validator(&server).check("ON", "Canada").await.unwrap(),
            StateCheck::NoMatch
        );
    }

    #[tokio::test]
    async fn test_unknown_country_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        assert_eq!(
            validator(&server).check("Illinois", "Atlantis").await.unwrap(),
            StateCheck::UnknownCountry
        );
    }

    #[tokio::test]
    async fn test_server_error_is_directory_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = validator(&server)
            .check("Illinois", "United States")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Directory(_)));
        assert!(err.is_internal());
    }

    #[tokio::test]
    async fn test_malformed_body_is_directory_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>moved</html>"))
            .mount(&server)
            .await;

        let err = validator(&server)
            .check("Illinois", "United States")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Directory(_)));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let validator =
            DirectoryStateValidator::new("http://localhost:1/search/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(validator.base_url, "http://localhost:1/search");
    }

    #[test]
    fn test_factory_rejects_invalid_config() {
        let config = DirectoryConfig {
            base_url: "ftp://example.com".to_string(),
            ..DirectoryConfig::default()
        };
        assert!(DirectoryValidatorFactory.create(&config).is_err());
        assert!(
            DirectoryValidatorFactory
                .create(&DirectoryConfig::default())
                .is_ok()
        );
    }
}
