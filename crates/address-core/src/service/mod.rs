//! Address record workflow
//!
//! The AddressService is responsible for:
//! - Normalizing the name before any store interaction
//! - Gating writes on the state validator
//! - Calling the record store
//! - Mapping every outcome onto the response envelope
//!
//! ## Flow
//!
//! ```text
//! fields ──► normalize name ──► (validate state) ──► RecordStore ──► Envelope
//! ```
//!
//! | Operation | Validation |
//! |-----------|------------|
//! | create    | always |
//! | update    | only when a state is supplied |
//! | delete    | never |
//! | find      | never |

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::envelope::{self, Envelope};
use crate::error::{Error, Result};
use crate::record::{AddressPatch, NewAddress, normalize_name};
use crate::traits::{RecordStore, StateValidator};

/// Raw field values of a create or update request
///
/// Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AddressFields {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl AddressFields {
    pub fn new(
        name: impl Into<String>,
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            street: street.into(),
            city: city.into(),
            state: state.into(),
            country: country.into(),
        }
    }
}

/// Address record service
///
/// Cheap to clone; clones share the same store and validator.
#[derive(Clone)]
pub struct AddressService {
    store: Arc<dyn RecordStore>,
    validator: Arc<dyn StateValidator>,
}

impl AddressService {
    /// Create a service over a store and a validator
    pub fn new(store: Arc<dyn RecordStore>, validator: Arc<dyn StateValidator>) -> Self {
        Self { store, validator }
    }

    /// The underlying record store
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Validate the state, then insert the record
    ///
    /// On success the envelope carries only the new record's identifier.
    pub async fn create(&self, fields: AddressFields) -> Envelope {
        let name = normalize_name(&fields.name);
        let result = self.try_create(fields).await;
        respond("create", &name, result.map(Envelope::created))
    }

    /// Remove the record with this name
    pub async fn delete(&self, name: &str) -> Envelope {
        let name = normalize_name(name);
        let result = self.try_delete(&name).await;
        respond(
            "delete",
            &name,
            result.map(|()| Envelope::success(envelope::MSG_DELETED)),
        )
    }

    /// Apply a partial update; validation is skipped when no state is given
    pub async fn update(&self, fields: AddressFields) -> Envelope {
        let name = normalize_name(&fields.name);
        let result = self.try_update(&name, &fields).await;
        respond(
            "update",
            &name,
            result.map(|()| Envelope::success(envelope::MSG_UPDATED)),
        )
    }

    /// List records in the state and country
    ///
    /// No matches is still a success, with an informational message.
    pub async fn find(&self, state: &str, country: &str) -> Envelope {
        match self.store.find(state, country).await {
            Ok(records) if records.is_empty() => {
                debug!(state, country, "find matched no records");
                Envelope::success(envelope::MSG_NO_RECORDS)
            }
            Ok(records) => {
                debug!(state, country, count = records.len(), "find matched records");
                Envelope::records(records)
            }
            Err(e) => {
                error!(state, country, error = %e, "find failed");
                Envelope::from(&e)
            }
        }
    }

    async fn try_create(&self, fields: AddressFields) -> Result<String> {
        require_name(&fields.name)?;
        self.validate_state(&fields.state, &fields.country).await?;

        let record = NewAddress::new(
            &fields.name,
            fields.street,
            fields.city,
            fields.state,
            fields.country,
        );
        self.store.create(record).await
    }

    async fn try_delete(&self, name: &str) -> Result<()> {
        require_name(name)?;
        self.store.delete(name).await
    }

    async fn try_update(&self, name: &str, fields: &AddressFields) -> Result<()> {
        require_name(name)?;
        if fields.state.is_empty() {
            debug!(name, "no state supplied, skipping validation");
        } else {
            self.validate_state(&fields.state, &fields.country).await?;
        }

        let patch =
            AddressPatch::from_fields(&fields.street, &fields.city, &fields.state, &fields.country);
        self.store.update(name, &patch).await
    }

    async fn validate_state(&self, state: &str, country: &str) -> Result<()> {
        let check = self.validator.check(state, country).await?;
        debug!(
            state,
            country,
            validator = self.validator.validator_name(),
            ?check,
            "state checked"
        );
        check.into_result(state, country)
    }
}

fn require_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_input(envelope::MSG_NAME_REQUIRED));
    }
    Ok(())
}

/// Log the outcome of a write and turn it into an envelope
fn respond(operation: &'static str, name: &str, result: Result<Envelope>) -> Envelope {
    match result {
        Ok(envelope) => {
            info!(operation, name, "address record {} succeeded", operation);
            envelope
        }
        Err(e) if e.is_internal() => {
            error!(operation, name, error = %e, "address record {} failed", operation);
            Envelope::from(&e)
        }
        Err(e) => {
            warn!(operation, name, error = %e, "address record {} rejected", operation);
            Envelope::from(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{Payload, Status};
    use crate::store::MemoryRecordStore;
    use crate::traits::StateCheck;
    use async_trait::async_trait;

    /// Accepts "IL" and "TX" in the United States, nothing else
    struct FixedValidator;

    #[async_trait]
    impl StateValidator for FixedValidator {
        async fn check(&self, state: &str, country: &str) -> Result<StateCheck> {
            if crate::country::code_for(country) != Some("US") {
                return Ok(StateCheck::UnknownCountry);
            }
            Ok(match state {
                "IL" | "TX" => StateCheck::Valid,
                _ => StateCheck::NoMatch,
            })
        }

        fn validator_name(&self) -> &'static str {
            "fixed"
        }
    }

    fn service() -> AddressService {
        AddressService::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(FixedValidator),
        )
    }

    fn jane() -> AddressFields {
        AddressFields::new("Jane Doe", "1 Main St", "Springfield", "IL", "United States")
    }

    #[tokio::test]
    async fn test_create_returns_only_id() {
        let service = service();
        let envelope = service.create(jane()).await;

        assert_eq!(envelope.status, Status::Success);
        let Payload::Id(id) = &envelope.data else {
            panic!("expected id payload, got {:?}", envelope.data);
        };
        let stored = service.store().get("jane doe").await.unwrap().unwrap();
        assert_eq!(&stored.id, id);
    }

    #[tokio::test]
    async fn test_create_invalid_state() {
        let service = service();
        let mut fields = jane();
        fields.state = "QC".to_string();

        assert_eq!(
            service.create(fields).await,
            Envelope::fail(envelope::MSG_STATE_INVALID)
        );
        assert!(!service.store().exists("jane doe").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let mut fields = jane();
        fields.name = String::new();
        assert_eq!(
            service().create(fields).await,
            Envelope::fail(envelope::MSG_NAME_REQUIRED)
        );
    }

    #[tokio::test]
    async fn test_update_then_find() {
        let service = service();
        service.create(jane()).await;

        let update = AddressFields::new("JANE DOE", "", "Austin", "TX", "United States");
        assert_eq!(
            service.update(update).await,
            Envelope::success(envelope::MSG_UPDATED)
        );

        let envelope = service.find("TX", "United States").await;
        let Payload::Records(records) = envelope.data else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].city, "Austin");
        assert_eq!(records[0].street, "1 Main St");
    }

    #[tokio::test]
    async fn test_find_without_matches_is_success() {
        assert_eq!(
            service().find("IL", "United States").await,
            Envelope::success(envelope::MSG_NO_RECORDS)
        );
    }

    #[tokio::test]
    async fn test_delete_is_case_insensitive() {
        let service = service();
        service.create(jane()).await;

        assert_eq!(
            service.delete("JANE doe").await,
            Envelope::success(envelope::MSG_DELETED)
        );
        assert_eq!(
            service.delete("jane doe").await,
            Envelope::fail(envelope::MSG_NOT_FOUND)
        );
    }
}
