//! Contract Test: State Validation Gate
//!
//! Verifies when the state validator is consulted:
//! - create always validates, and a rejected state never reaches the store
//! - an unknown country is rejected without a directory lookup
//! - update skips validation when no state is supplied
//! - delete and find never validate

mod common;

use address_core::envelope::{MSG_STATE_INVALID, MSG_UPDATED};
use address_core::{Envelope, RecordStore, Status};
use common::*;

#[tokio::test]
async fn create_validates_before_storing() {
    let (service, store, validator) = memory_service();

    assert_eq!(service.create(jane_doe()).await.status, Status::Success);
    assert_eq!(validator.calls(), 1);
    assert_eq!(validator.lookups(), 1);
    assert!(store.exists("jane doe").await.unwrap());
}

#[tokio::test]
async fn rejected_state_is_never_stored() {
    let (service, store, validator) = memory_service();

    let mut fields = jane_doe();
    fields.state = "QC".to_string();

    assert_eq!(service.create(fields).await, Envelope::fail(MSG_STATE_INVALID));
    assert_eq!(validator.calls(), 1);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn unknown_country_fails_without_directory_lookup() {
    let (service, store, validator) = memory_service();

    let mut fields = jane_doe();
    fields.country = "Atlantis".to_string();

    assert_eq!(service.create(fields).await, Envelope::fail(MSG_STATE_INVALID));
    assert_eq!(validator.calls(), 1);
    assert_eq!(validator.lookups(), 0);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn update_without_state_skips_validation() {
    let (service, _store, validator) = memory_service();
    service.create(jane_doe()).await;
    assert_eq!(validator.calls(), 1);

    let mut update = update_for("Jane Doe");
    update.city = "Chicago".to_string();
    assert_eq!(service.update(update).await, Envelope::success(MSG_UPDATED));

    assert_eq!(validator.calls(), 1, "empty state must not be validated");
}

#[tokio::test]
async fn update_with_state_is_validated() {
    let (service, store, validator) = memory_service();
    service.create(jane_doe()).await;

    let mut bad = update_for("Jane Doe");
    bad.state = "BC".to_string();
    bad.country = "United States".to_string();
    assert_eq!(service.update(bad).await, Envelope::fail(MSG_STATE_INVALID));
    assert_eq!(store.get("jane doe").await.unwrap().unwrap().state, "Illinois");

    let mut good = update_for("Jane Doe");
    good.state = "NY".to_string();
    good.country = "United States".to_string();
    assert_eq!(service.update(good).await, Envelope::success(MSG_UPDATED));
    assert_eq!(store.get("jane doe").await.unwrap().unwrap().state, "NY");

    assert_eq!(validator.calls(), 3);
}

#[tokio::test]
async fn delete_and_find_never_validate() {
    let (service, _store, validator) = memory_service();

    service.find("Illinois", "United States").await;
    service.delete("Jane Doe").await;

    assert_eq!(validator.calls(), 0);
}
