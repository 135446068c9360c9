//! Contract Test: Fault Visibility
//!
//! Storage and directory failures must reach the caller as `error`
//! envelopes, distinguishable from an ordinary `fail`.

mod common;

use address_core::envelope::{MSG_DIRECTORY_UNAVAILABLE, MSG_STORAGE_FAULT};
use address_core::{AddressService, Envelope, MemoryRecordStore, RecordStore, Status};
use common::*;
use std::sync::Arc;

fn faulty_service() -> AddressService {
    AddressService::new(Arc::new(FaultyStore), Arc::new(CountingValidator::us_states()))
}

#[tokio::test]
async fn storage_faults_surface_as_error_status() {
    let service = faulty_service();

    let mut update = update_for("Jane Doe");
    update.city = "Chicago".to_string();

    for envelope in [
        service.create(jane_doe()).await,
        service.delete("Jane Doe").await,
        service.update(update).await,
        service.find("Illinois", "United States").await,
    ] {
        assert_eq!(envelope, Envelope::error(MSG_STORAGE_FAULT));
    }
}

#[tokio::test]
async fn unreachable_directory_surfaces_as_error_status() {
    let store = MemoryRecordStore::new();
    let service = AddressService::new(Arc::new(store.clone()), Arc::new(UnreachableValidator));

    let envelope = service.create(jane_doe()).await;
    assert_eq!(envelope.status, Status::Error);
    assert_eq!(envelope, Envelope::error(MSG_DIRECTORY_UNAVAILABLE));
    assert!(!store.exists("jane doe").await.unwrap());
}
