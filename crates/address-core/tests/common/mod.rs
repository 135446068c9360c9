//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that verify the workflow
//! contracts without a database or network.

#![allow(dead_code)]

use address_core::country;
use address_core::error::{Error, Result};
use address_core::traits::{RecordStore, StateCheck, StateValidator};
use address_core::{
    AddressFields, AddressPatch, AddressRecord, AddressService, MemoryRecordStore, NewAddress,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A validator backed by a fixed set of (country code, state) pairs
///
/// Counts how often it was asked, and how many of those would have reached
/// the directory (i.e. the country resolved).
pub struct CountingValidator {
    known: HashSet<(String, String)>,
    calls: Arc<AtomicUsize>,
    lookups: Arc<AtomicUsize>,
}

impl CountingValidator {
    pub fn new(known: &[(&str, &str)]) -> Self {
        Self {
            known: known
                .iter()
                .map(|(code, state)| (code.to_string(), state.to_string()))
                .collect(),
            calls: Arc::new(AtomicUsize::new(0)),
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Validator that knows the US states used across the tests
    pub fn us_states() -> Self {
        Self::new(&[("US", "IL"), ("US", "Illinois"), ("US", "NY"), ("US", "NJ")])
    }

    /// Share the counters of another validator
    pub fn sharing_counters_with(other: &CountingValidator) -> Self {
        Self {
            known: other.known.clone(),
            calls: other.calls.clone(),
            lookups: other.lookups.clone(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StateValidator for CountingValidator {
    async fn check(&self, state: &str, country_name: &str) -> Result<StateCheck> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let Some(code) = country::code_for(country_name) else {
            return Ok(StateCheck::UnknownCountry);
        };
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.known.contains(&(code.to_string(), state.to_string())) {
            Ok(StateCheck::Valid)
        } else {
            Ok(StateCheck::NoMatch)
        }
    }

    fn validator_name(&self) -> &'static str {
        "counting"
    }
}

/// A validator whose directory is unreachable
pub struct UnreachableValidator;

#[async_trait::async_trait]
impl StateValidator for UnreachableValidator {
    async fn check(&self, _state: &str, _country: &str) -> Result<StateCheck> {
        Err(Error::directory("connection refused"))
    }

    fn validator_name(&self) -> &'static str {
        "unreachable"
    }
}

/// A store whose every operation fails with a storage fault
pub struct FaultyStore;

#[async_trait::async_trait]
impl RecordStore for FaultyStore {
    async fn exists(&self, _name: &str) -> Result<bool> {
        Err(Error::storage("connection reset"))
    }

    async fn get(&self, _name: &str) -> Result<Option<AddressRecord>> {
        Err(Error::storage("connection reset"))
    }

    async fn create(&self, _record: NewAddress) -> Result<String> {
        Err(Error::storage("connection reset"))
    }

    async fn delete(&self, _name: &str) -> Result<()> {
        Err(Error::storage("connection reset"))
    }

    async fn update(&self, _name: &str, _patch: &AddressPatch) -> Result<()> {
        Err(Error::storage("connection reset"))
    }

    async fn find(&self, _state: &str, _country: &str) -> Result<Vec<AddressRecord>> {
        Err(Error::storage("connection reset"))
    }

    fn backend_name(&self) -> &'static str {
        "faulty"
    }
}

/// Service over a fresh memory store; returns the store and validator handles
pub fn memory_service() -> (AddressService, MemoryRecordStore, CountingValidator) {
    let store = MemoryRecordStore::new();
    let validator = CountingValidator::us_states();
    let service = AddressService::new(
        Arc::new(store.clone()),
        Arc::new(CountingValidator::sharing_counters_with(&validator)),
    );
    (service, store, validator)
}

pub fn jane_doe() -> AddressFields {
    AddressFields::new(
        "Jane Doe",
        "1 Main St",
        "Springfield",
        "Illinois",
        "United States",
    )
}

/// Update request that only names the record
pub fn update_for(name: &str) -> AddressFields {
    AddressFields {
        name: name.to_string(),
        ..AddressFields::default()
    }
}
