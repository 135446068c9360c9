// # Record Store Implementations
//
// This module provides the built-in implementations of the RecordStore
// trait. The MongoDB backend lives in its own crate.

use std::collections::HashMap;

use crate::Error;
use crate::record::{AddressPatch, AddressRecord, NewAddress};

pub mod file;
pub mod memory;

pub use file::{FileRecordStore, FileRecordStoreFactory};
pub use memory::{MemoryRecordStore, MemoryRecordStoreFactory};

/// Identifier for a record created by an in-process store
pub(crate) fn new_record_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Records keyed by normalized name
///
/// Shared by the in-process stores. Every mutation is a single call made
/// while the caller holds its write lock, so check-and-act is atomic.
pub(crate) type RecordTable = HashMap<String, AddressRecord>;

pub(crate) fn insert_new(table: &mut RecordTable, new: NewAddress) -> Result<String, Error> {
    if table.contains_key(&new.name) {
        return Err(Error::already_exists(new.name));
    }
    let id = new_record_id();
    let name = new.name.clone();
    table.insert(name, AddressRecord::from_new(id.clone(), new));
    Ok(id)
}

pub(crate) fn remove(table: &mut RecordTable, name: &str) -> Result<(), Error> {
    table
        .remove(name)
        .map(|_| ())
        .ok_or_else(|| Error::not_found(name))
}

pub(crate) fn patch(table: &mut RecordTable, name: &str, patch: &AddressPatch) -> Result<(), Error> {
    let record = table.get_mut(name).ok_or_else(|| Error::not_found(name))?;
    patch.apply(record);
    Ok(())
}

pub(crate) fn located_in(table: &RecordTable, state: &str, country: &str) -> Vec<AddressRecord> {
    let mut matches: Vec<AddressRecord> = table
        .values()
        .filter(|record| record.is_located_in(state, country))
        .cloned()
        .collect();
    matches.sort_by(|a, b| a.name.cmp(&b.name));
    matches
}
