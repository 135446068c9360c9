// # address-core
//
// Core library for the address records service.
//
// ## Architecture Overview
//
// This library provides the functionality behind the HTTP surface:
// - **RecordStore**: Trait for persisting address records (memory, file, MongoDB)
// - **StateValidator**: Trait for confirming a state belongs to a country
// - **AddressService**: Workflow that normalizes, validates, stores, and
//   answers with a response envelope
// - **BackendRegistry**: Plugin-based registry for stores and validators
//
// ## Design Principles
//
// 1. **Store-enforced uniqueness**: One record per normalized name, enforced
//    by the store itself rather than by a separate existence check
// 2. **Visible faults**: Storage and directory failures become `error`
//    envelopes, never silently empty results
// 3. **Library-First**: The daemon is a thin wrapper around this crate

pub mod config;
pub mod country;
pub mod envelope;
pub mod error;
pub mod record;
pub mod registry;
pub mod service;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::{DirectoryConfig, ServiceConfig, StoreConfig};
pub use envelope::{Envelope, Payload, Status};
pub use error::{Error, Result};
pub use record::{AddressPatch, AddressRecord, NewAddress, normalize_name};
pub use registry::BackendRegistry;
pub use service::{AddressFields, AddressService};
pub use store::{FileRecordStore, MemoryRecordStore};
pub use traits::{RecordStore, StateCheck, StateValidator};
