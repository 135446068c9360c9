//! Core traits for the address records service
//!
//! This module defines the abstract interfaces that all backends must follow.
//!
//! - [`RecordStore`]: Persist and query address records
//! - [`StateValidator`]: Confirm a state belongs to a country

pub mod record_store;
pub mod state_validator;

pub use record_store::{RecordStore, RecordStoreFactory};
pub use state_validator::{StateCheck, StateValidator, StateValidatorFactory};
