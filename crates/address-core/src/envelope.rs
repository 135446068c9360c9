//! Response envelope
//!
//! Every service operation answers with `{ "status": ..., "data": ... }`.
//! `success` and `fail` describe the outcome of the request itself; `error`
//! means the server could not complete it (storage or directory fault).

use serde::Serialize;

use crate::error::Error;
use crate::record::AddressRecord;

pub const MSG_ALREADY_EXISTS: &str = "Address record already exists.";
pub const MSG_CREATION_FAILED: &str = "Address record creation failed.";
pub const MSG_NAME_REQUIRED: &str = "Name is required.";
pub const MSG_STATE_INVALID: &str = "State invalid.";
pub const MSG_DELETED: &str = "Address record deleted.";
pub const MSG_UPDATED: &str = "Address record updated.";
pub const MSG_NOT_FOUND: &str = "Address record does not exist.";
pub const MSG_NO_RECORDS: &str = "No address records found.";
pub const MSG_STORAGE_FAULT: &str = "Internal storage error.";
pub const MSG_DIRECTORY_UNAVAILABLE: &str = "State validation service unavailable.";

/// Outcome tag of an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
    Error,
}

/// Envelope payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// Identifier of a newly created record
    Id(String),
    /// Human-readable message
    Message(String),
    /// Matching records
    Records(Vec<AddressRecord>),
}

/// Uniform response of every service operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub status: Status,
    pub data: Payload,
}

impl Envelope {
    pub fn created(id: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            data: Payload::Id(id.into()),
        }
    }

    pub fn records(records: Vec<AddressRecord>) -> Self {
        Self {
            status: Status::Success,
            data: Payload::Records(records),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            data: Payload::Message(message.into()),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: Status::Fail,
            data: Payload::Message(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            data: Payload::Message(message.into()),
        }
    }
}

impl From<&Error> for Envelope {
    fn from(err: &Error) -> Self {
        match err {
            Error::AlreadyExists(_) => Envelope::fail(MSG_ALREADY_EXISTS),
            Error::NotFound(_) => Envelope::fail(MSG_NOT_FOUND),
            Error::CreationFailed(_) => Envelope::fail(MSG_CREATION_FAILED),
            Error::InvalidInput(msg) => Envelope::fail(msg.clone()),
            Error::UnresolvableCountry(_) | Error::StateNotFound { .. } => {
                Envelope::fail(MSG_STATE_INVALID)
            }
            Error::Directory(_) => Envelope::error(MSG_DIRECTORY_UNAVAILABLE),
            Error::StorageFault(_)
            | Error::Config(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::Other(_) => Envelope::error(MSG_STORAGE_FAULT),
        }
    }
}
