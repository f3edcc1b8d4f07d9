//! Command definitions
//!
//! One command per client call. The payload is a closed sum type, so the
//! operation kind is always derived from it and can never disagree.

use serde::{Deserialize, Serialize};

use super::Value;

/// Operation kinds, with their wire codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Operation {
    Create = 0x01,
    Write = 0x02,
    Read = 0x03,
    Delete = 0x04,
    Keys = 0x05,
    Buckets = 0x06,
}

impl Operation {
    /// Look up an operation by its wire code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Operation::Create),
            0x02 => Some(Operation::Write),
            0x03 => Some(Operation::Read),
            0x04 => Some(Operation::Delete),
            0x05 => Some(Operation::Keys),
            0x06 => Some(Operation::Buckets),
            _ => None,
        }
    }
}

/// How a key argument is matched against stored keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchKind {
    /// Exact key
    Absolute,

    /// Regular expression over keys
    Regex,
}

/// Default key capacity of a new bucket
pub const DEFAULT_MAX_KEYS: u32 = 100;

/// Parameters of a CREATE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePayload {
    pub bucket_name: String,
    pub max_keys: u32,
    pub is_volatile: bool,
}

impl CreatePayload {
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            max_keys: DEFAULT_MAX_KEYS,
            is_volatile: false,
        }
    }
}

/// Parameters of a WRITE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritePayload {
    pub key: String,
    pub value: Value,
    /// Create the bucket as volatile if it does not exist yet
    pub create_volatile_if_missing: bool,
}

/// Parameters of a READ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadPayload {
    pub key_or_pattern: String,
    pub match_kind: MatchKind,
}

/// Parameters of a DELETE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletePayload {
    pub key_or_pattern: String,
    pub match_kind: MatchKind,
}

/// Operation-specific parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    Create(CreatePayload),
    Write(WritePayload),
    Read(ReadPayload),
    Delete(DeletePayload),
    /// List the keys of a bucket
    Keys,
    /// List all buckets
    Buckets,
}

impl Payload {
    /// Operation this payload belongs to
    pub fn operation(&self) -> Operation {
        match self {
            Payload::Create(_) => Operation::Create,
            Payload::Write(_) => Operation::Write,
            Payload::Read(_) => Operation::Read,
            Payload::Delete(_) => Operation::Delete,
            Payload::Keys => Operation::Keys,
            Payload::Buckets => Operation::Buckets,
        }
    }
}

/// A request to the store. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    bucket_name: Option<String>,
    payload: Payload,
}

impl Command {
    pub fn create(payload: CreatePayload) -> Self {
        Self {
            bucket_name: Some(payload.bucket_name.clone()),
            payload: Payload::Create(payload),
        }
    }

    pub fn write(
        bucket_name: impl Into<String>,
        key: impl Into<String>,
        value: Value,
        create_volatile_if_missing: bool,
    ) -> Self {
        Self {
            bucket_name: Some(bucket_name.into()),
            payload: Payload::Write(WritePayload {
                key: key.into(),
                value,
                create_volatile_if_missing,
            }),
        }
    }

    pub fn read(
        bucket_name: impl Into<String>,
        key_or_pattern: impl Into<String>,
        match_kind: MatchKind,
    ) -> Self {
        Self {
            bucket_name: Some(bucket_name.into()),
            payload: Payload::Read(ReadPayload {
                key_or_pattern: key_or_pattern.into(),
                match_kind,
            }),
        }
    }

    pub fn delete(
        bucket_name: impl Into<String>,
        key_or_pattern: impl Into<String>,
        match_kind: MatchKind,
    ) -> Self {
        Self {
            bucket_name: Some(bucket_name.into()),
            payload: Payload::Delete(DeletePayload {
                key_or_pattern: key_or_pattern.into(),
                match_kind,
            }),
        }
    }

    pub fn keys(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: Some(bucket_name.into()),
            payload: Payload::Keys,
        }
    }

    /// Bucket listing carries neither a bucket name nor a payload
    pub fn buckets() -> Self {
        Self {
            bucket_name: None,
            payload: Payload::Buckets,
        }
    }

    /// Get the operation kind
    pub fn operation(&self) -> Operation {
        self.payload.operation()
    }

    pub fn bucket_name(&self) -> Option<&str> {
        self.bucket_name.as_deref()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}
