//! Response definitions
//!
//! Exactly one response is sent back for every command.

use serde::{Deserialize, Serialize};

use super::Value;

/// Response kinds, with their wire codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseKind {
    Success = 0x00,
    Error = 0x01,
}

impl ResponseKind {
    /// Look up a response kind by its wire code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(ResponseKind::Success),
            0x01 => Some(ResponseKind::Error),
            _ => None,
        }
    }
}

/// A response from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// The value's shape depends on the command's operation:
    /// key/bucket names for KEYS and BUCKETS, a list for pattern reads,
    /// the stored value for absolute reads, and nothing useful otherwise.
    Success { value: Value },

    /// Store-reported failure; the message is never empty
    Error { message: String },
}

impl Response {
    /// Create a SUCCESS response carrying a value
    pub fn success(value: Value) -> Self {
        Response::Success { value }
    }

    /// Create a SUCCESS response with no value
    pub fn ok() -> Self {
        Response::Success { value: Value::Null }
    }

    /// Create an ERROR response
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ResponseKind {
        match self {
            Response::Success { .. } => ResponseKind::Success,
            Response::Error { .. } => ResponseKind::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind() == ResponseKind::Success
    }

    /// The carried value; `None` for ERROR responses
    pub fn value(&self) -> Option<&Value> {
        match self {
            Response::Success { value } => Some(value),
            Response::Error { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Response::Success { value } => Some(value),
            Response::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Response::Success { .. } => None,
            Response::Error { message } => Some(message),
        }
    }
}
