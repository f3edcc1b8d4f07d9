//! Protocol Module
//!
//! Defines the wire protocol between the client and the store.
//!
//! One connection carries exactly one exchange: the client writes a single
//! command frame, the store answers with a single response frame, and the
//! connection is closed.
//!
//! ### Operations
//! - 0x01: CREATE  - create a bucket
//! - 0x02: WRITE   - write a key
//! - 0x03: READ    - read a key or a key pattern
//! - 0x04: DELETE  - delete a key or a key pattern
//! - 0x05: KEYS    - list the keys of a bucket
//! - 0x06: BUCKETS - list buckets
//!
//! ### Response Kinds
//! - 0x00: SUCCESS
//! - 0x01: ERROR

mod command;
mod response;
mod value;
mod codec;

pub use command::{
    Command, CreatePayload, DeletePayload, MatchKind, Operation, Payload, ReadPayload,
    WritePayload, DEFAULT_MAX_KEYS,
};
pub use response::{Response, ResponseKind};
pub use value::Value;
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_BODY_SIZE,
    PROTOCOL_VERSION,
};
