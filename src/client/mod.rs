//! Client Module
//!
//! Store access over TCP.
//!
//! ## Model
//! - One fresh connection per call, never reused
//! - Exactly one command written, exactly one response read
//! - Fully blocking; no timeouts unless the [`Config`](crate::Config) sets them
//! - Every failure becomes the operation's soft-failure return value

mod connector;

pub use connector::{Connector, StoreConnector};
