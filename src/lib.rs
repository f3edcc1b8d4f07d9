//! # thot
//!
//! Client-side access to a thot bucketed key-value store, plus a tag-driven
//! decoder for turning documents into typed values:
//! - One fresh TCP connection per operation, one command, one response
//! - Soft-failure contract: operations return `false`, `None` or an empty
//!   list instead of errors
//! - Explicit, versioned binary wire format
//! - Declarative field tags for document decoding
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Caller                                │
//! └──────────────┬───────────────────────────────┬──────────────┘
//!                │                               │
//!                ▼                               ▼
//!   ┌────────────────────────┐       ┌────────────────────────┐
//!   │   Connector (client)   │       │    Tagged Decoder      │
//!   │  Command -> Response   │       │  Document -> T         │
//!   └───────────┬────────────┘       └───────────┬────────────┘
//!               │                                │
//!               ▼                                ▼
//!   ┌────────────────────────┐       ┌────────────────────────┐
//!   │   Protocol / Codec     │       │   Document sources     │
//!   │  framed bincode        │       │  serde_json, Value     │
//!   └───────────┬────────────┘       └────────────────────────┘
//!               │  TCP :12903
//!               ▼
//!         ( remote store )
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod client;
pub mod document;
pub mod decoder;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DecodeError, Result, ThotError};
pub use config::Config;
pub use client::{Connector, StoreConnector};
pub use decoder::{decode, Decodable};
pub use document::Document;
pub use protocol::Value;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of thot
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
