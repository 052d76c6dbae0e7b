//! Client for a hosted JSON realtime database.
//!
//! Documents live in a single JSON tree and are addressed by slash-separated
//! paths. Keys may not contain `.`, `$`, `#`, `[` or `]`.

mod client;
mod error;

pub use client::{validate_path, RealtimeDbClient};
pub use error::DatabaseError;
