//! Cfgsync - typed, self-healing settings files for the overlay client.
//!
//! This library provides the core functionality for the `cfgsync` CLI tool
//! and for embedding: declared setting schemas, a TOML-backed persistent
//! store that repairs invalid values instead of rejecting them, and a
//! configuration service that publishes immutable snapshots which can be
//! swapped atomically while readers are active.

pub mod cli;
pub mod derived;
pub mod schema;
pub mod service;
pub mod store;
pub mod sync;

use std::path::PathBuf;

/// Library-level error type for cfgsync operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write {}: {}", .path.display(), .source)]
    StoreWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("not initialized: call initialize() first")]
    NotInitialized,

    #[error("already initialized")]
    AlreadyInitialized,

    #[error("duplicate setting {category}.{key}")]
    DuplicateSetting { category: String, key: String },
}

/// Result type alias for cfgsync operations.
pub type Result<T> = std::result::Result<T, Error>;
