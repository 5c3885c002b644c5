//! Error types for the storage layer.

use lxforge_core::VpsId;
use thiserror::Error;

/// A result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during ledger and registry operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No registry record exists for this id.
    #[error("no vps record with id {0}")]
    NotFound(VpsId),

    /// The VPS id counter in the meta column family is not an 8-byte
    /// big-endian integer. The registry refuses to allocate ids from a
    /// damaged counter.
    #[error("vps id counter is corrupt ({0} bytes, expected 8)")]
    CorruptCounter(usize),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}
