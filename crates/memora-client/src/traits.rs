//! Remote client abstraction trait
//!
//! This module defines the RemoteClient trait that all CRUD transports must
//! implement, plus the error and record types that cross the seam.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// One resource's field values as they travel over the transport.
pub type Record = serde_json::Map<String, Value>;

/// Transport operation errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for transport operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Remote CRUD transport seam
///
/// Model types delegate all persistence to an implementation of this trait,
/// parameterized by the resource namespace (the remote collection name).
/// Failures are surfaced untranslated; callers see the transport's own error.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Fetch one record by identifier.
    async fn retrieve(&self, namespace: &str, uuid: &str) -> ClientResult<Record>;

    /// Fetch every record in the namespace, in the order the transport returns them.
    async fn list(&self, namespace: &str) -> ClientResult<Vec<Record>>;

    /// Create a record from the given field values. Returns the transport's response.
    async fn create(&self, namespace: &str, values: &Record) -> ClientResult<Value>;

    /// Update the record at `uuid` with the given field values.
    async fn update(&self, namespace: &str, uuid: &str, values: &Record) -> ClientResult<Value>;

    /// Delete the record at `uuid`. Returns the transport's response.
    async fn remove(&self, namespace: &str, uuid: &str) -> ClientResult<Value>;
}
