use async_trait::async_trait;
use bytes::Bytes;

use crate::error::IoError;

/// An object read from the store.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Raw object bytes
    pub data: Bytes,

    /// Content type reported by the store, if any
    pub content_type: Option<String>,
}

/// Trait for reading whole objects by bucket and key.
///
/// This abstraction allows the fetcher to work with different storage backends
/// (S3, in-memory doubles) without being tied to a specific client.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Read the full object at `bucket`/`key`.
    ///
    /// Returns `IoError::NotFound` when the key does not exist.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject, IoError>;
}
