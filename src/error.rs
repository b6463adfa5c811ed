use std::time::Duration;

use thiserror::Error;

/// Errors from the static bucket catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Bucket name is not one of the three configured buckets
    #[error("Unknown bucket: {bucket}")]
    UnknownBucket { bucket: String },
}

/// Errors from the relational metadata store
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Could not reach the database or obtain a pooled connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query was rejected or its result could not be decoded
    #[error("Query error: {0}")]
    Query(String),

    /// The store did not answer within the configured bound
    #[error("Timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The database URL cannot be served by this build
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    /// Whether retrying later cannot help.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Query(_) | StoreError::Configuration(_))
    }
}

/// I/O errors that can occur when reading from the object store
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Error from S3 or S3-compatible storage
    #[error("S3 error: {0}")]
    S3(String),

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Object not found
    #[error("Object not found: {0}")]
    NotFound(String),

    /// The store did not answer within the configured bound
    #[error("Timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
}

/// Errors returned when resolving the latest image of a bucket
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error(transparent)]
    UnknownBucket(#[from] CatalogError),

    #[error("Metadata store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

/// Errors returned when fetching image bytes
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Key is missing from the bucket even though it may be referenced by metadata
    #[error("Object {key} not found in bucket {bucket}")]
    ObjectNotFound { bucket: String, key: String },

    /// Connectivity, auth or timeout failure talking to the object store
    #[error("Object store unavailable: {0}")]
    StoreUnavailable(IoError),
}

impl FetchError {
    /// Classify an object store error for the given bucket and key.
    pub fn from_io(err: IoError, bucket: &str, key: &str) -> Self {
        match err {
            IoError::NotFound(_) => FetchError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            other => FetchError::StoreUnavailable(other),
        }
    }
}
