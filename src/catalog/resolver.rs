//! Resolution of a bucket name to its most recent image.

use std::time::Duration;

use tracing::{debug, error, warn};

use crate::error::{ResolveError, StoreError};

use super::bucket::BucketCatalog;
use super::index::ImageIndex;

/// Default bound on a single metadata or object store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves the latest image name for a configured bucket.
///
/// The resolver consults the catalog for the table, then asks the index for
/// the newest row. Every failure is logged with bucket and table context before
/// being returned. Nothing is retried.
pub struct LatestImageResolver<I: ImageIndex> {
    catalog: BucketCatalog,
    index: I,
    timeout: Duration,
}

impl<I: ImageIndex> LatestImageResolver<I> {
    /// Create a resolver with the default timeout.
    pub fn new(catalog: BucketCatalog, index: I) -> Self {
        Self::with_timeout(catalog, index, DEFAULT_STORE_TIMEOUT)
    }

    /// Create a resolver with a custom timeout.
    pub fn with_timeout(catalog: BucketCatalog, index: I, timeout: Duration) -> Self {
        Self {
            catalog,
            index,
            timeout,
        }
    }

    /// Get the bucket catalog.
    pub fn catalog(&self) -> &BucketCatalog {
        &self.catalog
    }

    /// Get the image index.
    pub fn index(&self) -> &I {
        &self.index
    }

    /// Return the latest image name for `bucket`, or `None` if none is recorded.
    pub async fn resolve(&self, bucket: &str) -> Result<Option<String>, ResolveError> {
        let table = self.catalog.table_for(bucket).map_err(|e| {
            warn!(bucket = bucket, "Rejected lookup: {}", e);
            e
        })?;

        let result = match tokio::time::timeout(self.timeout, self.index.latest_image(table)).await
        {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        };

        match result {
            Ok(name) => {
                debug!(bucket = bucket, table = table, image = ?name, "Resolved latest image");
                Ok(name)
            }
            Err(e) => {
                error!(
                    bucket = bucket,
                    table = table,
                    "Failed to query latest image: {}",
                    e
                );
                Err(ResolveError::StoreUnavailable(e))
            }
        }
    }
}
