//! Image retrieval from the object store.

use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, error, warn};

use super::object_source::{ObjectSource, StoredObject};
use crate::catalog::DEFAULT_STORE_TIMEOUT;
use crate::error::{FetchError, IoError};

/// Content type used when neither the store nor the bytes identify the image.
pub const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

/// Raw bytes of one stored image together with its content type.
#[derive(Debug, Clone)]
pub struct ImageBytes {
    pub data: Bytes,
    pub content_type: String,
}

/// Fetches image objects by bucket and key.
pub struct ImageFetcher<O: ObjectSource> {
    source: O,
    timeout: Duration,
}

impl<O: ObjectSource> ImageFetcher<O> {
    pub fn new(source: O) -> Self {
        Self::with_timeout(source, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(source: O, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Get the object source.
    pub fn source(&self) -> &O {
        &self.source
    }

    /// Fetch `image` from `bucket`.
    ///
    /// Neither name is validated here: the object store is the only authority
    /// on which buckets and keys exist.
    pub async fn fetch(&self, bucket: &str, image: &str) -> Result<ImageBytes, FetchError> {
        debug!(bucket = bucket, key = image, "Fetching image");

        let result = match tokio::time::timeout(self.timeout, self.source.get_object(bucket, image))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(IoError::Timeout(self.timeout)),
        };

        match result {
            Ok(object) => Ok(into_image_bytes(object)),
            Err(e) => {
                let err = FetchError::from_io(e, bucket, image);
                match &err {
                    FetchError::ObjectNotFound { .. } => warn!(
                        bucket = bucket,
                        key = image,
                        "Image missing from object store, metadata may be out of sync"
                    ),
                    FetchError::StoreUnavailable(io_err) => error!(
                        bucket = bucket,
                        key = image,
                        "Failed to fetch image: {}",
                        io_err
                    ),
                }
                Err(err)
            }
        }
    }
}

fn into_image_bytes(object: StoredObject) -> ImageBytes {
    let content_type = resolve_content_type(object.content_type.as_deref(), &object.data);
    ImageBytes {
        data: object.data,
        content_type,
    }
}

/// Pick the response content type for an image.
///
/// An `image/*` type reported by the store wins. Otherwise the type is sniffed
/// from the leading bytes, falling back to JPEG.
pub fn resolve_content_type(reported: Option<&str>, data: &[u8]) -> String {
    if let Some(ct) = reported {
        if ct.trim().to_ascii_lowercase().starts_with("image/") {
            return ct.trim().to_string();
        }
    }

    image::guess_format(data)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| FALLBACK_CONTENT_TYPE.to_string())
}
