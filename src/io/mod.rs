mod fetcher;
mod object_source;
mod s3_source;

pub use fetcher::{resolve_content_type, ImageBytes, ImageFetcher, FALLBACK_CONTENT_TYPE};
pub use object_source::{ObjectSource, StoredObject};
pub use s3_source::{create_s3_client, S3ObjectSource, StaticCredentials};
