//! # Latest Image Gateway
//!
//! A small web gateway exposing the most recent image of three S3-compatible
//! buckets (uploaded, processed, anonymized) as HTML fragments and raw
//! downloads.
//!
//! Freshness comes from a relational metadata table per bucket, not from the
//! object store: the newest row by `time` names the object key to show.
//!
//! ## Architecture
//!
//! - [`catalog`] - Bucket catalog, metadata index and latest-image resolver
//! - [`io`] - Object store access and image fetching
//! - [`server`] - Axum routes, handlers and HTML rendering
//! - [`config`] - CLI and environment configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use latest_image_gateway::{
//!     create_router, create_s3_client, AppState, BucketCatalog, ImageFetcher,
//!     LatestImageResolver, RouterConfig, S3ObjectSource, SqlImageIndex,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let index = SqlImageIndex::connect_lazy("mysql://user:pass@db/images", 5).unwrap();
//!     let resolver = LatestImageResolver::new(BucketCatalog::new("liquor-images"), index);
//!
//!     let client = create_s3_client("http://localhost:9000", "us-east-1", None).await;
//!     let fetcher = ImageFetcher::new(S3ObjectSource::new(client));
//!
//!     let router = create_router(AppState::new(resolver, fetcher), RouterConfig::new());
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod io;
pub mod server;

// Re-export commonly used types
pub use catalog::{BucketCatalog, BucketKind, ImageIndex, LatestImageResolver, SqlImageIndex};
pub use config::{CheckConfig, Cli, Command, ServeConfig, StoreArgs};
pub use error::{CatalogError, FetchError, IoError, ResolveError, StoreError};
pub use io::{
    create_s3_client, ImageBytes, ImageFetcher, ObjectSource, S3ObjectSource, StaticCredentials,
    StoredObject,
};
pub use server::{
    create_router, AppState, ErrorResponse, HealthResponse, ImageSize, PresentationRenderer,
    RouterConfig,
};
