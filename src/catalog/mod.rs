//! Latest-image resolution.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          LatestImageResolver            │
//! │   (timeout, logging, error mapping)     │
//! └──────────┬───────────────────┬──────────┘
//!            │                   │
//!            ▼                   ▼
//! ┌───────────────────┐ ┌───────────────────┐
//! │   BucketCatalog   │ │  ImageIndex trait │
//! │ (bucket → table)  │ │ (newest row name) │
//! └───────────────────┘ └─────────┬─────────┘
//!                                 │
//!                                 ▼
//!                       ┌───────────────────┐
//!                       │   SqlImageIndex   │
//!                       │ (sqlx Any pool)   │
//!                       └───────────────────┘
//! ```

mod bucket;
mod index;
mod resolver;

pub use bucket::{BucketCatalog, BucketKind};
pub use index::{
    check_database_url, latest_image_query, ImageIndex, SqlImageIndex, DEFAULT_MAX_CONNECTIONS,
    SUPPORTED_SCHEMES,
};
pub use resolver::{LatestImageResolver, DEFAULT_STORE_TIMEOUT};
