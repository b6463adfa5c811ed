//! HTTP server layer for the image gateway.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   GET /   /last_image_{small,big}/{bucket}   /download_image/…  │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │   render    │  │        routes           │  │
//! │  │ (requests)  │  │   (HTML)    │  │  (router config, CORS)  │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod render;
pub mod routes;

pub use handlers::{
    download_image_handler, health_handler, home_handler, last_image_big_handler,
    last_image_small_handler, AppState, DownloadPathParams, ErrorResponse, HealthResponse,
};
pub use render::{
    download_path, ImageSize, PresentationRenderer, BIG_WIDTH_PX, DEFAULT_PAGE_TITLE,
    SMALL_WIDTH_PX,
};
pub use routes::{create_router, RouterConfig};
