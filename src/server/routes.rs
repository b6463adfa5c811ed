//! Router configuration for the image gateway.
//!
//! # Route Structure
//!
//! ```text
//! /                                         - Home page
//! /last_image_small/{bucket_name}           - Small image fragment
//! /last_image_big/{bucket_name}             - Big image fragment
//! /download_image/{bucket_name}/{image_name} - Raw image bytes
//! /health                                   - Health check
//! ```
//!
//! # Example
//!
//! ```ignore
//! use latest_image_gateway::server::routes::{create_router, RouterConfig};
//!
//! let state = AppState::new(resolver, fetcher);
//! let router = create_router(state, RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{routing::get, Router};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    download_image_handler, health_handler, home_handler, last_image_big_handler,
    last_image_small_handler, AppState,
};
use crate::catalog::ImageIndex;
use crate::io::ObjectSource;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// All routes are public GET routes sharing one CORS layer.
pub fn create_router<I, O>(state: AppState<I, O>, config: RouterConfig) -> Router
where
    I: ImageIndex + 'static,
    O: ObjectSource + 'static,
{
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/", get(home_handler::<I, O>))
        .route(
            "/last_image_small/{bucket_name}",
            get(last_image_small_handler::<I, O>),
        )
        .route(
            "/last_image_big/{bucket_name}",
            get(last_image_big_handler::<I, O>),
        )
        .route(
            "/download_image/{bucket_name}/{image_name}",
            get(download_image_handler::<I, O>),
        )
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
