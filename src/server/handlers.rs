//! HTTP request handlers for the image gateway.
//!
//! # Endpoints
//!
//! - `GET /` - Home page with the latest image of each bucket
//! - `GET /last_image_small/{bucket_name}` - Small image fragment
//! - `GET /last_image_big/{bucket_name}` - Big image fragment
//! - `GET /download_image/{bucket_name}/{image_name}` - Raw image bytes
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::catalog::{BucketKind, ImageIndex, LatestImageResolver};
use crate::error::{FetchError, IoError, ResolveError};
use crate::io::{ImageFetcher, ObjectSource};

use super::render::{ImageSize, PresentationRenderer};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<I: ImageIndex, O: ObjectSource> {
    /// Latest-image lookups against the metadata store
    pub resolver: Arc<LatestImageResolver<I>>,

    /// Image downloads from the object store
    pub fetcher: Arc<ImageFetcher<O>>,

    /// HTML rendering
    pub renderer: Arc<PresentationRenderer>,
}

impl<I: ImageIndex, O: ObjectSource> AppState<I, O> {
    /// Create a new application state with the default renderer.
    pub fn new(resolver: LatestImageResolver<I>, fetcher: ImageFetcher<O>) -> Self {
        Self::with_renderer(resolver, fetcher, PresentationRenderer::default())
    }

    pub fn with_renderer(
        resolver: LatestImageResolver<I>,
        fetcher: ImageFetcher<O>,
        renderer: PresentationRenderer,
    ) -> Self {
        Self {
            resolver: Arc::new(resolver),
            fetcher: Arc::new(fetcher),
            renderer: Arc::new(renderer),
        }
    }
}

impl<I: ImageIndex, O: ObjectSource> Clone for AppState<I, O> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            fetcher: Arc::clone(&self.fetcher),
            renderer: Arc::clone(&self.renderer),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Path parameters for image downloads.
///
/// Extracted from: `/download_image/{bucket_name}/{image_name}`
#[derive(Debug, Deserialize)]
pub struct DownloadPathParams {
    pub bucket_name: String,
    pub image_name: String,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "unknown_bucket", "store_unavailable")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    pub status: u16,
}

impl ErrorResponse {
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: status.as_u16(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ResolveError to HTTP response.
///
/// Store failures were already logged by the resolver, so only the status
/// mapping is traced here.
impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ResolveError::UnknownBucket(_) => (StatusCode::NOT_FOUND, "unknown_bucket"),
            ResolveError::StoreUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
            }
        };
        let message = self.to_string();

        debug!(
            error_type = error_type,
            status = status.as_u16(),
            "Lookup failed: {}",
            message
        );

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

/// Convert FetchError to HTTP response.
///
/// A missing object answers a bare 404 with no body.
impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            FetchError::ObjectNotFound { .. } => return StatusCode::NOT_FOUND.into_response(),
            FetchError::StoreUnavailable(IoError::Timeout(_)) => {
                (StatusCode::BAD_GATEWAY, "storage_timeout")
            }
            FetchError::StoreUnavailable(_) => (StatusCode::BAD_GATEWAY, "storage_error"),
        };
        let message = self.to_string();

        debug!(
            error_type = error_type,
            status = status.as_u16(),
            "Download failed: {}",
            message
        );

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle home page requests.
///
/// # Endpoint
///
/// `GET /`
///
/// # Response
///
/// `200 OK` with an HTML page showing the latest small image of the uploaded,
/// processed and anonymized buckets. The three lookups run concurrently; a
/// bucket whose lookup fails is shown as "No image to show".
pub async fn home_handler<I, O>(State(state): State<AppState<I, O>>) -> Html<String>
where
    I: ImageIndex + 'static,
    O: ObjectSource + 'static,
{
    let catalog = state.resolver.catalog();
    let uploaded = catalog.bucket_name(BucketKind::Uploaded);
    let processed = catalog.bucket_name(BucketKind::Processed);
    let anonymized = catalog.bucket_name(BucketKind::Anonymized);

    let (uploaded_html, processed_html, anonymized_html) = tokio::join!(
        home_slot(&state, uploaded),
        home_slot(&state, processed),
        home_slot(&state, anonymized),
    );

    Html(
        state
            .renderer
            .render_home(&uploaded_html, &processed_html, &anonymized_html),
    )
}

/// Render one home page slot, degrading to the missing fragment on failure.
async fn home_slot<I, O>(state: &AppState<I, O>, bucket: &str) -> String
where
    I: ImageIndex,
    O: ObjectSource,
{
    match state.resolver.resolve(bucket).await {
        Ok(Some(image)) => state.renderer.render_image(ImageSize::Small, bucket, &image),
        Ok(None) => state.renderer.render_missing(),
        Err(e) => {
            warn!(bucket = bucket, "Home page slot degraded: {}", e);
            state.renderer.render_missing()
        }
    }
}

/// Handle small fragment requests.
///
/// # Endpoint
///
/// `GET /last_image_small/{bucket_name}`
///
/// # Response
///
/// - `200 OK`: `<img>` fragment 260px wide, or "No image to show"
/// - `404 Not Found`: Bucket is not one of the configured buckets
/// - `503 Service Unavailable`: Metadata store failure
pub async fn last_image_small_handler<I, O>(
    State(state): State<AppState<I, O>>,
    Path(bucket_name): Path<String>,
) -> Result<Html<String>, ResolveError>
where
    I: ImageIndex + 'static,
    O: ObjectSource + 'static,
{
    last_image_fragment(&state, ImageSize::Small, &bucket_name).await
}

/// Handle big fragment requests.
///
/// # Endpoint
///
/// `GET /last_image_big/{bucket_name}`
///
/// Same as the small variant with a 575px wide image.
pub async fn last_image_big_handler<I, O>(
    State(state): State<AppState<I, O>>,
    Path(bucket_name): Path<String>,
) -> Result<Html<String>, ResolveError>
where
    I: ImageIndex + 'static,
    O: ObjectSource + 'static,
{
    last_image_fragment(&state, ImageSize::Big, &bucket_name).await
}

async fn last_image_fragment<I, O>(
    state: &AppState<I, O>,
    size: ImageSize,
    bucket: &str,
) -> Result<Html<String>, ResolveError>
where
    I: ImageIndex,
    O: ObjectSource,
{
    let html = match state.resolver.resolve(bucket).await? {
        Some(image) => state.renderer.render_image(size, bucket, &image),
        None => state.renderer.render_missing(),
    };

    Ok(Html(html))
}

/// Handle image downloads.
///
/// # Endpoint
///
/// `GET /download_image/{bucket_name}/{image_name}`
///
/// # Response
///
/// - `200 OK`: Raw image bytes with the image content type
/// - `404 Not Found`: Key missing from the bucket (empty body)
/// - `502 Bad Gateway`: Object store failure
pub async fn download_image_handler<I, O>(
    State(state): State<AppState<I, O>>,
    Path(params): Path<DownloadPathParams>,
) -> Result<Response, FetchError>
where
    I: ImageIndex + 'static,
    O: ObjectSource + 'static,
{
    let image = state
        .fetcher
        .fetch(&params.bucket_name, &params.image_name)
        .await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, image.content_type.as_str())
        .body(axum::body::Body::from(image.data));

    match response {
        Ok(response) => Ok(response),
        Err(e) => {
            // Only reachable if the store reported an unrepresentable header value
            error!(
                bucket = %params.bucket_name,
                key = %params.image_name,
                "Failed to build image response: {}",
                e
            );
            Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
