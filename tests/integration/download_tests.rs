//! Integration tests for the /download_image endpoint.
//!
//! These tests verify:
//! - Exact bytes are returned with an image content type
//! - Content type resolution (store-reported, sniffed, fallback)
//! - Missing keys answer 404 with no body
//! - Store failures and timeouts answer 502

use std::time::Duration;

use axum::http::StatusCode;
use bytes::Bytes;

use latest_image_gateway::{
    create_router, AppState, BucketCatalog, ImageFetcher, LatestImageResolver, RouterConfig,
};

use super::test_utils::{
    build_router, create_test_jpeg, create_test_png, get, HangingObjectSource, MockImageIndex,
    MockObjectSource,
};

#[tokio::test]
async fn test_download_returns_exact_bytes() {
    let jpeg = create_test_jpeg(16, 16);
    let source = MockObjectSource::new().with_object("images", "a.jpg", jpeg.clone());
    let router = build_router(MockImageIndex::new(), source, "images");

    let response = get(&router, "/download_image/images/a.jpg").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), Some("image/jpeg"));
    assert_eq!(response.body, Bytes::from(jpeg));
}

#[tokio::test]
async fn test_download_sniffs_png() {
    let png = create_test_png(8, 8);
    let source = MockObjectSource::new().with_typed_object(
        "images-processed",
        "p.png",
        png.clone(),
        "binary/octet-stream",
    );
    let router = build_router(MockImageIndex::new(), source, "images");

    let response = get(&router, "/download_image/images-processed/p.png").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), Some("image/png"));
    assert_eq!(response.body, Bytes::from(png));
}

#[tokio::test]
async fn test_download_keeps_store_image_type() {
    let source = MockObjectSource::new().with_typed_object(
        "images",
        "x.webp",
        b"not really webp".to_vec(),
        "image/webp",
    );
    let router = build_router(MockImageIndex::new(), source, "images");

    let response = get(&router, "/download_image/images/x.webp").await;
    assert_eq!(response.content_type(), Some("image/webp"));
}

#[tokio::test]
async fn test_download_unknown_bytes_fall_back_to_jpeg() {
    let source = MockObjectSource::new().with_object("images", "blob", b"opaque".to_vec());
    let router = build_router(MockImageIndex::new(), source, "images");

    let response = get(&router, "/download_image/images/blob").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), Some("image/jpeg"));
    assert_eq!(&response.body[..], b"opaque");
}

#[tokio::test]
async fn test_download_missing_key_is_empty_404() {
    let source = MockObjectSource::new().with_object("images", "a.jpg", create_test_jpeg(4, 4));
    let router = build_router(MockImageIndex::new(), source, "images");

    let response = get(&router, "/download_image/images/missing.jpg").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_download_is_not_limited_to_catalog_buckets() {
    let source = MockObjectSource::new().with_object("archive", "old.jpg", vec![1, 2, 3]);
    let router = build_router(MockImageIndex::new(), source, "images");

    let response = get(&router, "/download_image/archive/old.jpg").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.body[..], &[1, 2, 3]);
}

#[tokio::test]
async fn test_download_decodes_percent_encoded_key() {
    let source = MockObjectSource::new().with_object("images", "dir/a b.jpg", vec![9]);
    let router = build_router(MockImageIndex::new(), source, "images");

    let response = get(&router, "/download_image/images/dir%2Fa%20b.jpg").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.body[..], &[9]);
}

#[tokio::test]
async fn test_download_store_unavailable_is_502() {
    let source = MockObjectSource::unavailable();
    let router = build_router(MockImageIndex::new(), source.clone(), "images");

    let response = get(&router, "/download_image/images/a.jpg").await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.json()["error"], "storage_error");

    // No retries
    assert_eq!(source.request_count(), 1);
}

#[tokio::test]
async fn test_download_timeout_is_502() {
    let resolver = LatestImageResolver::new(BucketCatalog::new("images"), MockImageIndex::new());
    let fetcher = ImageFetcher::with_timeout(HangingObjectSource, Duration::from_millis(50));
    let router = create_router(AppState::new(resolver, fetcher), RouterConfig::new());

    let response = get(&router, "/download_image/images/a.jpg").await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.json()["error"], "storage_timeout");
}

#[tokio::test]
async fn test_fragment_links_to_downloadable_image() {
    let jpeg = create_test_jpeg(8, 8);
    let index = MockImageIndex::new().with_row("images_uploaded", "a b.jpg", 1);
    let source = MockObjectSource::new().with_object("images", "a b.jpg", jpeg.clone());
    let router = build_router(index, source, "images");

    let fragment = get(&router, "/last_image_big/images").await.text();
    let src_start = fragment.find("src=\"").unwrap() + 5;
    let src_end = src_start + fragment[src_start..].find('"').unwrap();
    let src = &fragment[src_start..src_end];
    assert_eq!(src, "/download_image/images/a%20b.jpg");

    let response = get(&router, src).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, Bytes::from(jpeg));
}
