//! API integration tests for the HTML routes.
//!
//! Tests verify:
//! - Small and big fragments for buckets with and without images
//! - Home page composition and per-slot degradation
//! - Error statuses for unknown buckets and store failures
//! - Bucket isolation, idempotence, CORS and health

use axum::body::Body;
use axum::http::{Request, StatusCode};

use super::test_utils::{build_router, get, send, MockImageIndex, MockObjectSource};

const NO_IMAGE: &str = "No image to show";

fn seeded_index() -> MockImageIndex {
    MockImageIndex::new()
        .with_row("images_uploaded", "up-old.jpg", 1)
        .with_row("images_uploaded", "up-new.jpg", 3)
        .with_row("images_uploaded", "up-mid.jpg", 2)
        .with_row("images_processed", "proc.jpg", 10)
}

// =============================================================================
// Fragments
// =============================================================================

#[tokio::test]
async fn test_last_image_small() {
    let router = build_router(seeded_index(), MockObjectSource::new(), "images");

    let response = get(&router, "/last_image_small/images").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .content_type()
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(
        response.text(),
        r#"<img src="/download_image/images/up-new.jpg" style="width:260px;">"#
    );
}

#[tokio::test]
async fn test_last_image_big() {
    let router = build_router(seeded_index(), MockObjectSource::new(), "images");

    let response = get(&router, "/last_image_big/images-processed").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.text(),
        r#"<img src="/download_image/images-processed/proc.jpg" style="width:575px;">"#
    );
}

#[tokio::test]
async fn test_latest_is_by_time_not_insertion_order() {
    let index = MockImageIndex::new()
        .with_row("images_uploaded", "b.jpg", 200)
        .with_row("images_uploaded", "a.jpg", 100);
    let router = build_router(index, MockObjectSource::new(), "images");

    let text = get(&router, "/last_image_small/images").await.text();
    assert!(text.contains("/download_image/images/b.jpg"));
    assert!(!text.contains("a.jpg"));
}

#[tokio::test]
async fn test_empty_bucket_renders_missing() {
    let router = build_router(seeded_index(), MockObjectSource::new(), "images");

    for uri in [
        "/last_image_small/images-anonymized",
        "/last_image_big/images-anonymized",
    ] {
        let response = get(&router, uri).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.text().contains(NO_IMAGE));
        assert!(!response.text().contains("<img"));
    }
}

#[tokio::test]
async fn test_unknown_bucket_is_404() {
    let index = seeded_index();
    let router = build_router(index.clone(), MockObjectSource::new(), "images");

    let response = get(&router, "/last_image_small/other-bucket").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "unknown_bucket");

    let response = get(&router, "/last_image_big/other-bucket").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    assert!(index.queried_tables().await.is_empty());
}

#[tokio::test]
async fn test_store_failure_is_503() {
    let index = seeded_index().with_failing_table("images_uploaded");
    let router = build_router(index, MockObjectSource::new(), "images");

    let response = get(&router, "/last_image_small/images").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json()["error"], "store_unavailable");

    // Other buckets are unaffected
    let response = get(&router, "/last_image_small/images-processed").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_image_names_are_escaped() {
    let index = MockImageIndex::new().with_row("images_uploaded", "<b>x\".jpg", 1);
    let router = build_router(index, MockObjectSource::new(), "images");

    let text = get(&router, "/last_image_small/images").await.text();
    assert!(!text.contains("<b>"));
    assert!(text.contains("/download_image/images/%3Cb%3Ex%22.jpg"));
}

// =============================================================================
// Home Page
// =============================================================================

#[tokio::test]
async fn test_home_page() {
    let router = build_router(seeded_index(), MockObjectSource::new(), "images");

    let response = get(&router, "/").await;
    assert_eq!(response.status, StatusCode::OK);

    let html = response.text();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(
        r#"<img src="/download_image/images/up-new.jpg" style="width:260px;">"#
    ));
    assert!(html.contains(
        r#"<img src="/download_image/images-processed/proc.jpg" style="width:260px;">"#
    ));
    assert!(html.contains(NO_IMAGE));

    let uploaded = html.find("Last Uploaded Image").unwrap();
    let processed = html.find("Last Processed Image").unwrap();
    let anonymized = html.find("Last Anonymized Image").unwrap();
    assert!(uploaded < processed && processed < anonymized);
    assert!(html[anonymized..].contains(NO_IMAGE));
}

#[tokio::test]
async fn test_home_page_uses_configured_base_name() {
    let index = MockImageIndex::new().with_row("images_anonymized", "anon.jpg", 1);
    let router = build_router(index.clone(), MockObjectSource::new(), "liquor-images");

    let html = get(&router, "/").await.text();
    assert!(html.contains("/download_image/liquor-images-anonymized/anon.jpg"));

    let mut tables = index.queried_tables().await;
    tables.sort();
    assert_eq!(
        tables,
        vec!["images_anonymized", "images_processed", "images_uploaded"]
    );
}

#[tokio::test]
async fn test_home_page_degrades_failing_slot() {
    let index = seeded_index().with_failing_table("images_processed");
    let router = build_router(index, MockObjectSource::new(), "images");

    let response = get(&router, "/").await;
    assert_eq!(response.status, StatusCode::OK);

    let html = response.text();
    assert!(html.contains("/download_image/images/up-new.jpg"));
    assert!(!html.contains("proc.jpg"));

    let processed = html.find("Last Processed Image").unwrap();
    let anonymized = html.find("Last Anonymized Image").unwrap();
    assert!(html[processed..anonymized].contains(NO_IMAGE));
}

#[tokio::test]
async fn test_home_page_all_slots_failing() {
    let index = MockImageIndex::new()
        .with_failing_table("images_uploaded")
        .with_failing_table("images_processed")
        .with_failing_table("images_anonymized");
    let router = build_router(index, MockObjectSource::new(), "images");

    let response = get(&router, "/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text().matches(NO_IMAGE).count(), 3);
}

// =============================================================================
// Cross-request Properties
// =============================================================================

#[tokio::test]
async fn test_buckets_do_not_interfere() {
    let index = MockImageIndex::new()
        .with_row("images_uploaded", "only-uploaded.jpg", 1)
        .with_row("images_anonymized", "only-anon.jpg", 1);
    let router = build_router(index, MockObjectSource::new(), "images");

    let (uploaded, processed, anonymized) = tokio::join!(
        get(&router, "/last_image_small/images"),
        get(&router, "/last_image_small/images-processed"),
        get(&router, "/last_image_big/images-anonymized"),
    );

    assert!(uploaded.text().contains("only-uploaded.jpg"));
    assert!(!uploaded.text().contains("only-anon.jpg"));
    assert!(processed.text().contains(NO_IMAGE));
    assert!(anonymized.text().contains("only-anon.jpg"));
    assert!(!anonymized.text().contains("only-uploaded.jpg"));
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let router = build_router(seeded_index(), MockObjectSource::new(), "images");

    for uri in ["/", "/last_image_small/images", "/last_image_big/images-anonymized"] {
        let first = get(&router, uri).await;
        let second = get(&router, uri).await;
        assert_eq!(first.status, second.status);
        assert_eq!(first.body, second.body);
    }
}

#[tokio::test]
async fn test_new_row_is_picked_up() {
    let index = seeded_index();
    let router = build_router(index.clone(), MockObjectSource::new(), "images");

    assert!(get(&router, "/last_image_small/images-anonymized")
        .await
        .text()
        .contains(NO_IMAGE));

    index.insert("images_anonymized", "fresh.jpg", 5).await;

    assert!(get(&router, "/last_image_small/images-anonymized")
        .await
        .text()
        .contains("fresh.jpg"));
}

// =============================================================================
// CORS and Health
// =============================================================================

#[tokio::test]
async fn test_cors_any_origin() {
    let router = build_router(seeded_index(), MockObjectSource::new(), "images");

    let request = Request::builder()
        .uri("/last_image_small/images")
        .header("origin", "https://dashboard.example.com")
        .body(Body::empty())
        .unwrap();

    let response = send(&router, request).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers.get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_health() {
    let router = build_router(MockImageIndex::new(), MockObjectSource::new(), "images");

    let response = get(&router, "/health").await;
    assert_eq!(response.status, StatusCode::OK);

    let json = response.json();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let router = build_router(MockImageIndex::new(), MockObjectSource::new(), "images");
    let response = get(&router, "/last_image_medium/images").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
