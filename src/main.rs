//! Latest Image Gateway binary.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use latest_image_gateway::{
    config::{CheckConfig, Cli, Command, ServeConfig, StoreArgs},
    create_router, create_s3_client,
    io::{ImageFetcher, S3ObjectSource},
    server::{AppState, PresentationRenderer, RouterConfig},
    BucketCatalog, LatestImageResolver, SqlImageIndex,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Check(config) => run_check(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let store = &config.store;
    let catalog = store.catalog();

    log_store_config(store, &catalog);

    let index = match SqlImageIndex::connect_lazy(&store.database_url(), store.database_max_connections)
    {
        Ok(index) => index,
        Err(e) => {
            error!("Invalid database configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // The pool connects lazily; an unreachable database only degrades requests
    match tokio::time::timeout(store.store_timeout(), index.ping()).await {
        Ok(Ok(())) => info!("Metadata store reachable"),
        Ok(Err(e)) if e.is_fatal() => {
            error!("Metadata store rejected the connection check: {}", e);
            return ExitCode::FAILURE;
        }
        Ok(Err(e)) => warn!("Metadata store not reachable yet: {}", e),
        Err(_) => warn!("Metadata store did not answer within {}s", store.store_timeout_secs),
    }

    let s3_client =
        create_s3_client(&store.s3_endpoint, &store.s3_region, store.credentials()).await;

    let resolver = LatestImageResolver::with_timeout(catalog, index, store.store_timeout());
    let fetcher = ImageFetcher::with_timeout(S3ObjectSource::new(s3_client), store.store_timeout());
    let renderer = PresentationRenderer::new(config.page_title.clone());

    let state = AppState::with_renderer(resolver, fetcher, renderer);
    let router = create_router(state, build_router_config(&config));

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn log_store_config(store: &StoreArgs, catalog: &BucketCatalog) {
    info!("Configuration:");
    info!("  Database: {}", store.database_display());
    info!("  S3 endpoint: {}", store.s3_endpoint);
    info!("  S3 region: {}", store.s3_region);
    if store.credentials().is_some() {
        info!("  S3 credentials: static");
    } else {
        info!("  S3 credentials: default provider chain");
    }
    for bucket in catalog.bucket_names() {
        if let Ok(table) = catalog.table_for(bucket) {
            info!("  Bucket {} -> table {}", bucket, table);
        }
    }
    info!("  Store timeout: {}s", store.store_timeout_secs);
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "latest_image_gateway=debug,tower_http=debug"
    } else {
        "latest_image_gateway=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new();

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("Latest Image Gateway Configuration Check");
    println!("═════════════════════════════════════════");
    println!();

    let store = &config.store;
    if let Err(e) = store.validate() {
        println!("✗ Configuration: {}", e);
        return ExitCode::FAILURE;
    }
    println!("✓ Database: {}", store.database_display());
    println!("✓ Endpoint: {}", store.s3_endpoint);
    println!("✓ Region: {}", store.s3_region);
    println!();

    let catalog = store.catalog();
    let mut ok = true;

    // Metadata store
    let index = match SqlImageIndex::connect_lazy(&store.database_url(), store.database_max_connections)
    {
        Ok(index) => index,
        Err(e) => {
            println!("✗ Database URL: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let resolver = LatestImageResolver::with_timeout(catalog.clone(), index, store.store_timeout());
    println!("Latest images:");
    for bucket in catalog.bucket_names() {
        match resolver.resolve(bucket).await {
            Ok(Some(image)) => println!("  ✓ {}: {}", bucket, image),
            Ok(None) => println!("  ✓ {}: (no image recorded)", bucket),
            Err(e) => {
                println!("  ✗ {}: {}", bucket, e);
                ok = false;
            }
        }
    }
    println!();

    // Object store
    let s3_client =
        create_s3_client(&store.s3_endpoint, &store.s3_region, store.credentials()).await;

    println!("Buckets:");
    for bucket in catalog.bucket_names() {
        let head = tokio::time::timeout(
            store.store_timeout(),
            s3_client.head_bucket().bucket(bucket).send(),
        )
        .await;

        match head {
            Ok(Ok(_)) => println!("  ✓ {}", bucket),
            Ok(Err(e)) => {
                println!(
                    "  ✗ {}: {}",
                    bucket,
                    aws_sdk_s3::error::DisplayErrorContext(&e)
                );
                ok = false;
            }
            Err(_) => {
                println!("  ✗ {}: timed out", bucket);
                ok = false;
            }
        }
    }

    println!();
    println!("═════════════════════════════════════════");

    if ok {
        println!("✓ All checks passed!");
        ExitCode::SUCCESS
    } else {
        println!("✗ Some checks failed");
        println!();
        println!("Please check:");
        println!("  - The database is reachable and the image tables exist");
        println!("  - Your object store credentials are configured correctly");
        println!("  - The three buckets exist on the configured endpoint");
        ExitCode::FAILURE
    }
}
