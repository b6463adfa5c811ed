//! Configuration management for the image gateway.
//!
//! Every option can be given as a command-line flag or an environment
//! variable, and every option has a default.
//!
//! # Environment Variables
//!
//! Metadata store:
//! - `DATABASE_USER`, `DATABASE_PASSWORD`, `DATABASE_HOST`, `DATABASE_DB` -
//!   MySQL credentials and location
//! - `DATABASE_URL` - Full connection URL, overrides the four values above
//! - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 5)
//!
//! Object store:
//! - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` - Static credentials
//!   (optional, the default AWS provider chain is used when absent)
//! - `S3_URL_ENDPOINT` - Endpoint URL; `https` enables TLS (default: http://ceph-nano-0/)
//! - `S3_REGION` - Region (default: us-east-1)
//!
//! Gateway:
//! - `BUCKET_BASE_NAME` - Base of the three bucket names (default: liquor-images)
//! - `STORE_TIMEOUT_SECS` - Bound on each store call (default: 10)
//! - `GATEWAY_HOST` - Server bind address (default: 0.0.0.0)
//! - `GATEWAY_PORT` - Server port (default: 5000)
//! - `GATEWAY_PAGE_TITLE` - Home page heading
//! - `GATEWAY_CORS_ORIGINS` - Allowed CORS origins, comma separated (default: any)

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::catalog::{check_database_url, BucketCatalog, DEFAULT_MAX_CONNECTIONS};
use crate::io::StaticCredentials;
use crate::server::DEFAULT_PAGE_TITLE;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 5000;

pub const DEFAULT_DATABASE_USER: &str = "liquorlab";
pub const DEFAULT_DATABASE_PASSWORD: &str = "liquorlab";
pub const DEFAULT_DATABASE_HOST: &str = "liquorlabdb";
pub const DEFAULT_DATABASE_DB: &str = "liquorlabdb";

/// Default object store endpoint.
pub const DEFAULT_S3_ENDPOINT: &str = "http://ceph-nano-0/";

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default bucket base name.
pub const DEFAULT_BUCKET_BASE_NAME: &str = "liquor-images";

/// Default store timeout in seconds.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Latest Image Gateway - serves the newest image of each bucket.
///
/// Runs the HTTP server when no subcommand is given.
#[derive(Parser, Debug)]
#[command(name = "latest-image-gateway")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub serve: ServeConfig,
}

impl Cli {
    /// Resolve the command to run, defaulting to `serve`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeConfig),

    /// Verify connectivity to the metadata and object stores
    Check(CheckConfig),
}

/// Settings shared by every command that talks to the stores.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    // =========================================================================
    // Metadata Store
    // =========================================================================
    /// Database user.
    #[arg(long, default_value = DEFAULT_DATABASE_USER, env = "DATABASE_USER")]
    pub database_user: String,

    /// Database password.
    #[arg(long, default_value = DEFAULT_DATABASE_PASSWORD, env = "DATABASE_PASSWORD", hide_env_values = true)]
    pub database_password: String,

    /// Database host (optionally host:port).
    #[arg(long, default_value = DEFAULT_DATABASE_HOST, env = "DATABASE_HOST")]
    pub database_host: String,

    /// Database name.
    #[arg(long, default_value = DEFAULT_DATABASE_DB, env = "DATABASE_DB")]
    pub database_db: String,

    /// Full database URL (e.g. mysql://u:p@host/db), overrides the separate fields.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Maximum number of pooled database connections.
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS, env = "DATABASE_MAX_CONNECTIONS")]
    pub database_max_connections: u32,

    // =========================================================================
    // Object Store
    // =========================================================================
    /// Access key for the object store.
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub aws_access_key_id: Option<String>,

    /// Secret key for the object store.
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub aws_secret_access_key: Option<String>,

    /// Object store endpoint URL. An https scheme enables TLS.
    #[arg(long, default_value = DEFAULT_S3_ENDPOINT, env = "S3_URL_ENDPOINT")]
    pub s3_endpoint: String,

    /// Region for the object store.
    #[arg(long, default_value = DEFAULT_REGION, env = "S3_REGION")]
    pub s3_region: String,

    // =========================================================================
    // Buckets
    // =========================================================================
    /// Base bucket name; "-processed" and "-anonymized" are derived from it.
    #[arg(long, default_value = DEFAULT_BUCKET_BASE_NAME, env = "BUCKET_BASE_NAME")]
    pub bucket_base_name: String,

    /// Timeout in seconds for each metadata or object store call.
    #[arg(long, default_value_t = DEFAULT_STORE_TIMEOUT_SECS, env = "STORE_TIMEOUT_SECS")]
    pub store_timeout_secs: u64,
}

impl StoreArgs {
    /// Validate the store settings and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        let endpoint = Url::parse(&self.s3_endpoint)
            .map_err(|e| format!("Invalid S3 endpoint '{}': {}", self.s3_endpoint, e))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(format!(
                "S3 endpoint must use http or https, got '{}'",
                endpoint.scheme()
            ));
        }

        if self.aws_access_key_id.is_some() != self.aws_secret_access_key.is_some() {
            return Err(
                "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together".to_string(),
            );
        }

        if self.bucket_base_name.is_empty() {
            return Err(
                "Bucket base name is required. Set --bucket-base-name or BUCKET_BASE_NAME"
                    .to_string(),
            );
        }

        if self.store_timeout_secs == 0 {
            return Err("store_timeout_secs must be greater than 0".to_string());
        }

        if self.database_max_connections == 0 {
            return Err("database_max_connections must be greater than 0".to_string());
        }

        if let Some(ref url) = self.database_url {
            check_database_url(url).map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    /// Connection URL for the metadata store.
    pub fn database_url(&self) -> String {
        match self.database_url {
            Some(ref url) => url.clone(),
            None => format!(
                "mysql://{}:{}@{}/{}",
                urlencoding::encode(&self.database_user),
                urlencoding::encode(&self.database_password),
                self.database_host,
                self.database_db
            ),
        }
    }

    /// Database location with credentials removed, safe to log.
    pub fn database_display(&self) -> String {
        match self.database_url {
            Some(ref url) => match Url::parse(url) {
                Ok(mut parsed) => {
                    let _ = parsed.set_password(None);
                    parsed.to_string()
                }
                Err(_) => "<invalid url>".to_string(),
            },
            None => format!(
                "mysql://{}@{}/{}",
                self.database_user, self.database_host, self.database_db
            ),
        }
    }

    /// Static credentials, if both keys were provided.
    pub fn credentials(&self) -> Option<StaticCredentials> {
        match (&self.aws_access_key_id, &self.aws_secret_access_key) {
            (Some(id), Some(secret)) => Some(StaticCredentials {
                access_key_id: id.clone(),
                secret_access_key: secret.clone(),
            }),
            _ => None,
        }
    }

    /// Bound applied to each store call.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Catalog of the three configured buckets.
    pub fn catalog(&self) -> BucketCatalog {
        BucketCatalog::new(self.bucket_base_name.clone())
    }
}

/// Configuration for the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "GATEWAY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "GATEWAY_PORT")]
    pub port: u16,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Heading of the home page.
    #[arg(long, default_value = DEFAULT_PAGE_TITLE, env = "GATEWAY_PAGE_TITLE")]
    pub page_title: String,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "GATEWAY_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.store.validate()
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration for the `check` command.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
