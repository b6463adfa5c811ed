//! Access to the relational table recording image events.

use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use url::Url;

use crate::error::StoreError;

/// Default number of pooled database connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// URL schemes served by the compiled-in production driver.
pub const SUPPORTED_SCHEMES: &[&str] = &["mysql", "mariadb"];

/// Trait for looking up the most recently recorded image of a table.
///
/// This abstraction keeps the resolver independent of the database driver so
/// it can be exercised with in-memory doubles.
#[async_trait]
pub trait ImageIndex: Send + Sync {
    /// Return the `name` of the row with the greatest `time` in `table`,
    /// or `None` when the table has no rows.
    ///
    /// `table` always comes from the bucket catalog, never from a request.
    async fn latest_image(&self, table: &'static str) -> Result<Option<String>, StoreError>;
}

/// sqlx-backed implementation of `ImageIndex`.
///
/// Uses the `Any` driver so the same code runs against MySQL in production
/// and SQLite in tests.
#[derive(Clone)]
pub struct SqlImageIndex {
    pool: AnyPool,
}

impl SqlImageIndex {
    /// Wrap an existing pool.
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Create a pool that opens connections on first use.
    ///
    /// Fails only if the URL itself is malformed or names an unsupported
    /// driver; an unreachable database surfaces later as `StoreError::Connection`.
    pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        check_database_url(database_url)?;
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)
            .map_err(classify)?;

        Ok(Self { pool })
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Check that a connection can be acquired and a trivial query runs.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(classify)
    }
}

#[async_trait]
impl ImageIndex for SqlImageIndex {
    async fn latest_image(&self, table: &'static str) -> Result<Option<String>, StoreError> {
        let sql = latest_image_query(table);

        let name: Option<String> = sqlx::query_scalar(&sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;

        Ok(name.filter(|n| !n.is_empty()))
    }
}

/// Build the latest-image query for a catalog table.
pub fn latest_image_query(table: &str) -> String {
    format!("SELECT name FROM {} ORDER BY time DESC LIMIT 1", table)
}

/// Check that a database URL parses and names a supported driver.
pub fn check_database_url(database_url: &str) -> Result<(), StoreError> {
    let url = Url::parse(database_url)
        .map_err(|e| StoreError::Configuration(format!("invalid database URL: {}", e)))?;

    if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
        return Err(StoreError::Configuration(format!(
            "unsupported database scheme '{}', expected one of: {}",
            url.scheme(),
            SUPPORTED_SCHEMES.join(", ")
        )));
    }

    Ok(())
}

/// Split sqlx errors into connectivity and query failures.
fn classify(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Connection(err.to_string()),
        other => StoreError::Query(other.to_string()),
    }
}
