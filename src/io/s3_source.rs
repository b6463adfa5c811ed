use async_trait::async_trait;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::Client;

use super::object_source::{ObjectSource, StoredObject};
use crate::error::IoError;

/// S3-backed implementation of `ObjectSource`.
///
/// Reads objects from S3 or S3-compatible storage (Ceph, MinIO, etc.). The
/// bucket and key are passed through unchanged; key validation is left to the
/// store.
#[derive(Clone)]
pub struct S3ObjectSource {
    client: Client,
}

impl S3ObjectSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get the underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ObjectSource for S3ObjectSource {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject, IoError> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let location = format!("s3://{}/{}", bucket, key);

                let is_no_such_key = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);

                if is_no_such_key {
                    return IoError::NotFound(location);
                }

                // Some S3-compatible stores answer 404 without a NoSuchKey code
                let status_is_404 = e
                    .raw_response()
                    .map(|r| r.status().as_u16() == 404)
                    .unwrap_or(false);

                if status_is_404 {
                    return IoError::NotFound(location);
                }

                let message = format!("{}", DisplayErrorContext(&e));
                match e {
                    SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
                        IoError::Connection(message)
                    }
                    _ => IoError::S3(message),
                }
            })?;

        let content_type = resp.content_type().map(str::to_string);

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| IoError::Connection(e.to_string()))?
            .into_bytes();

        Ok(StoredObject { data, content_type })
    }
}

/// Static credentials for the object store.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Create an S3 client for a custom endpoint.
///
/// The endpoint scheme decides whether TLS is used. Path-style addressing is
/// forced since S3-compatible services rarely support virtual-hosted buckets.
/// Without explicit credentials the default AWS provider chain is used.
/// ```ignore
/// let client = create_s3_client("http://localhost:9000", "us-east-1", None).await;
/// ```
pub async fn create_s3_client(
    endpoint_url: &str,
    region: &str,
    credentials: Option<StaticCredentials>,
) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(region)
        .endpoint_url(endpoint_url);

    if let Some(creds) = credentials {
        config_loader = config_loader.credentials_provider(Credentials::new(
            creds.access_key_id,
            creds.secret_access_key,
            None,
            None,
            "gateway-config",
        ));
    }

    let sdk_config = config_loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(true)
        .build();

    Client::from_conf(s3_config)
}
