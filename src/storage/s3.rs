//! AWS S3 storage implementation.
//!
//! Objects are written to `{bucket}/{prefix}/{key}` and addressed through
//! the configured public base URL, or the bucket's virtual-hosted URL.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::StorageConfig;
use crate::storage::{ObjectStore, public_url};

/// S3-based object storage.
pub struct S3Storage {
    client: Client,
    bucket: String,
    prefix: String,
    base_url: String,
}

impl S3Storage {
    /// Create a new S3 storage instance.
    pub fn new(
        client: Client,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
            base_url: base_url.into(),
        }
    }

    /// Create S3 storage from the storage config and the AWS environment.
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        if config.bucket.trim().is_empty() {
            return Err(AppError::config("storage.bucket is required for s3"));
        }

        let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let region = aws
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "us-east-1".to_string());
        let client = Client::new(&aws);

        let base_url = config
            .public_base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.s3.{}.amazonaws.com", config.bucket, region));

        Ok(Self::new(client, &config.bucket, &config.prefix, base_url))
    }

    /// Full object key including the configured prefix.
    fn object_key(&self, key: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", prefix, key)
        }
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let object_key = self.object_key(key);
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::storage(&object_key, e.into_service_error()))?;

        info!("Wrote {} bytes to s3://{}/{}", size, self.bucket, object_key);
        Ok(public_url(&self.base_url, &object_key))
    }
}
