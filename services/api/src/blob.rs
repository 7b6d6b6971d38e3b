//! S3-backed photo storage

use anyhow::Result;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{Client, primitives::ByteStream};
use booking::{StoreError, StoreResult, store::BlobStore};
use std::env;
use tracing::info;

/// Blob storage configuration
#[derive(Debug, Clone)]
pub struct BlobConfig {
    /// Bucket that receives uploaded photos
    pub bucket_name: String,
    /// Base URL objects are served from; the object key is appended
    pub public_base_url: String,
}

impl BlobConfig {
    /// Create a new BlobConfig from environment variables
    ///
    /// # Environment Variables
    /// - `BLOB_BUCKET_NAME`: Bucket name (default: "beolcho-photos")
    /// - `BLOB_PUBLIC_BASE_URL`: Public URL prefix (default: the bucket's S3 URL)
    pub fn from_env() -> Self {
        let bucket_name =
            env::var("BLOB_BUCKET_NAME").unwrap_or_else(|_| "beolcho-photos".to_string());
        let public_base_url = env::var("BLOB_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("https://{}.s3.amazonaws.com", bucket_name));

        Self {
            bucket_name,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }
}

pub struct S3BlobStore {
    client: Client,
    config: BlobConfig,
}

impl S3BlobStore {
    /// Build a client from the ambient AWS configuration
    pub async fn from_env(config: BlobConfig) -> Result<Self> {
        let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        info!("S3 blob store using bucket: {}", config.bucket_name);
        Ok(Self {
            client: Client::new(&aws_config),
            config,
        })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, path: &str, data: Vec<u8>, content_type: &str) -> StoreResult<String> {
        self.client
            .put_object()
            .bucket(&self.config.bucket_name)
            .key(path)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StoreError::Blob(format!("put {}: {}", path, e)))?;

        Ok(self.config.public_url(path))
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket_name)
            .key(path)
            .send()
            .await
            .map_err(|e| StoreError::Blob(format!("delete {}: {}", path, e)))?;
        Ok(())
    }
}
