// src/storage/s3.rs

//! AWS S3 artifact storage.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{AppError, Result};
use crate::storage::ArtifactStore;

pub struct S3Store {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Build a client from the ambient AWS environment.
    pub async fn from_env(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), bucket, prefix)
    }

    fn key(&self, name: &str) -> String {
        let prefix = self.prefix.trim_end_matches('/');
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        }
    }
}

#[async_trait]
impl ArtifactStore for S3Store {
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let key = self.key(name);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes.to_vec()))
            .content_type("text/csv; charset=utf-8")
            .send()
            .await
            .map_err(AppError::upload)?;

        let locator = format!("s3://{}/{}", self.bucket, key);
        log::info!("Wrote {} bytes to {}", bytes.len(), locator);
        Ok(locator)
    }
}
