use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use tracing::info;

use crate::common::{Result, TodoError};

/// Issues short-lived upload authorizations for object store keys.
#[async_trait]
pub trait UploadSigner: Send + Sync {
    async fn signed_upload_url(&self, key: &str, expires_in: Duration) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct S3UploadSigner {
    client: aws_sdk_s3::Client,
    bucket_name: String,
}

impl S3UploadSigner {
    pub fn new(client: aws_sdk_s3::Client, bucket_name: impl Into<String>) -> Self {
        Self {
            client,
            bucket_name: bucket_name.into(),
        }
    }
}

#[async_trait]
impl UploadSigner for S3UploadSigner {
    async fn signed_upload_url(&self, key: &str, expires_in: Duration) -> Result<String> {
        info!("Presigning upload for {}/{}", self.bucket_name, key);

        let presigning_config = PresigningConfig::expires_in(expires_in)
            .map_err(|err| TodoError::Unknown(format!("Invalid presigning config: {err}")))?;
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|err| TodoError::Unknown(format!("Failed to presign upload: {err}")))?;

        Ok(presigned.uri().to_string())
    }
}
