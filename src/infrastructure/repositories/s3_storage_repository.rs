use super::storage_repository::StorageRepository;
use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use std::sync::Arc;

/// AWS S3 implementation of the storage repository
pub struct S3StorageRepository {
    s3_client: Arc<S3Client>,
    region: String,
}

impl S3StorageRepository {
    pub fn new(s3_client: Arc<S3Client>, region: String) -> Self {
        Self { s3_client, region }
    }
}

#[async_trait]
impl StorageRepository for S3StorageRepository {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), String> {
        let size = bytes.len();

        self.s3_client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    bucket = bucket,
                    key = key,
                    "S3 put_object failed"
                );
                format!("S3 upload error: {:?}", e)
            })?;

        tracing::debug!(bucket = bucket, key = key, size_bytes = size, "Object uploaded");
        Ok(())
    }

    async fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String> {
        let result = self
            .s3_client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    bucket = bucket,
                    key = key,
                    "S3 get_object failed"
                );
                format!("S3 download error: {:?}", e)
            })?;

        let body = result
            .body
            .collect()
            .await
            .map_err(|e| format!("Failed to read object body: {}", e))?;

        Ok(body.into_bytes().to_vec())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), String> {
        self.s3_client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    bucket = bucket,
                    key = key,
                    "S3 delete_object failed"
                );
                format!("S3 delete error: {:?}", e)
            })?;

        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            bucket, self.region, encoded_key
        )
    }
}
