//! Object storage for rendered PDFs.
//!
//! Keys are derived from the remote document id, so re-uploading for the same document
//! overwrites instead of duplicating.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload of '{key}' failed: {message}")]
    Upload { key: String, message: String },
}

pub fn storage_key(document_id: &str) -> String {
    format!("documents/esign/{document_id}.pdf")
}

/// Accepts a blob under a key and returns the public URL it is reachable at.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    async fn put_pdf(&self, key: &str, bytes: Bytes) -> Result<String, StorageError>;
}

#[derive(Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String, public_base_url: &str) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[async_trait]
impl DocumentStorage for S3Storage {
    async fn put_pdf(&self, key: &str, bytes: Bytes) -> Result<String, StorageError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type("application/pdf")
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        info!("Uploaded {} bytes to s3://{}/{}", size, self.bucket, key);
        Ok(self.public_url(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_is_deterministic() {
        assert_eq!(storage_key("doc-77"), "documents/esign/doc-77.pdf");
        assert_eq!(storage_key("doc-77"), storage_key("doc-77"));
    }

    #[test]
    fn test_public_url_joins_base_and_key() {
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .build();
        let storage = S3Storage::new(
            S3Client::from_conf(conf),
            "docs".to_string(),
            "https://cdn.example.com/docs/",
        );
        assert_eq!(
            storage.public_url(&storage_key("doc-1")),
            "https://cdn.example.com/docs/documents/esign/doc-1.pdf"
        );
    }
}
