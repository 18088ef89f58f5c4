use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use crate::{public_url, validate_path, ObjectStore, StorageError, StoredObject};

/// HTTP status S3 answers with when `If-None-Match: *` finds an existing key.
const PRECONDITION_FAILED: u16 = 412;

/// [`ObjectStore`] backed by an S3 bucket whose objects are readable at
/// `public_base_url`.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3Store {
    pub fn new(
        client: aws_sdk_s3::Client,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// Build a client from the standard AWS environment (region, credentials).
    pub async fn from_env(bucket: impl Into<String>, public_base_url: impl Into<String>) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&config), bucket, public_base_url)
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        path: &str,
        overwrite: bool,
    ) -> Result<StoredObject, StorageError> {
        validate_path(path)?;
        let size = bytes.len();

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(ByteStream::from(bytes));
        if !overwrite {
            request = request.if_none_match("*");
        }

        request.send().await.map_err(|err| {
            let status = err.raw_response().map(|r| r.status().as_u16());
            if status == Some(PRECONDITION_FAILED) {
                StorageError::AlreadyExists(path.to_string())
            } else {
                StorageError::S3(DisplayErrorContext(&err).to_string())
            }
        })?;

        tracing::debug!(bucket = %self.bucket, path, size, "Stored object in S3");
        Ok(StoredObject {
            path: path.to_string(),
            public_url: public_url(&self.public_base_url, path),
        })
    }
}
