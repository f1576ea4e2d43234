//! S3 bucket store backed by the AWS SDK.
//!
//! # Design
//! - Credentials and region come from the default AWS provider chain.
//! - SDK-level retries are disabled; the archive task's backoff policy owns retries.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

use scanvault_core::{ArchiveKey, ObjectStore, RemoteError};

const OP_PUT: &str = "upload";

/// Object store writing into one S3 bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Connect using the default AWS configuration, bounding each call by `timeout`.
    pub async fn connect(bucket: &str, timeout: Duration) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_attempt_timeout(timeout)
                    .build(),
            )
            .load()
            .await;
        Self::new(Client::new(&shared), bucket)
    }

    /// Wrap an already configured client.
    #[must_use]
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Target bucket.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &ArchiveKey,
        body: Vec<u8>,
        content_type: &'static str,
    ) -> Result<(), RemoteError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| put_error(&err))?;
        debug!(bucket = %self.bucket, key = %key, bytes = size, "report uploaded");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("s3://{}", self.bucket)
    }
}

fn put_error(err: &SdkError<PutObjectError>) -> RemoteError {
    let detail = DisplayErrorContext(err).to_string();
    match err {
        SdkError::TimeoutError(_) => RemoteError::Timeout {
            operation: OP_PUT,
            detail,
        },
        SdkError::ServiceError(service) => RemoteError::Status {
            operation: OP_PUT,
            status: service.raw().status().as_u16(),
        },
        SdkError::ConstructionFailure(_) => RemoteError::Payload {
            operation: OP_PUT,
            detail,
        },
        _ => RemoteError::Transport {
            operation: OP_PUT,
            detail,
        },
    }
}
