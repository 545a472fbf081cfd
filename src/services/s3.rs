//! S3 uploader.

use crate::error::UploadError;
use crate::models::config::{NetworkConfig, S3Config};
use crate::Result;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::StorageClass;
use aws_sdk_s3::Client;
use std::path::Path;

const DEFAULT_REGION: &str = "eu-west-3";

/// Error codes S3 answers with when it refuses the credentials.
const AUTH_ERROR_CODES: &[&str] = &[
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "AccessDenied",
    "ExpiredToken",
    "InvalidToken",
];

/// S3 uploader.
pub struct S3Uploader {
    client: Client,
    bucket: String,
    key_prefix: Option<String>,
}

/// Object key for a file name under an optional prefix.
pub fn object_key(prefix: Option<&str>, filename: &str) -> String {
    match prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}/{}", prefix, filename),
        None => filename.to_string(),
    }
}

/// Map an S3 error code to an upload error.
pub fn classify_service_error(code: Option<&str>, message: String) -> UploadError {
    match code {
        Some(code) if AUTH_ERROR_CODES.contains(&code) => UploadError::AuthRejected(message),
        Some("InvalidStorageClass") => UploadError::InvalidStorageClass(message),
        _ => UploadError::Other(message),
    }
}

impl S3Uploader {
    /// Build an uploader from explicit credentials.
    pub fn new(config: &S3Config, network: &NetworkConfig) -> Result<Self> {
        let bucket = config
            .bucket
            .clone()
            .ok_or_else(|| crate::Error::Config("S3 bucket not configured. Set S3_BUCKET".to_string()))?;
        let (key_id, secret) = match (&config.access_key_id, &config.secret_access_key) {
            (Some(k), Some(s)) => (k.clone(), s.clone()),
            _ => return Err(UploadError::MissingCredentials.into()),
        };
        let region = config
            .region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let credentials = Credentials::new(key_id, secret, None, None, "timeframe-archivist");
        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::standard().with_max_attempts(network.retries + 1))
            .timeout_config(
                TimeoutConfig::builder()
                    .connect_timeout(network.timeout())
                    .operation_attempt_timeout(network.upload_timeout())
                    .build(),
            );
        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket,
            key_prefix: config.key_prefix.clone(),
        })
    }

    /// Upload a local file under `filename` with the given storage class.
    ///
    /// Returns the object key.
    pub async fn upload_file(
        &self,
        local_path: &Path,
        filename: &str,
        storage_class: &str,
    ) -> std::result::Result<String, UploadError> {
        if !local_path.is_file() {
            return Err(UploadError::FileNotFound(local_path.to_path_buf()));
        }
        let key = object_key(self.key_prefix.as_deref(), filename);
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| UploadError::Other(format!("cannot read {}: {}", local_path.display(), e)))?;

        let start = std::time::Instant::now();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .storage_class(StorageClass::from(storage_class))
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    key = %key,
                    "S3 upload failed"
                );
                match e {
                    SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
                        UploadError::EndpointUnreachable(DisplayErrorContext(&e).to_string())
                    }
                    _ => {
                        let code = e.code().map(str::to_string);
                        classify_service_error(code.as_deref(), DisplayErrorContext(&e).to_string())
                    }
                }
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            storage_class = %storage_class,
            duration_ms = start.elapsed().as_millis() as u64,
            "S3 upload successful"
        );
        Ok(key)
    }
}
