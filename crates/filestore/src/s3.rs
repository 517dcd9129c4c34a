//! S3-compatible object storage
//!
//! Uses the `object_store` crate to build a client for AWS S3, MinIO, and
//! other S3-compatible services, wrapped in a [`RemoteStorage`].

use object_store::aws::AmazonS3Builder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::client::ObjectStoreClient;
use crate::error::StorageError;
use crate::remote::RemoteStorage;

/// S3 storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// S3 bucket name
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// S3 region (e.g., "us-east-1")
    #[serde(default = "default_region")]
    pub region: String,
    /// S3 endpoint URL (for MinIO or other S3-compatible services)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// AWS access key ID
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// AWS secret access key
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Allow HTTP (not HTTPS) connections
    #[serde(default)]
    pub allow_http: bool,
    /// Directory for upload staging files (defaults to the system temp dir)
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            region: default_region(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            allow_http: false,
            scratch_dir: None,
        }
    }
}

fn default_bucket() -> String {
    "filestore".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl RemoteStorage {
    /// Create a remote backend for an S3 bucket
    pub fn s3(config: S3Config) -> Result<Self, StorageError> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region);

        // Set endpoint for MinIO or other S3-compatible services
        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }

        if let Some(access_key) = &config.access_key_id {
            builder = builder.with_access_key_id(access_key);
        }
        if let Some(secret_key) = &config.secret_access_key {
            builder = builder.with_secret_access_key(secret_key);
        }

        // Allow HTTP for local development (MinIO)
        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder.build().map_err(|e| {
            StorageError::Configuration(format!("Failed to create S3 client: {}", e))
        })?;

        info!(
            "Initialized S3 client: bucket={}, region={}, endpoint={:?}",
            config.bucket, config.region, config.endpoint
        );

        let client = ObjectStoreClient::new().with_bucket(config.bucket.clone(), Arc::new(store));
        let storage = RemoteStorage::new(Arc::new(client), config.bucket);

        Ok(match config.scratch_dir {
            Some(dir) => storage.with_scratch_dir(dir),
            None => storage,
        })
    }
}
