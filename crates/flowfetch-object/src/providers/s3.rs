//! S3-compatible stores using [`object_store::aws::AmazonS3Builder`].
//!
//! Works with AWS S3, MinIO, and any S3-compatible service.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use flowfetch_core::{Error, Result};
use object_store::ClientOptions;
use object_store::aws::AmazonS3Builder;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use tokio::sync::RwLock;

use super::{BucketStores, FileCredentials};
use crate::TRACING_TARGET;
use crate::client::ObjectStoreClient;

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client library used to talk to S3.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display,
)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum S3Backend {
    /// AWS SDK; reports every response header, including expiration.
    #[default]
    Sdk,
    /// `object_store`; no MD5 or expiration metadata.
    ObjectStore,
}

/// Connection settings shared by every bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(rename_all = "camelCase")]
pub struct S3Config {
    /// AWS region of the buckets.
    #[cfg_attr(
        feature = "config",
        arg(long = "region", env = "AWS_REGION", default_value = DEFAULT_REGION)
    )]
    #[serde(default = "default_region")]
    pub region: String,

    /// Endpoint URL (e.g. `http://localhost:9000` for MinIO).
    /// Required for non-AWS S3-compatible services.
    #[cfg_attr(feature = "config", arg(long = "endpoint", env = "AWS_ENDPOINT_URL"))]
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Access key ID for static credentials.
    #[cfg_attr(feature = "config", arg(long = "access-key", env = "AWS_ACCESS_KEY_ID"))]
    #[serde(default)]
    pub access_key: Option<String>,

    /// Secret access key for static credentials.
    #[cfg_attr(
        feature = "config",
        arg(long = "secret-key", env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)
    )]
    #[serde(default, skip_serializing)]
    pub secret_key: Option<String>,

    /// Session token for temporary credentials.
    #[cfg_attr(
        feature = "config",
        arg(long = "session-token", env = "AWS_SESSION_TOKEN", hide_env_values = true)
    )]
    #[serde(default, skip_serializing)]
    pub session_token: Option<String>,

    /// Properties file holding `accessKey` and `secretKey`.
    ///
    /// Ignored when both keys are given directly.
    #[cfg_attr(
        feature = "config",
        arg(long = "credentials-file", env = "AWS_CREDENTIALS_FILE")
    )]
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,

    /// Request timeout in seconds, enforced by the HTTP client.
    #[cfg_attr(
        feature = "config",
        arg(long = "timeout-secs", env = "S3_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)
    )]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Client library used for requests.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "s3-backend",
            env = "S3_BACKEND",
            value_enum,
            default_value_t = S3Backend::Sdk
        )
    )]
    #[serde(default)]
    pub backend: S3Backend,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint: None,
            access_key: None,
            secret_key: None,
            session_token: None,
            credentials_file: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            backend: S3Backend::default(),
        }
    }
}

impl S3Config {
    /// Sets the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets static credentials.
    pub fn with_keys(mut self, access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(Error::configuration().with_message("region must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::configuration().with_message("timeout must be at least one second"));
        }
        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(Error::configuration()
                .with_message("access key and secret key must be given together"));
        }
        Ok(())
    }

    /// Static key pair to sign with, if any.
    ///
    /// Keys given directly take precedence over the credentials file.
    pub(crate) fn resolve_keys(&self) -> Result<Option<FileCredentials>> {
        if let (Some(access_key), Some(secret_key)) = (&self.access_key, &self.secret_key) {
            return Ok(Some(FileCredentials {
                access_key: access_key.clone(),
                secret_key: secret_key.clone(),
            }));
        }
        self.credentials_file
            .as_deref()
            .map(FileCredentials::load)
            .transpose()
    }
}

/// Builds and caches one S3 store per bucket.
#[derive(Debug)]
pub struct S3Stores {
    config: S3Config,
    keys: Option<FileCredentials>,
    stores: RwLock<HashMap<String, ObjectStoreClient>>,
}

impl S3Stores {
    /// Validate `config` and resolve its credentials.
    pub fn new(config: S3Config) -> Result<Self> {
        config.validate()?;
        let keys = config.resolve_keys()?;

        tracing::info!(
            target: TRACING_TARGET,
            region = %config.region,
            endpoint = ?config.endpoint,
            static_credentials = keys.is_some(),
            timeout_secs = config.timeout_secs,
            "S3 stores initialized"
        );

        Ok(Self {
            config,
            keys,
            stores: RwLock::new(HashMap::new()),
        })
    }

    fn connect(&self, bucket: &str) -> Result<ObjectStoreClient> {
        let options = ClientOptions::new().with_timeout(self.config.timeout());
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(&self.config.region)
            .with_client_options(options);

        if let Some(endpoint) = &self.config.endpoint {
            builder = builder.with_endpoint(endpoint);
            if endpoint.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }
        }

        if let Some(keys) = &self.keys {
            builder = builder
                .with_access_key_id(&keys.access_key)
                .with_secret_access_key(&keys.secret_key);
        }

        if let Some(token) = &self.config.session_token {
            builder = builder.with_token(token);
        }

        let store = builder.build().map_err(|err| {
            Error::configuration()
                .with_message(format!("cannot build S3 store for bucket {bucket}: {err}"))
                .with_source(err)
        })?;

        tracing::debug!(target: TRACING_TARGET, bucket, "S3 store created");
        Ok(ObjectStoreClient::new(store))
    }
}

#[async_trait::async_trait]
impl BucketStores for S3Stores {
    async fn store(&self, bucket: &str) -> Result<ObjectStoreClient> {
        if let Some(client) = self.stores.read().await.get(bucket) {
            return Ok(client.clone());
        }

        let mut stores = self.stores.write().await;
        if let Some(client) = stores.get(bucket) {
            return Ok(client.clone());
        }
        let client = self.connect(bucket)?;
        stores.insert(bucket.to_owned(), client.clone());
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use flowfetch_core::ErrorKind;

    use super::*;

    fn local_config() -> S3Config {
        S3Config::default()
            .with_endpoint("http://localhost:9000")
            .with_keys("minioadmin", "minioadmin")
    }

    #[test]
    fn defaults() {
        let config = S3Config::default();
        assert_eq!(config.region, DEFAULT_REGION);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.backend, S3Backend::Sdk);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn backend_names() {
        assert_eq!(S3Backend::ObjectStore.as_ref(), "object-store");
        let config: S3Config = serde_json::from_str(r#"{"backend": "object-store"}"#).unwrap();
        assert_eq!(config.backend, S3Backend::ObjectStore);
    }

    #[test]
    fn half_a_key_pair_is_rejected() {
        let config = S3Config {
            access_key: Some("AKIA".into()),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = S3Config {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_keys_win_over_file() {
        let config = S3Config {
            credentials_file: Some(PathBuf::from("/nonexistent/creds")),
            ..local_config()
        };
        let keys = config.resolve_keys().unwrap().unwrap();
        assert_eq!(keys.access_key, "minioadmin");
    }

    #[test]
    fn missing_credentials_file_fails_setup() {
        let config = S3Config {
            credentials_file: Some(PathBuf::from("/nonexistent/creds")),
            ..Default::default()
        };
        assert!(S3Stores::new(config).is_err());
    }

    #[test]
    fn secrets_are_not_serialized() {
        let json = serde_json::to_string(&local_config()).unwrap();
        assert!(json.contains("accessKey"));
        assert!(!json.contains("secretKey"));
    }

    #[tokio::test]
    async fn stores_are_cached_per_bucket() {
        let stores = S3Stores::new(local_config()).unwrap();

        let first = stores.store("alpha").await.unwrap();
        let again = stores.store("alpha").await.unwrap();
        let other = stores.store("beta").await.unwrap();

        assert!(Arc::ptr_eq(&first.0, &again.0));
        assert!(!Arc::ptr_eq(&first.0, &other.0));
    }
}
