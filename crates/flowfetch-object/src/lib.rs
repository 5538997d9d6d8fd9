#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

use std::sync::Arc;

use flowfetch_core::ObjectGetter;

pub mod client;
mod expiration;
mod getter;
/// Bucket stores (S3, in-memory) and credential loading.
pub mod providers;
mod sdk;

#[doc(hidden)]
pub mod prelude;

pub use client::{GetOutput, ObjectStoreClient};
pub use getter::ObjectStoreGetter;
pub use providers::{BucketStores, FileCredentials, MemoryStores, S3Backend, S3Config, S3Stores};
pub use sdk::SdkGetter;

/// Tracing target for object-store operations.
pub const TRACING_TARGET: &str = "flowfetch_object";

/// Creates the S3 [`ObjectGetter`] selected by `config.backend`.
///
/// # Errors
///
/// Returns a configuration error if `config` is invalid or its credentials
/// file cannot be read.
pub async fn s3_getter(config: S3Config) -> flowfetch_core::Result<Arc<dyn ObjectGetter>> {
    match config.backend {
        S3Backend::Sdk => Ok(Arc::new(SdkGetter::new(&config).await?)),
        S3Backend::ObjectStore => Ok(Arc::new(ObjectStoreGetter::new(S3Stores::new(config)?))),
    }
}
