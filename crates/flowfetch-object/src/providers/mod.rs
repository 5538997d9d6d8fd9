//! Bucket-to-store resolution and the stores it can hand out.

mod credentials;
mod memory;
mod s3;

use flowfetch_core::Result;
pub use credentials::FileCredentials;
pub use memory::MemoryStores;
pub use s3::{S3Backend, S3Config, S3Stores};

use crate::client::ObjectStoreClient;

/// Resolves a bucket name to a client scoped to that bucket.
///
/// `object_store` binds a store to one bucket at construction time, while
/// the bucket of a fetch is only known once its unit has been evaluated.
#[async_trait::async_trait]
pub trait BucketStores: Send + Sync {
    /// Returns a client for `bucket`.
    async fn store(&self, bucket: &str) -> Result<ObjectStoreClient>;
}
