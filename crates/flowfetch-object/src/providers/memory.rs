//! In-memory stores for tests and local runs.

use std::collections::HashMap;

use flowfetch_core::{Error, Result};
use object_store::memory::InMemory;

use super::BucketStores;
use crate::client::ObjectStoreClient;

/// A fixed set of named buckets, each backed by [`InMemory`].
#[derive(Debug, Default, Clone)]
pub struct MemoryStores {
    buckets: HashMap<String, ObjectStoreClient>,
}

impl MemoryStores {
    /// Creates a set with no buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty bucket named `name`.
    pub fn with_bucket(mut self, name: impl Into<String>) -> Self {
        self.buckets
            .insert(name.into(), ObjectStoreClient::new(InMemory::new()));
        self
    }

    /// Returns the client of bucket `name`, for seeding objects.
    pub fn bucket(&self, name: &str) -> Option<&ObjectStoreClient> {
        self.buckets.get(name)
    }
}

#[async_trait::async_trait]
impl BucketStores for MemoryStores {
    async fn store(&self, bucket: &str) -> Result<ObjectStoreClient> {
        self.buckets
            .get(bucket)
            .cloned()
            .ok_or_else(|| Error::not_found().with_message(format!("no such bucket: {bucket}")))
    }
}

#[cfg(test)]
mod tests {
    use flowfetch_core::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn unknown_bucket_is_not_found() {
        let stores = MemoryStores::new().with_bucket("known");
        assert!(stores.store("known").await.is_ok());

        let err = stores.store("unknown").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
