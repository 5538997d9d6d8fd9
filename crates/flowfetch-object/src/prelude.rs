//! Convenience re-exports.

pub use crate::client::{GetOutput, ObjectStoreClient};
pub use crate::getter::ObjectStoreGetter;
pub use crate::providers::{BucketStores, MemoryStores, S3Backend, S3Config, S3Stores};
pub use crate::s3_getter;
pub use crate::sdk::SdkGetter;
