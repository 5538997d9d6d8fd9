//! Narrow interface to a remote object store.
//!
//! Operators depend on [`ObjectGetter`] only; concrete storage clients live
//! in their own crates and adapt their SDK types into [`RemoteObject`].

use std::collections::BTreeMap;
use std::fmt;

use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Inclusive byte range of an object.
///
/// A missing `end` reads through the last byte of the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    start: u64,
    end: Option<u64>,
}

impl ByteRange {
    /// The whole object, `bytes=0-`.
    pub const FULL: Self = Self {
        start: 0,
        end: None,
    };

    /// Creates a range, rejecting `end < start`.
    pub fn new(start: u64, end: Option<u64>) -> Result<Self> {
        match end {
            Some(end) if end < start => Err(Error::invalid_input()
                .with_message(format!("range end {end} is before range start {start}"))),
            _ => Ok(Self { start, end }),
        }
    }

    /// First byte to read.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last byte to read, if bounded.
    pub fn end(&self) -> Option<u64> {
        self.end
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "bytes={}-{}", self.start, end),
            None => write!(f, "bytes={}-", self.start),
        }
    }
}

/// An addressed GET for a single object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetObjectRequest {
    /// Bucket holding the object.
    pub bucket: String,
    /// Object key within the bucket.
    pub key: String,
    /// Specific object version to read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    /// Byte range restriction sent with the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<ByteRange>,
}

impl GetObjectRequest {
    /// Creates a request for the latest version of `bucket`/`key`.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            version_id: None,
            range: None,
        }
    }

    /// Address a specific version.
    pub fn with_version(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    /// Restrict the request to `range`.
    pub fn with_range(mut self, range: ByteRange) -> Self {
        self.range = Some(range);
        self
    }
}

/// Response metadata of a retrieved object. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub content_disposition: Option<String>,
    pub content_md5: Option<String>,
    pub content_type: Option<String>,
    pub e_tag: Option<String>,
    pub expiration_time: Option<Timestamp>,
    pub expiration_rule_id: Option<String>,
    /// User-defined metadata (`x-amz-meta-*` on S3).
    #[serde(default)]
    pub user_metadata: BTreeMap<String, String>,
    pub version_id: Option<String>,
}

/// A retrieved object: bucket name, metadata, and a content stream that
/// can be consumed once.
///
/// Dropping the value releases the underlying response, whether or not
/// the stream was drained.
pub struct RemoteObject {
    bucket: Option<String>,
    metadata: ObjectMetadata,
    content: BoxStream<'static, Result<Bytes>>,
}

impl RemoteObject {
    /// Wrap a streaming response body.
    pub fn new(
        bucket: Option<String>,
        metadata: ObjectMetadata,
        content: BoxStream<'static, Result<Bytes>>,
    ) -> Self {
        Self {
            bucket,
            metadata,
            content,
        }
    }

    /// Wrap a fully buffered response body.
    pub fn from_bytes(bucket: Option<String>, metadata: ObjectMetadata, data: Bytes) -> Self {
        Self::new(bucket, metadata, stream::once(async move { Ok::<_, Error>(data) }).boxed())
    }

    /// Bucket the object was read from, as reported by the service.
    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// Response metadata.
    pub fn metadata(&self) -> &ObjectMetadata {
        &self.metadata
    }

    /// Drain the content stream into a single buffer.
    ///
    /// Fails with the first stream error; the remaining body is discarded
    /// when `self` is dropped.
    pub async fn read_to_end(&mut self) -> Result<Bytes> {
        let content = std::mem::replace(&mut self.content, stream::empty().boxed());
        let buffer = content
            .try_fold(BytesMut::new(), |mut buffer, chunk| async move {
                buffer.extend_from_slice(&chunk);
                Ok(buffer)
            })
            .await?;
        Ok(buffer.freeze())
    }
}

impl fmt::Debug for RemoteObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteObject")
            .field("bucket", &self.bucket)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Single-object retrieval from a remote store.
#[async_trait::async_trait]
pub trait ObjectGetter: Send + Sync {
    /// Issue one GET for `request`.
    async fn get_object(&self, request: &GetObjectRequest) -> Result<RemoteObject>;
}
