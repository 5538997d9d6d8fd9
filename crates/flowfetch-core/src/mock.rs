//! Fake remote store for testing operators.
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! flowfetch-core = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Mutex, PoisonError};

use bytes::Bytes;
use futures::StreamExt;
use futures::stream;

use crate::remote::{GetObjectRequest, ObjectGetter, ObjectMetadata, RemoteObject};
use crate::{Error, ErrorKind, Result};

#[derive(Debug, Clone)]
enum Behavior {
    Serve {
        data: Bytes,
        metadata: ObjectMetadata,
    },
    Fail {
        kind: ErrorKind,
    },
    FailMidStream {
        prefix: Bytes,
        kind: ErrorKind,
    },
}

/// An [`ObjectGetter`] that records every request and answers from a
/// canned behavior.
#[derive(Debug)]
pub struct MockRemote {
    behavior: Behavior,
    requests: Mutex<Vec<GetObjectRequest>>,
}

impl MockRemote {
    /// Serve `data` for every request, honoring byte ranges.
    ///
    /// The reported bucket name is the requested bucket.
    pub fn serving(data: impl Into<Bytes>) -> Self {
        Self::with_behavior(Behavior::Serve {
            data: data.into(),
            metadata: ObjectMetadata::default(),
        })
    }

    /// Fail every request before any content is returned.
    pub fn failing(kind: ErrorKind) -> Self {
        Self::with_behavior(Behavior::Fail { kind })
    }

    /// Return `prefix` and then fail while the body is being read.
    pub fn failing_mid_stream(prefix: impl Into<Bytes>, kind: ErrorKind) -> Self {
        Self::with_behavior(Behavior::FailMidStream {
            prefix: prefix.into(),
            kind,
        })
    }

    /// Attach response metadata to served objects.
    pub fn with_metadata(mut self, metadata: ObjectMetadata) -> Self {
        if let Behavior::Serve { metadata: m, .. } = &mut self.behavior {
            *m = metadata;
        }
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<GetObjectRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far.
    pub fn calls(&self) -> usize {
        self.requests().len()
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ObjectGetter for MockRemote {
    async fn get_object(&self, request: &GetObjectRequest) -> Result<RemoteObject> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        match &self.behavior {
            Behavior::Serve { data, metadata } => {
                let data = match request.range {
                    Some(range) => slice(data, range.start(), range.end())?,
                    None => data.clone(),
                };
                Ok(RemoteObject::from_bytes(
                    Some(request.bucket.clone()),
                    metadata.clone(),
                    data,
                ))
            }
            Behavior::Fail { kind } => {
                Err(Error::new(*kind).with_message(format!("mock failure for {}", request.key)))
            }
            Behavior::FailMidStream { prefix, kind } => {
                let chunks = vec![
                    Ok(prefix.clone()),
                    Err(Error::new(*kind).with_message("mock stream interrupted")),
                ];
                Ok(RemoteObject::new(
                    Some(request.bucket.clone()),
                    ObjectMetadata::default(),
                    stream::iter(chunks).boxed(),
                ))
            }
        }
    }
}

fn slice(data: &Bytes, start: u64, end: Option<u64>) -> Result<Bytes> {
    let len = data.len() as u64;
    if start >= len {
        return Err(Error::invalid_input()
            .with_message(format!("range start {start} is beyond object size {len}")));
    }
    let end = end.map_or(len, |end| end.saturating_add(1).min(len));
    Ok(data.slice(start as usize..end as usize))
}
