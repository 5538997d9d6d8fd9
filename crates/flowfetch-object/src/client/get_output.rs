//! Result type for [`ObjectStoreClient::get_opts`](super::ObjectStoreClient::get_opts).

use std::fmt;
use std::ops::Range;

use bytes::Bytes;
use flowfetch_core::Error;
use futures::stream::BoxStream;
use object_store::{Attributes, ObjectMeta};

/// Result of a successful [`ObjectStoreClient::get_opts`](super::ObjectStoreClient::get_opts) call.
///
/// The body has not been read yet; dropping the value aborts the transfer.
pub struct GetOutput {
    /// Object metadata (size, etag, version, location).
    pub meta: ObjectMeta,
    /// Response attributes (content-disposition, content-type, user metadata).
    pub attributes: Attributes,
    /// Byte range of the object covered by `content`.
    pub range: Range<u64>,
    /// Streaming response body.
    pub content: BoxStream<'static, Result<Bytes, Error>>,
}

impl fmt::Debug for GetOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetOutput")
            .field("meta", &self.meta)
            .field("attributes", &self.attributes)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}
