//! Object-store client backed by [`object_store::ObjectStore`].
//!
//! [`ObjectStoreClient`] is a thin, cloneable wrapper around
//! `Arc<dyn ObjectStore>` scoped to a single bucket. Every public method is
//! instrumented with [`tracing`] for observability.

use std::sync::Arc;

use bytes::Bytes;
use flowfetch_core::Error;
use futures::{StreamExt, TryStreamExt};
use object_store::path::Path;
use object_store::{
    Attributes, GetOptions, ObjectStore, PutMode, PutOptions, PutPayload, PutResult,
};

mod get_output;

pub use get_output::GetOutput;

/// Cloneable handle to any [`ObjectStore`] backend (S3, in-memory, ...).
///
/// All methods accept human-readable string keys and convert them to
/// [`object_store::path::Path`] internally.
#[derive(Clone, Debug)]
pub struct ObjectStoreClient(pub Arc<dyn ObjectStore>);

impl ObjectStoreClient {
    /// Wrap a concrete [`ObjectStore`] implementation.
    pub fn new(store: impl ObjectStore) -> Self {
        Self(Arc::new(store))
    }

    /// Start a GET for `key` and return its metadata with an unread body.
    ///
    /// `options` carries the byte range and version, if any.
    #[tracing::instrument(
        name = "object.get_opts",
        skip(self, options),
        fields(range = ?options.range, version = ?options.version)
    )]
    pub async fn get_opts(&self, key: &str, options: GetOptions) -> Result<GetOutput, Error> {
        let path = object_path(key)?;
        let result = self
            .0
            .get_opts(&path, options)
            .await
            .map_err(from_object_store)?;

        let meta = result.meta.clone();
        let attributes = result.attributes.clone();
        let range = result.range.clone();
        let content = result.into_stream().map_err(from_object_store).boxed();

        Ok(GetOutput {
            meta,
            attributes,
            range,
            content,
        })
    }

    /// Upload `data` to `key` with the given response attributes.
    #[tracing::instrument(name = "object.put", skip(self, data, attributes), fields(size = data.len()))]
    pub async fn put(
        &self,
        key: &str,
        data: Bytes,
        attributes: Attributes,
    ) -> Result<PutResult, Error> {
        let path = object_path(key)?;
        let opts = PutOptions {
            mode: PutMode::Overwrite,
            attributes,
            ..Default::default()
        };
        self.0
            .put_opts(&path, PutPayload::from(data), opts)
            .await
            .map_err(from_object_store)
    }
}

/// Convert `key` into a store path that names exactly the same object.
///
/// Keys that `object_store` cannot represent verbatim (empty segments,
/// `.` or `..` segments, control characters, leading or trailing `/`) are
/// rejected instead of being normalized into a different key.
fn object_path(key: &str) -> Result<Path, Error> {
    let path = Path::parse(key).map_err(|err| {
        Error::invalid_input()
            .with_message(format!("unsupported object key {key:?}: {err}"))
            .with_source(err)
    })?;
    if path.as_ref() != key {
        return Err(Error::invalid_input()
            .with_message(format!("object key {key:?} would be stored as {path:?}")));
    }
    Ok(path)
}

/// Convert an [`object_store::Error`] into a crate [`Error`].
pub(crate) fn from_object_store(err: object_store::Error) -> Error {
    let error = match &err {
        object_store::Error::NotFound { .. } => Error::not_found(),
        object_store::Error::PermissionDenied { .. } => Error::authorization(),
        object_store::Error::Unauthenticated { .. } => Error::authentication(),
        object_store::Error::Precondition { .. } | object_store::Error::NotModified { .. } => {
            Error::invalid_input()
        }
        _ => Error::external_error(),
    };
    error.with_message(err.to_string()).with_source(err)
}

#[cfg(test)]
mod tests {
    use flowfetch_core::ErrorKind;
    use object_store::memory::InMemory;
    use object_store::{Attribute, GetRange};

    use super::*;

    fn test_client() -> ObjectStoreClient {
        ObjectStoreClient::new(InMemory::new())
    }

    async fn collect(output: GetOutput) -> Bytes {
        let chunks: Vec<Bytes> = output.content.try_collect().await.unwrap();
        chunks.concat().into()
    }

    #[tokio::test]
    async fn put_and_get() {
        let client = test_client();
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, "text/plain".into());
        client
            .put("test.txt", Bytes::from("hello world"), attributes)
            .await
            .unwrap();

        let output = client
            .get_opts("test.txt", GetOptions::default())
            .await
            .unwrap();
        assert_eq!(output.meta.size, 11);
        assert_eq!(
            output
                .attributes
                .get(&Attribute::ContentType)
                .map(|v| v.to_string()),
            Some("text/plain".to_string())
        );
        assert_eq!(collect(output).await, Bytes::from("hello world"));
    }

    #[tokio::test]
    async fn get_bounded_range() {
        let client = test_client();
        client
            .put("range.bin", Bytes::from("0123456789"), Attributes::new())
            .await
            .unwrap();

        let options = GetOptions {
            range: Some(GetRange::Bounded(2..5)),
            ..Default::default()
        };
        let output = client.get_opts("range.bin", options).await.unwrap();
        assert_eq!(output.range, 2..5);
        assert_eq!(collect(output).await, Bytes::from("234"));
    }

    #[tokio::test]
    async fn get_not_found() {
        let client = test_client();
        let err = client
            .get_opts("missing", GetOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn put_returns_etag() {
        let client = test_client();
        let result = client
            .put("etag.bin", Bytes::from("x"), Attributes::new())
            .await
            .unwrap();
        assert!(result.e_tag.is_some());
    }

    #[test]
    fn keys_are_kept_verbatim() {
        for key in ["report[1].txt", "report~1.txt", "100%.csv", "a b/c#d?.txt"] {
            assert_eq!(object_path(key).unwrap().as_ref(), key);
        }
    }

    #[test]
    fn keys_that_would_be_rewritten_are_rejected() {
        for key in ["a//b.txt", "/leading.txt", "trailing/", "a/../b.txt", "tab\there"] {
            let err = object_path(key).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{key}");
        }
    }
}
