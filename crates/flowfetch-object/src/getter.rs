//! [`ObjectGetter`] implementation over [`object_store`].

use flowfetch_core::{
    ByteRange, GetObjectRequest, ObjectGetter, ObjectMetadata, RemoteObject, Result,
};
use object_store::{Attribute, Attributes, GetOptions, GetRange, ObjectMeta};

use crate::TRACING_TARGET;
use crate::providers::BucketStores;

/// Serves single-object GETs from the store of the requested bucket.
///
/// `object_store` reports neither `Content-MD5` nor `x-amz-expiration`, so
/// those metadata fields are always absent on objects returned here.
#[derive(Debug)]
pub struct ObjectStoreGetter<S> {
    stores: S,
}

impl<S: BucketStores> ObjectStoreGetter<S> {
    /// Creates a getter over `stores`.
    pub fn new(stores: S) -> Self {
        Self { stores }
    }
}

#[async_trait::async_trait]
impl<S: BucketStores> ObjectGetter for ObjectStoreGetter<S> {
    async fn get_object(&self, request: &GetObjectRequest) -> Result<RemoteObject> {
        let client = self.stores.store(&request.bucket).await?;
        let output = client.get_opts(&request.key, get_options(request)).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %request.bucket,
            key = %request.key,
            size = output.meta.size,
            range = ?output.range,
            "object response received"
        );

        let metadata = object_metadata(&output.meta, &output.attributes);
        Ok(RemoteObject::new(
            Some(request.bucket.clone()),
            metadata,
            output.content,
        ))
    }
}

fn get_options(request: &GetObjectRequest) -> GetOptions {
    GetOptions {
        range: request.range.map(get_range),
        version: request.version_id.clone(),
        ..Default::default()
    }
}

fn get_range(range: ByteRange) -> GetRange {
    match range.end() {
        // object_store ranges are end-exclusive
        Some(end) => GetRange::Bounded(range.start()..end.saturating_add(1)),
        None => GetRange::Offset(range.start()),
    }
}

fn object_metadata(meta: &ObjectMeta, attributes: &Attributes) -> ObjectMetadata {
    let mut metadata = ObjectMetadata {
        e_tag: meta.e_tag.clone(),
        version_id: meta.version.clone(),
        ..Default::default()
    };

    for (attribute, value) in attributes.iter() {
        match attribute {
            Attribute::ContentDisposition => {
                metadata.content_disposition = Some(value.to_string());
            }
            Attribute::ContentType => {
                metadata.content_type = Some(value.to_string());
            }
            Attribute::Metadata(name) => {
                metadata
                    .user_metadata
                    .insert(name.to_string(), value.to_string());
            }
            _ => {}
        }
    }

    metadata
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use flowfetch_core::ErrorKind;

    use super::*;
    use crate::providers::MemoryStores;

    async fn getter_with(
        key: &str,
        data: &'static str,
        attributes: Attributes,
    ) -> ObjectStoreGetter<MemoryStores> {
        let stores = MemoryStores::new().with_bucket("bucket");
        stores
            .bucket("bucket")
            .unwrap()
            .put(key, Bytes::from_static(data.as_bytes()), attributes)
            .await
            .unwrap();
        ObjectStoreGetter::new(stores)
    }

    #[test]
    fn options_carry_version_and_range() {
        let request = GetObjectRequest::new("bucket", "key")
            .with_version("v1")
            .with_range(ByteRange::new(3, Some(7)).unwrap());
        let options = get_options(&request);
        assert_eq!(options.version.as_deref(), Some("v1"));
        assert_eq!(options.range, Some(GetRange::Bounded(3..8)));

        let options = get_options(&GetObjectRequest::new("bucket", "key"));
        assert_eq!(options.version, None);
        assert_eq!(options.range, None);
    }

    #[test]
    fn open_ended_range_is_offset() {
        assert_eq!(get_range(ByteRange::FULL), GetRange::Offset(0));
        assert_eq!(
            get_range(ByteRange::new(4, None).unwrap()),
            GetRange::Offset(4)
        );
        assert_eq!(
            get_range(ByteRange::new(0, Some(u64::MAX)).unwrap()),
            GetRange::Bounded(0..u64::MAX)
        );
    }

    #[tokio::test]
    async fn maps_attributes_to_metadata() {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentDisposition, "docs/report.txt".into());
        attributes.insert(Attribute::ContentType, "text/plain".into());
        attributes.insert(Attribute::CacheControl, "no-cache".into());
        attributes.insert(Attribute::Metadata("owner".into()), "alice".into());
        let getter = getter_with("report.txt", "quarterly numbers", attributes).await;

        let mut object = getter
            .get_object(&GetObjectRequest::new("bucket", "report.txt"))
            .await
            .unwrap();

        assert_eq!(object.bucket(), Some("bucket"));
        let metadata = object.metadata().clone();
        assert_eq!(metadata.content_disposition.as_deref(), Some("docs/report.txt"));
        assert_eq!(metadata.content_type.as_deref(), Some("text/plain"));
        assert_eq!(metadata.user_metadata.get("owner").map(String::as_str), Some("alice"));
        assert_eq!(metadata.user_metadata.len(), 1);
        assert!(metadata.e_tag.is_some());
        assert_eq!(metadata.content_md5, None);
        assert_eq!(metadata.expiration_time, None);

        let data = object.read_to_end().await.unwrap();
        assert_eq!(data.as_ref(), b"quarterly numbers");
    }

    #[tokio::test]
    async fn honors_byte_range() {
        let getter = getter_with("digits", "0123456789", Attributes::new()).await;
        let request = GetObjectRequest::new("bucket", "digits")
            .with_range(ByteRange::new(4, Some(4)).unwrap());

        let mut object = getter.get_object(&request).await.unwrap();
        assert_eq!(object.read_to_end().await.unwrap().as_ref(), b"4");

        let request = GetObjectRequest::new("bucket", "digits")
            .with_range(ByteRange::new(7, None).unwrap());
        let mut object = getter.get_object(&request).await.unwrap();
        assert_eq!(object.read_to_end().await.unwrap().as_ref(), b"789");
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let getter = getter_with("present", "x", Attributes::new()).await;
        let err = getter
            .get_object(&GetObjectRequest::new("bucket", "absent"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn reserved_characters_address_the_stored_key() {
        for key in ["report~1.txt", "report[1].txt"] {
            let getter = getter_with(key, "bracketed", Attributes::new()).await;
            let mut object = getter
                .get_object(&GetObjectRequest::new("bucket", key))
                .await
                .unwrap();
            assert_eq!(object.read_to_end().await.unwrap().as_ref(), b"bracketed");
        }
    }

    #[tokio::test]
    async fn empty_segment_is_not_collapsed() {
        let getter = getter_with("a/b.txt", "single-slash object", Attributes::new()).await;
        let err = getter
            .get_object(&GetObjectRequest::new("bucket", "a//b.txt"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn range_past_end_fails() {
        let getter = getter_with("short", "abc", Attributes::new()).await;
        let request = GetObjectRequest::new("bucket", "short")
            .with_range(ByteRange::new(10, Some(20)).unwrap());
        assert!(getter.get_object(&request).await.is_err());
    }
}
