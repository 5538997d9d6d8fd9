//! Attributes derived from a retrieved object.

use flowfetch_core::{Attributes, ObjectMetadata, core_attributes};

/// Bucket the object was read from.
pub const S3_BUCKET: &str = "s3.bucket";
/// Entity tag of the object.
pub const S3_ETAG: &str = "s3.etag";
/// Expiration time in epoch milliseconds.
pub const S3_EXPIRATION_TIME: &str = "s3.expirationTime";
/// Lifecycle rule that set the expiration time.
pub const S3_EXPIRATION_TIME_RULE_ID: &str = "s3.expirationTimeRuleId";
/// Version of the object.
pub const S3_VERSION: &str = "s3.version";
/// Content hash value.
pub const HASH_VALUE: &str = "hash.value";
/// Algorithm of [`HASH_VALUE`].
pub const HASH_ALGORITHM: &str = "hash.algorithm";

/// Build the attributes a successful fetch adds to its unit.
///
/// Only fields present in `metadata` produce attributes. User metadata is
/// applied last and wins over a fixed attribute of the same name.
pub fn object_attributes(bucket: Option<&str>, metadata: &ObjectMetadata) -> Attributes {
    let mut attributes = Attributes::new();
    let mut put = |name: &str, value: &str| {
        attributes.insert(name.to_owned(), value.to_owned());
    };

    if let Some(bucket) = bucket {
        put(S3_BUCKET, bucket);
    }

    if let Some(disposition) = metadata.content_disposition.as_deref() {
        match disposition.rfind('/') {
            Some(slash) if slash + 1 < disposition.len() => {
                put(core_attributes::PATH, &disposition[..slash]);
                put(core_attributes::ABSOLUTE_PATH, disposition);
                put(core_attributes::FILENAME, &disposition[slash + 1..]);
            }
            _ => put(core_attributes::FILENAME, disposition),
        }
    }

    if let Some(md5) = metadata.content_md5.as_deref() {
        put(HASH_VALUE, md5);
        put(HASH_ALGORITHM, "MD5");
    }

    if let Some(content_type) = metadata.content_type.as_deref() {
        put(core_attributes::MIME_TYPE, content_type);
    }

    if let Some(e_tag) = metadata.e_tag.as_deref() {
        put(S3_ETAG, e_tag);
    }

    if let Some(expiration) = metadata.expiration_time {
        put(S3_EXPIRATION_TIME, &expiration.as_millisecond().to_string());
    }

    if let Some(rule_id) = metadata.expiration_rule_id.as_deref() {
        put(S3_EXPIRATION_TIME_RULE_ID, rule_id);
    }

    if let Some(version) = metadata.version_id.as_deref() {
        put(S3_VERSION, version);
    }

    for (name, value) in &metadata.user_metadata {
        put(name, value);
    }

    attributes
}
