//! [`ObjectGetter`] implementation over the AWS SDK for S3.
//!
//! Unlike [`ObjectStoreGetter`](crate::ObjectStoreGetter), this adapter sees
//! every response header, so lifecycle expiration is reported.

use aws_config::BehaviorVersion;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::get_object::{GetObjectError, GetObjectOutput};
use aws_sdk_s3::primitives::ByteStream;
use flowfetch_core::{Error, GetObjectRequest, ObjectGetter, ObjectMetadata, RemoteObject, Result};
use futures::StreamExt;

use crate::TRACING_TARGET;
use crate::expiration::parse_expiration;
use crate::providers::S3Config;

/// Serves single-object GETs with an [`aws_sdk_s3::Client`].
///
/// One client serves every bucket; the bucket is part of each request.
#[derive(Debug, Clone)]
pub struct SdkGetter {
    client: Client,
}

impl SdkGetter {
    /// Build a client from `config`.
    ///
    /// Static keys (given directly or through the credentials file) are used
    /// when present, otherwise the default AWS credential chain applies.
    pub async fn new(config: &S3Config) -> Result<Self> {
        config.validate()?;
        let keys = config.resolve_keys()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.timeout())
                    .build(),
            );
        if let Some(keys) = &keys {
            loader = loader.credentials_provider(Credentials::new(
                &keys.access_key,
                &keys.secret_key,
                config.session_token.clone(),
                None,
                "flowfetch",
            ));
        }
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let mut builder = aws_sdk_s3::config::Builder::from(&loader.load().await);
        if config.endpoint.is_some() {
            // S3-compatible services (MinIO and friends) need path-style URLs.
            builder = builder.force_path_style(true);
        }

        tracing::info!(
            target: TRACING_TARGET,
            region = %config.region,
            endpoint = ?config.endpoint,
            static_credentials = keys.is_some(),
            timeout_secs = config.timeout_secs,
            "S3 SDK client initialized"
        );

        Ok(Self {
            client: Client::from_conf(builder.build()),
        })
    }
}

#[async_trait::async_trait]
impl ObjectGetter for SdkGetter {
    async fn get_object(&self, request: &GetObjectRequest) -> Result<RemoteObject> {
        let output = self
            .client
            .get_object()
            .bucket(&request.bucket)
            .key(&request.key)
            .set_version_id(request.version_id.clone())
            .set_range(request.range.map(|range| range.to_string()))
            .send()
            .await
            .map_err(from_sdk_error)?;

        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %request.bucket,
            key = %request.key,
            content_length = ?output.content_length(),
            content_range = ?output.content_range(),
            "object response received"
        );

        Ok(remote_object(&request.bucket, output))
    }
}

fn remote_object(bucket: &str, output: GetObjectOutput) -> RemoteObject {
    let metadata = object_metadata(&output);
    RemoteObject::new(Some(bucket.to_owned()), metadata, body_stream(output.body))
}

fn object_metadata(output: &GetObjectOutput) -> ObjectMetadata {
    let expiration = output
        .expiration()
        .map(parse_expiration)
        .unwrap_or_default();

    ObjectMetadata {
        content_disposition: output.content_disposition().map(str::to_owned),
        content_type: output.content_type().map(str::to_owned),
        e_tag: output.e_tag().map(str::to_owned),
        expiration_time: expiration.time,
        expiration_rule_id: expiration.rule_id,
        user_metadata: output
            .metadata()
            .map(|metadata| {
                metadata
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default(),
        version_id: output.version_id().map(str::to_owned),
        ..Default::default()
    }
}

fn body_stream(body: ByteStream) -> futures::stream::BoxStream<'static, Result<bytes::Bytes>> {
    futures::stream::try_unfold(body, |mut body| async move {
        let chunk = body.try_next().await.map_err(|err| {
            Error::network_error()
                .with_message(format!("object body interrupted: {err}"))
                .with_source(err)
        })?;
        Ok::<_, Error>(chunk.map(|chunk| (chunk, body)))
    })
    .boxed()
}

fn from_sdk_error(err: SdkError<GetObjectError>) -> Error {
    let error = match &err {
        SdkError::ServiceError(service) => match service.err() {
            GetObjectError::NoSuchKey(_) => Error::not_found(),
            GetObjectError::InvalidObjectState(_) => Error::invalid_input(),
            _ => match service.raw().status().as_u16() {
                401 => Error::authentication(),
                403 => Error::authorization(),
                404 => Error::not_found(),
                400 | 412 | 416 => Error::invalid_input(),
                _ => Error::external_error(),
            },
        },
        SdkError::TimeoutError(_) => Error::timeout(),
        SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => Error::network_error(),
        _ => Error::external_error(),
    };
    error
        .with_message(DisplayErrorContext(&err).to_string())
        .with_source(err)
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;

    fn output() -> GetObjectOutput {
        GetObjectOutput::builder()
            .content_disposition("a/b/c.txt")
            .content_type("text/plain")
            .e_tag("\"etag-1\"")
            .expiration(r#"expiry-date="Fri, 23 Dec 2012 00:00:00 GMT", rule-id="archive-rule""#)
            .metadata("owner", "alice")
            .version_id("v2")
            .body(ByteStream::from_static(b"lifecycle managed"))
            .build()
    }

    #[test]
    fn maps_response_headers() {
        let metadata = object_metadata(&output());

        assert_eq!(metadata.content_disposition.as_deref(), Some("a/b/c.txt"));
        assert_eq!(metadata.content_type.as_deref(), Some("text/plain"));
        assert_eq!(metadata.e_tag.as_deref(), Some("\"etag-1\""));
        assert_eq!(
            metadata.expiration_time,
            Some("2012-12-23T00:00:00Z".parse::<Timestamp>().unwrap())
        );
        assert_eq!(metadata.expiration_rule_id.as_deref(), Some("archive-rule"));
        assert_eq!(metadata.user_metadata.get("owner").map(String::as_str), Some("alice"));
        assert_eq!(metadata.version_id.as_deref(), Some("v2"));
    }

    #[test]
    fn absent_headers_stay_absent() {
        let metadata = object_metadata(&GetObjectOutput::builder().build());
        assert_eq!(metadata, ObjectMetadata::default());
    }

    #[tokio::test]
    async fn streams_body() {
        let mut object = remote_object("archive", output());
        assert_eq!(object.bucket(), Some("archive"));
        assert_eq!(object.metadata().expiration_rule_id.as_deref(), Some("archive-rule"));
        assert_eq!(
            object.read_to_end().await.unwrap().as_ref(),
            b"lifecycle managed"
        );
    }

    #[tokio::test]
    async fn builds_client_for_custom_endpoint() {
        let config = S3Config::default()
            .with_endpoint("http://localhost:9000")
            .with_keys("minioadmin", "minioadmin");
        assert!(SdkGetter::new(&config).await.is_ok());
    }
}
