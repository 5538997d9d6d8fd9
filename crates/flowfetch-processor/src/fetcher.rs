//! The object fetch operator.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use flowfetch_core::{
    Attributes, ExpressionEvaluator, FlowUnit, HostContext, ObjectGetter, Relationship, Result,
};

use crate::TRACING_TARGET;
use crate::attributes::object_attributes;
use crate::error::FetchResult;
use crate::params::FetchParams;
use crate::properties::FetchProperties;

/// Retrieves one object per unit and routes the unit to success or failure.
///
/// Holds only immutable configuration, so a single instance can serve
/// concurrent triggers.
pub struct ObjectFetcher {
    properties: FetchProperties,
    remote: Arc<dyn ObjectGetter>,
}

/// Content and attributes of a successful retrieval, not yet applied.
struct Retrieved {
    params: FetchParams,
    content: Bytes,
    attributes: Attributes,
}

impl ObjectFetcher {
    /// Creates a fetcher after validating `properties`.
    pub fn new(properties: FetchProperties, remote: Arc<dyn ObjectGetter>) -> Result<Self> {
        properties.validate()?;
        Ok(Self { properties, remote })
    }

    /// Poll one unit from the host, fetch its object, and route it.
    ///
    /// Returns `None` without side effects when no unit is queued. A
    /// receive event is recorded for successful fetches only.
    pub async fn on_trigger(&self, host: HostContext<'_>) -> Option<Relationship> {
        let unit = host.source.poll()?;
        let started = Instant::now();

        let (unit, transit_uri) = self.process(unit, host.evaluator, started).await;
        match transit_uri {
            Some(transit_uri) => {
                host.audit.receive(&unit, &transit_uri, started.elapsed());
                host.router.transfer(unit, Relationship::Success);
                Some(Relationship::Success)
            }
            None => {
                host.router.transfer(unit, Relationship::Failure);
                Some(Relationship::Failure)
            }
        }
    }

    /// Fetch the object addressed by `unit` and decide where it goes.
    ///
    /// On failure the unit is returned exactly as it was passed in.
    pub async fn fetch(
        &self,
        unit: FlowUnit,
        evaluator: &dyn ExpressionEvaluator,
    ) -> (FlowUnit, Relationship) {
        let (unit, transit_uri) = self.process(unit, evaluator, Instant::now()).await;
        let relationship = match transit_uri {
            Some(_) => Relationship::Success,
            None => Relationship::Failure,
        };
        (unit, relationship)
    }

    /// Returns the unit and, on success, the transit URI of its content.
    #[tracing::instrument(
        name = "object_fetcher.fetch",
        skip_all,
        fields(unit_id = %unit.id(), bucket, key)
    )]
    async fn process(
        &self,
        unit: FlowUnit,
        evaluator: &dyn ExpressionEvaluator,
        started: Instant,
    ) -> (FlowUnit, Option<String>) {
        match self.retrieve(&unit, evaluator).await {
            Ok(Retrieved {
                params,
                content,
                attributes,
            }) => {
                let mut unit = unit;
                unit.put_all_attributes(attributes);
                unit.set_content(content);
                let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

                tracing::info!(
                    target: TRACING_TARGET,
                    unit_id = %unit.id(),
                    bucket = %params.bucket,
                    key = %params.key,
                    size = unit.size(),
                    elapsed_ms,
                    "retrieved object, routing to success"
                );
                (unit, Some(params.transit_uri()))
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    unit_id = %unit.id(),
                    category = error.category(),
                    kind = error.kind(),
                    error = %error,
                    "failed to retrieve object, routing to failure"
                );
                (unit, None)
            }
        }
    }

    async fn retrieve(
        &self,
        unit: &FlowUnit,
        evaluator: &dyn ExpressionEvaluator,
    ) -> FetchResult<Retrieved> {
        let params = FetchParams::resolve(&self.properties, evaluator, unit)?;

        let span = tracing::Span::current();
        span.record("bucket", params.bucket.as_str());
        span.record("key", params.key.as_str());

        let request = params.to_request();
        tracing::debug!(
            target: TRACING_TARGET,
            version_id = ?request.version_id,
            range = ?request.range,
            "requesting object"
        );

        // The response is released when `object` goes out of scope, on the
        // error paths as well.
        let (content, attributes) = {
            let mut object = self.remote.get_object(&request).await?;
            let content = object.read_to_end().await?;
            let attributes = object_attributes(object.bucket(), object.metadata());
            (content, attributes)
        };

        Ok(Retrieved {
            params,
            content,
            attributes,
        })
    }
}

impl std::fmt::Debug for ObjectFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectFetcher")
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}
