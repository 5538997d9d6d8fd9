//! Per-unit fetch parameters.

use flowfetch_core::{ByteRange, ExpressionEvaluator, FlowUnit, GetObjectRequest};

use crate::error::{FetchError, FetchResult};
use crate::properties::{FetchProperties, RangePolicy};

/// Parameters of one fetch after evaluating [`FetchProperties`] against a
/// unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchParams {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
    pub range: Option<ByteRange>,
}

impl FetchParams {
    /// Evaluate and validate `properties` for `unit`.
    ///
    /// Byte indexes are parsed and checked before anything else touches the
    /// remote store.
    pub fn resolve(
        properties: &FetchProperties,
        evaluator: &dyn ExpressionEvaluator,
        unit: &FlowUnit,
    ) -> FetchResult<Self> {
        let evaluate = |property: &'static str, expression: &str| {
            evaluator
                .evaluate(expression, unit)
                .map_err(|source| FetchError::Expression { property, source })
        };

        let bucket = evaluate("bucket", &properties.bucket)?;
        if bucket.is_empty() {
            return Err(FetchError::MissingParameter { property: "bucket" });
        }
        let key = evaluate("key", &properties.key)?;
        if key.is_empty() {
            return Err(FetchError::MissingParameter { property: "key" });
        }

        let version_id = match properties.version_id.as_deref() {
            Some(expression) => Some(evaluate("version id", expression)?),
            None => None,
        }
        .filter(|version| !version.is_empty());

        let start = match properties.range_start.as_deref() {
            Some(expression) => {
                let value = evaluate("range start", expression)?;
                Some(parse_index("range start", value)?)
            }
            None => None,
        };
        let end = match properties.range_end.as_deref() {
            Some(expression) => {
                let value = evaluate("range end", expression)?;
                Some(parse_index("range end", value)?)
            }
            None => None,
        };

        let range = byte_range(start, end, properties.range_policy)?;

        Ok(Self {
            bucket,
            key,
            version_id,
            range,
        })
    }

    /// The GET request for these parameters.
    pub fn to_request(&self) -> GetObjectRequest {
        let mut request = GetObjectRequest::new(&self.bucket, &self.key);
        if let Some(version_id) = &self.version_id {
            request = request.with_version(version_id);
        }
        if let Some(range) = self.range {
            request = request.with_range(range);
        }
        request
    }

    /// Source identifier recorded with the receive event.
    pub fn transit_uri(&self) -> String {
        format!("http://{}.amazonaws.com/{}", self.bucket, self.key)
    }
}

fn parse_index(property: &'static str, value: String) -> FetchResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|source| FetchError::InvalidByteIndex {
            property,
            value,
            source,
        })
}

fn byte_range(
    start: Option<u64>,
    end: Option<u64>,
    policy: RangePolicy,
) -> FetchResult<Option<ByteRange>> {
    let explicit = start.is_some() || end.is_some();
    let start = start.unwrap_or(0);
    let range = ByteRange::new(start, end).map_err(|_| FetchError::InvertedRange {
        start,
        end: end.unwrap_or(u64::MAX),
    })?;

    match policy {
        RangePolicy::Explicit if !explicit => Ok(None),
        _ => Ok(Some(range)),
    }
}

#[cfg(test)]
mod tests {
    use flowfetch_core::AttributeExpression;

    use super::*;

    fn resolve(properties: &FetchProperties, unit: &FlowUnit) -> FetchResult<FetchParams> {
        FetchParams::resolve(properties, &AttributeExpression, unit)
    }

    fn unit() -> FlowUnit {
        FlowUnit::new()
            .with_attribute("filename", "report.txt")
            .with_attribute("start", "10")
            .with_attribute("end", "19")
            .with_attribute("version", "v7")
    }

    #[test]
    fn evaluates_expressions() {
        let properties = FetchProperties::new("archive-${missing}")
            .with_version_id("${version}")
            .with_range(Some("${start}"), Some("${end}"));
        let params = resolve(&properties, &unit()).unwrap();

        assert_eq!(params.bucket, "archive-");
        assert_eq!(params.key, "report.txt");
        assert_eq!(params.version_id.as_deref(), Some("v7"));
        assert_eq!(params.range, Some(ByteRange::new(10, Some(19)).unwrap()));
        assert_eq!(params.transit_uri(), "http://archive-.amazonaws.com/report.txt");
    }

    #[test]
    fn no_range_under_explicit_policy() {
        let params = resolve(&FetchProperties::new("bucket"), &unit()).unwrap();
        assert_eq!(params.range, None);
        assert_eq!(
            params.to_request(),
            GetObjectRequest::new("bucket", "report.txt")
        );
    }

    #[test]
    fn full_range_under_always_policy() {
        let properties = FetchProperties::new("bucket").with_range_policy(RangePolicy::Always);
        let params = resolve(&properties, &unit()).unwrap();
        assert_eq!(params.range, Some(ByteRange::FULL));
    }

    #[test]
    fn one_sided_ranges_use_defaults() {
        let properties = FetchProperties::new("bucket").with_range(Some("5"), None::<String>);
        let params = resolve(&properties, &unit()).unwrap();
        assert_eq!(params.range, Some(ByteRange::new(5, None).unwrap()));

        let properties = FetchProperties::new("bucket").with_range(None::<String>, Some(" 9 "));
        let params = resolve(&properties, &unit()).unwrap();
        assert_eq!(params.range, Some(ByteRange::new(0, Some(9)).unwrap()));
    }

    #[test]
    fn single_byte_range() {
        let properties = FetchProperties::new("bucket").with_range(Some("3"), Some("3"));
        let params = resolve(&properties, &unit()).unwrap();
        assert_eq!(params.range, Some(ByteRange::new(3, Some(3)).unwrap()));
    }

    #[test]
    fn non_integer_index_is_parameter_error() {
        let cases = [
            (Some("ten"), None),
            (None, Some("-1")),
            (Some("1.5"), Some("4")),
        ];
        for (start, end) in cases {
            let properties = FetchProperties::new("bucket").with_range(start, end);
            let err = resolve(&properties, &unit()).unwrap_err();
            assert!(matches!(err, FetchError::InvalidByteIndex { .. }), "{err}");
            assert_eq!(err.category(), "parameter");
        }
    }

    #[test]
    fn index_evaluating_to_empty_is_parameter_error() {
        let properties =
            FetchProperties::new("bucket").with_range(Some("${missing}"), None::<String>);
        let err = resolve(&properties, &unit()).unwrap_err();
        assert!(matches!(
            err,
            FetchError::InvalidByteIndex { property: "range start", .. }
        ));
    }

    #[test]
    fn inverted_range_is_range_error() {
        let properties = FetchProperties::new("bucket").with_range(Some("20"), Some("10"));
        let err = resolve(&properties, &unit()).unwrap_err();
        assert!(matches!(err, FetchError::InvertedRange { start: 20, end: 10 }));
    }

    #[test]
    fn empty_key_is_missing_parameter() {
        let properties = FetchProperties::new("bucket").with_key("${missing}");
        let err = resolve(&properties, &unit()).unwrap_err();
        assert!(matches!(err, FetchError::MissingParameter { property: "key" }));
    }

    #[test]
    fn empty_version_is_ignored() {
        let properties = FetchProperties::new("bucket").with_version_id("${missing}");
        let params = resolve(&properties, &unit()).unwrap();
        assert_eq!(params.version_id, None);
        assert_eq!(params.to_request().version_id, None);
    }

    #[test]
    fn unterminated_expression_is_parameter_error() {
        let properties = FetchProperties::new("${bucket");
        let err = resolve(&properties, &unit()).unwrap_err();
        assert!(matches!(err, FetchError::Expression { property: "bucket", .. }));
    }
}
