//! Static configuration of an [`ObjectFetcher`](crate::ObjectFetcher).

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use flowfetch_core::{Error, Result};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Default key expression: the unit's file name.
pub const DEFAULT_KEY: &str = "${filename}";

/// When a byte-range restriction is attached to the GET.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display,
)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RangePolicy {
    /// Only when a first or last byte index is configured.
    #[default]
    Explicit,
    /// On every request, `bytes=0-` when no index is configured.
    Always,
}

/// Fetch properties, each an attribute expression evaluated per unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(rename_all = "camelCase")]
pub struct FetchProperties {
    /// Bucket holding the object.
    #[cfg_attr(feature = "config", arg(long = "bucket", env = "FLOWFETCH_BUCKET"))]
    pub bucket: String,

    /// Key of the object.
    #[cfg_attr(
        feature = "config",
        arg(long = "key", env = "FLOWFETCH_KEY", default_value = DEFAULT_KEY)
    )]
    #[serde(default = "default_key")]
    pub key: String,

    /// Version of the object to download.
    #[cfg_attr(feature = "config", arg(long = "version-id", env = "FLOWFETCH_VERSION_ID"))]
    #[serde(default)]
    pub version_id: Option<String>,

    /// 0-based index of the first byte to download.
    #[cfg_attr(feature = "config", arg(long = "range-start", env = "FLOWFETCH_RANGE_START"))]
    #[serde(default)]
    pub range_start: Option<String>,

    /// 0-based index of the last byte to download.
    #[cfg_attr(feature = "config", arg(long = "range-end", env = "FLOWFETCH_RANGE_END"))]
    #[serde(default)]
    pub range_end: Option<String>,

    /// When to attach a byte range to the request.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "range-policy",
            env = "FLOWFETCH_RANGE_POLICY",
            value_enum,
            default_value_t = RangePolicy::Explicit
        )
    )]
    #[serde(default)]
    pub range_policy: RangePolicy,
}

fn default_key() -> String {
    DEFAULT_KEY.to_string()
}

impl FetchProperties {
    /// Creates properties for `bucket` with the default key expression.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: default_key(),
            version_id: None,
            range_start: None,
            range_end: None,
            range_policy: RangePolicy::default(),
        }
    }

    /// Sets the key expression.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Sets the version expression.
    pub fn with_version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    /// Sets the first and last byte index expressions.
    pub fn with_range(
        mut self,
        start: Option<impl Into<String>>,
        end: Option<impl Into<String>>,
    ) -> Self {
        self.range_start = start.map(Into::into);
        self.range_end = end.map(Into::into);
        self
    }

    /// Sets the range policy.
    pub fn with_range_policy(mut self, policy: RangePolicy) -> Self {
        self.range_policy = policy;
        self
    }

    /// Validates the properties before any unit is processed.
    ///
    /// Bucket and key are required; optional properties must not be blank
    /// when set.
    pub fn validate(&self) -> Result<()> {
        required("bucket", &self.bucket)?;
        required("key", &self.key)?;
        optional("version id", self.version_id.as_deref())?;
        optional("range start", self.range_start.as_deref())?;
        optional("range end", self.range_end.as_deref())?;
        Ok(())
    }
}

fn required(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::configuration().with_message(format!("{name} is required")));
    }
    Ok(())
}

fn optional(name: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(value) => required(name, value)
            .map_err(|_| Error::configuration().with_message(format!("{name} must not be empty"))),
        None => Ok(()),
    }
}
