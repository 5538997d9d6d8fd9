//! Flow units: payload bytes plus string attributes.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attribute map carried by a [`FlowUnit`].
pub type Attributes = BTreeMap<String, String>;

/// Well-known attribute names shared by every operator in a flow.
pub mod core_attributes {
    /// File name of the unit's content.
    pub const FILENAME: &str = "filename";
    /// Parent path of the unit's content, without the file name.
    pub const PATH: &str = "path";
    /// Full path of the unit's content, including the file name.
    pub const ABSOLUTE_PATH: &str = "absolute.path";
    /// MIME type of the unit's content.
    pub const MIME_TYPE: &str = "mime.type";
}

/// Opaque identifier for a flow unit, backed by a UUIDv7.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(Uuid);

impl UnitId {
    /// Generate a new time-ordered unit id (UUIDv7).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A discrete unit of work moving through the pipeline.
///
/// The host owns units; operators receive one, may replace its content and
/// add attributes, and hand it back together with a routing decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowUnit {
    id: UnitId,
    attributes: Attributes,
    content: Bytes,
}

impl FlowUnit {
    /// Create an empty unit with a fresh id.
    pub fn new() -> Self {
        Self {
            id: UnitId::new(),
            attributes: Attributes::new(),
            content: Bytes::new(),
        }
    }

    /// Replace the content of this unit.
    pub fn with_content(mut self, content: impl Into<Bytes>) -> Self {
        self.content = content.into();
        self
    }

    /// Set a single attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Returns the unit id.
    pub fn id(&self) -> UnitId {
        self.id
    }

    /// Returns the value of the attribute `name`, if set.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns all attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Merge `attributes` onto this unit, overwriting existing names.
    ///
    /// Attributes not present in `attributes` are left untouched.
    pub fn put_all_attributes(&mut self, attributes: Attributes) {
        self.attributes.extend(attributes);
    }

    /// Returns the content bytes.
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Replace the content bytes.
    pub fn set_content(&mut self, content: Bytes) {
        self.content = content;
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

impl Default for FlowUnit {
    fn default() -> Self {
        Self::new()
    }
}
