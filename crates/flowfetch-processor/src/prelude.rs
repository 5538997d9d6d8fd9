//! Convenience re-exports.

pub use crate::{FetchError, FetchProperties, ObjectFetcher, RangePolicy};
