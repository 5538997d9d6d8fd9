#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod attributes;
mod error;
mod fetcher;
mod params;
mod properties;

#[doc(hidden)]
pub mod prelude;

pub use attributes::object_attributes;
pub use error::{FetchError, FetchResult};
pub use fetcher::ObjectFetcher;
pub use params::FetchParams;
pub use properties::{DEFAULT_KEY, FetchProperties, RangePolicy};

/// Tracing target for fetch operations.
pub const TRACING_TARGET: &str = "flowfetch_processor";
