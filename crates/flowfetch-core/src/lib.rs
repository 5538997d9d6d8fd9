#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod expression;
mod host;
mod memory;
mod remote;
mod unit;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

#[doc(hidden)]
pub mod prelude;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use expression::AttributeExpression;
pub use host::{
    AuditEvent, AuditSink, ExpressionEvaluator, HostContext, Relationship, Router, UnitSource,
};
pub use memory::MemorySession;
pub use remote::{ByteRange, GetObjectRequest, ObjectGetter, ObjectMetadata, RemoteObject};
pub use unit::{Attributes, FlowUnit, UnitId, core_attributes};
