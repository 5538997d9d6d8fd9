//! Convenience re-exports.

pub use crate::{
    AttributeExpression, AuditSink, ByteRange, Error, ErrorKind, ExpressionEvaluator, FlowUnit,
    GetObjectRequest, HostContext, MemorySession, ObjectGetter, ObjectMetadata, Relationship,
    RemoteObject, Result, Router, UnitSource,
};
