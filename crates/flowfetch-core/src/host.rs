//! Capabilities an operator borrows from its host pipeline.
//!
//! The host owns scheduling, queuing and routing. Operators only see the
//! narrow traits below, which keeps them testable with in-memory fakes
//! (see [`MemorySession`](crate::MemorySession)).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::Result;
use crate::unit::FlowUnit;

/// Named output channel a unit is routed to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Relationship {
    /// The operator completed its work on the unit.
    Success,
    /// The operator could not complete its work; the unit is unchanged.
    Failure,
}

/// Inbound queue of units waiting for an operator.
pub trait UnitSource: Send + Sync {
    /// Take the next unit without blocking, if one is available.
    fn poll(&self) -> Option<FlowUnit>;
}

/// Evaluates property expressions against a unit's attributes.
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluate `expression` in the context of `unit`.
    fn evaluate(&self, expression: &str, unit: &FlowUnit) -> Result<String>;
}

/// Outbound routing of processed units.
pub trait Router: Send + Sync {
    /// Hand `unit` back to the host on `relationship`.
    fn transfer(&self, unit: FlowUnit, relationship: Relationship);
}

/// Provenance events emitted by operators.
pub trait AuditSink: Send + Sync {
    /// Record that `unit`'s content was received from `transit_uri`.
    fn receive(&self, unit: &FlowUnit, transit_uri: &str, duration: Duration);
}

/// A recorded provenance event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Content was pulled into the flow from an external system.
    Receive {
        /// Id of the unit that received the content.
        unit_id: crate::UnitId,
        /// Where the content came from.
        transit_uri: String,
        /// Wall-clock time the transfer took, in milliseconds.
        duration_ms: u64,
    },
}

/// Borrowed set of host capabilities handed to an operator per trigger.
#[derive(Clone, Copy)]
pub struct HostContext<'a> {
    /// Where units are polled from.
    pub source: &'a dyn UnitSource,
    /// How property expressions are evaluated.
    pub evaluator: &'a dyn ExpressionEvaluator,
    /// Where processed units are routed.
    pub router: &'a dyn Router,
    /// Where provenance events go.
    pub audit: &'a dyn AuditSink,
}

impl<'a> HostContext<'a> {
    /// Bundle the four capabilities.
    pub fn new(
        source: &'a dyn UnitSource,
        evaluator: &'a dyn ExpressionEvaluator,
        router: &'a dyn Router,
        audit: &'a dyn AuditSink,
    ) -> Self {
        Self {
            source,
            evaluator,
            router,
            audit,
        }
    }
}
