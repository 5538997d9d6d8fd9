//! In-process host session backed by plain collections.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::host::{
    AuditEvent, AuditSink, ExpressionEvaluator, HostContext, Relationship, Router, UnitSource,
};
use crate::unit::FlowUnit;

/// Host session that keeps its queue, routed units and audit events in
/// memory.
///
/// Used by the command-line runner and by tests that need to observe where
/// an operator sent its units.
#[derive(Debug, Default)]
pub struct MemorySession {
    inbound: Mutex<VecDeque<FlowUnit>>,
    routed: Mutex<Vec<(Relationship, FlowUnit)>>,
    events: Mutex<Vec<AuditEvent>>,
}

impl MemorySession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with `units` queued in order.
    pub fn with_units(units: impl IntoIterator<Item = FlowUnit>) -> Self {
        let session = Self::new();
        lock(&session.inbound).extend(units);
        session
    }

    /// Number of units still waiting in the inbound queue.
    pub fn queued(&self) -> usize {
        lock(&self.inbound).len()
    }

    /// Units routed to `relationship`, in routing order.
    pub fn routed_to(&self, relationship: Relationship) -> Vec<FlowUnit> {
        lock(&self.routed)
            .iter()
            .filter(|(r, _)| *r == relationship)
            .map(|(_, unit)| unit.clone())
            .collect()
    }

    /// Remove and return everything routed so far.
    pub fn take_routed(&self) -> Vec<(Relationship, FlowUnit)> {
        std::mem::take(&mut *lock(&self.routed))
    }

    /// Audit events recorded so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        lock(&self.events).clone()
    }

    /// Host capabilities backed by this session and `evaluator`.
    pub fn host<'a>(&'a self, evaluator: &'a dyn ExpressionEvaluator) -> HostContext<'a> {
        HostContext::new(self, evaluator, self, self)
    }
}

impl UnitSource for MemorySession {
    fn poll(&self) -> Option<FlowUnit> {
        lock(&self.inbound).pop_front()
    }
}

impl Router for MemorySession {
    fn transfer(&self, unit: FlowUnit, relationship: Relationship) {
        lock(&self.routed).push((relationship, unit));
    }
}

impl AuditSink for MemorySession {
    fn receive(&self, unit: &FlowUnit, transit_uri: &str, duration: Duration) {
        lock(&self.events).push(AuditEvent::Receive {
            unit_id: unit.id(),
            transit_uri: transit_uri.to_owned(),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        });
    }
}

// A panic while holding one of these locks cannot leave the collections in
// a torn state, so poisoning is ignored.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
