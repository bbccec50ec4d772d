//! Port for the structured assignment audit trail.
//!
//! Defines the [`AuditLog`] trait for recording completed assignment
//! operations (distributions, manual assignments, transfers, deal creation)
//! as machine-readable events.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port keeps a durable
//! record of who moved which leads where.

use serde_json::Value;

/// A structured audit event.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. Adapters add the timestamp.
pub struct AuditEvent {
    /// Event type identifier (e.g., "leads_distributed", "leads_transferred").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for recording audit events.
///
/// `record` is synchronous and non-fallible: an audit failure must never
/// undo or abort an assignment that already committed.
pub trait AuditLog: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoAuditLog;

impl AuditLog for NoAuditLog {
    fn record(&self, _event: AuditEvent) {}
}
