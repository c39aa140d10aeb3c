//! Audit sink seam
//!
//! Delivery and format are the host's concern; the engine only emits
//! fire-and-forget notifications. Implementations must not block and must
//! not panic back into the evaluator.

use crate::authz::request::ActionRequest;
use crate::authz::types::Principal;

/// Receives security-relevant evaluation outcomes.
pub trait AuditSink: Send + Sync {
    /// A request was denied for missing permissions.
    fn log_denied(&self, principal: &Principal, action: &str, request: &ActionRequest);

    /// A request targeted the engine's own protected configuration index.
    fn log_protected_resource_attempt(&self, principal: &Principal, action: &str, request: &ActionRequest);
}

/// Default sink that discards everything.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn log_denied(&self, _principal: &Principal, _action: &str, _request: &ActionRequest) {}

    fn log_protected_resource_attempt(&self, _principal: &Principal, _action: &str, _request: &ActionRequest) {}
}
