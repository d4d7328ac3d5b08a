//! Request context carrying the caller's auditor name.

use chrono::{DateTime, Utc};

use crudhub_core::types::Auditor;

/// Context for the current request.
///
/// Built by the HTTP layer and passed into service methods so that every
/// write knows who is acting.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Name stamped into audit fields.
    pub auditor: Auditor,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for the given auditor.
    pub fn new(auditor: Auditor) -> Self {
        Self {
            auditor,
            request_time: Utc::now(),
        }
    }

    /// Context for an unauthenticated caller.
    pub fn anonymous() -> Self {
        Self::new(Auditor::unknown())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::anonymous()
    }
}
