//! The authenticated caller.

use crudhub_core::types::Auditor;

use crate::jwt::Claims;

/// Identity resolved from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Token subject.
    pub subject: String,
    /// Name stamped into audit fields.
    pub name: String,
}

impl Principal {
    /// The auditor for writes made by this principal.
    pub fn auditor(&self) -> Auditor {
        Auditor::new(self.name.clone())
    }

    /// The auditor for an optional principal; anonymous callers are `unknown`.
    pub fn auditor_of(principal: Option<&Principal>) -> Auditor {
        principal.map(Principal::auditor).unwrap_or_default()
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        let name = claims.principal_name().to_string();
        Self {
            subject: claims.sub,
            name,
        }
    }
}
