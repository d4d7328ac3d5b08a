//! JWT claims structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims payload carried by bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the principal identifier.
    pub sub: String,
    /// Login name, when the issuer provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// The name used for audit stamps: `username`, falling back to `sub`.
    pub fn principal_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(&self.sub)
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_name_falls_back_to_subject() {
        let mut claims = Claims {
            sub: "42".into(),
            username: Some("alice".into()),
            iat: 0,
            exp: 0,
        };
        assert_eq!(claims.principal_name(), "alice");
        claims.username = Some(" ".into());
        assert_eq!(claims.principal_name(), "42");
        claims.username = None;
        assert_eq!(claims.principal_name(), "42");
        assert!(claims.is_expired());
    }
}
