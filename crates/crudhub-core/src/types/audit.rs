//! Audit stamping types.

use std::fmt;

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Name stamped into audit fields when no principal is authenticated.
pub const UNKNOWN_AUDITOR: &str = "unknown";

/// The principal name recorded on writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Auditor(String);

impl Auditor {
    /// Create an auditor for the given principal name.
    ///
    /// A blank name resolves to the anonymous auditor.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.trim().is_empty() {
            Self::unknown()
        } else {
            Self(name)
        }
    }

    /// The anonymous auditor.
    pub fn unknown() -> Self {
        Self(UNKNOWN_AUDITOR.to_string())
    }

    /// Whether this is the anonymous auditor.
    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_AUDITOR
    }

    /// Borrow the principal name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Auditor {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for Auditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creation and modification stamps carried by audited entities.
///
/// Embedded into entities with `#[serde(flatten)]` so the stamps are stored
/// as top-level document fields. Dates are stored as BSON dates, which hold
/// millisecond precision, so stamps are truncated to whole milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFields {
    /// Principal that created the record.
    #[serde(default = "unknown_name")]
    pub created_by: String,
    /// When the record was created.
    #[serde(default = "now", with = "chrono_datetime_as_bson_datetime")]
    pub created_date: DateTime<Utc>,
    /// Principal that last modified the record.
    #[serde(default = "unknown_name")]
    pub last_modified_by: String,
    /// When the record was last modified.
    #[serde(default = "now", with = "chrono_datetime_as_bson_datetime")]
    pub last_modified_date: DateTime<Utc>,
}

impl AuditFields {
    /// Field names contributed to the stored document.
    pub const FIELD_NAMES: [&'static str; 4] = [
        "created_by",
        "created_date",
        "last_modified_by",
        "last_modified_date",
    ];

    /// Stamp the creation fields.
    pub fn stamp_created(&mut self, auditor: &Auditor, now: DateTime<Utc>) {
        self.created_by = auditor.as_str().to_string();
        self.created_date = now.trunc_subsecs(3);
    }

    /// Stamp the modification fields.
    pub fn stamp_modified(&mut self, auditor: &Auditor, now: DateTime<Utc>) {
        self.last_modified_by = auditor.as_str().to_string();
        self.last_modified_date = now.trunc_subsecs(3);
    }
}

impl Default for AuditFields {
    fn default() -> Self {
        let now = now();
        Self {
            created_by: unknown_name(),
            created_date: now,
            last_modified_by: unknown_name(),
            last_modified_date: now,
        }
    }
}

fn unknown_name() -> String {
    UNKNOWN_AUDITOR.to_string()
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_auditor_is_unknown() {
        assert!(Auditor::new("  ").is_unknown());
        assert_eq!(Auditor::new("alice").as_str(), "alice");
        assert_eq!(Auditor::default().to_string(), "unknown");
    }

    #[test]
    fn test_stamps() {
        let mut audit = AuditFields::default();
        let later = audit.created_date + chrono::Duration::seconds(5);
        audit.stamp_modified(&Auditor::new("bob"), later);
        assert_eq!(audit.created_by, "unknown");
        assert_eq!(audit.last_modified_by, "bob");
        assert_eq!(audit.last_modified_date, later);
    }

    #[test]
    fn test_dates_stored_as_bson_dates() {
        let mut audit = AuditFields::default();
        let precise = DateTime::parse_from_rfc3339("2024-03-01T10:00:00.123456789Z")
            .unwrap()
            .with_timezone(&Utc);
        audit.stamp_created(&Auditor::new("alice"), precise);

        let stored = bson::to_document(&audit).unwrap();
        let created = stored.get_datetime("created_date").unwrap();
        assert_eq!(created.timestamp_millis(), precise.timestamp_millis());
        assert!(stored.get_datetime("last_modified_date").is_ok());

        let back: AuditFields = bson::from_document(stored).unwrap();
        assert_eq!(back, audit);
    }
}
