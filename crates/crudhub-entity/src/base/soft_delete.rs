//! Soft-delete base.

use serde::{Deserialize, Serialize};

/// Identity and soft-delete flag of a stored document.
///
/// Documents are never removed; deleting one sets `active` to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftDelete {
    /// Database-assigned id, stored as `_id`.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Whether the document is visible to default reads.
    #[serde(default = "default_active")]
    pub active: bool,
}

impl SoftDelete {
    /// Base for an existing document.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            active: true,
        }
    }
}

impl Default for SoftDelete {
    fn default() -> Self {
        Self {
            id: None,
            active: true,
        }
    }
}

fn default_active() -> bool {
    true
}
