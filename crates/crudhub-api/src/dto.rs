//! Wire representation contract for resources.

use serde::Serialize;
use serde::de::DeserializeOwned;
use validator::Validate;

/// A DTO served by a [`Resource`](crate::Resource).
///
/// The id is `None` for records that have not been persisted yet.
pub trait ResourceDto:
    Serialize + DeserializeOwned + Validate + Clone + Send + Sync + 'static
{
    /// The persisted id, if any. Blank ids count as absent.
    fn id(&self) -> Option<&str>;

    /// The soft-delete flag as sent by the client.
    ///
    /// `None` on an update keeps the stored value.
    fn active(&self) -> Option<bool> {
        None
    }
}
