//! Authentication wire types.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body exchanging a refresh token for a new access token.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    /// The refresh token; must be present.
    #[serde(alias = "refreshToken")]
    #[validate(required(message = "refresh_token must not be null"))]
    pub refresh_token: Option<String>,
    /// Whether the session should be remembered.
    #[serde(default, alias = "rememberMe")]
    pub remember_me: Option<bool>,
}
