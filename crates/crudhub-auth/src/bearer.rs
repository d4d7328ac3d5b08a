//! Bearer token extraction.

/// Name of the header carrying the token.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Scheme prefix preceding the token.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Return the token from an `Authorization` header value.
///
/// Yields `None` when the header is absent, blank, or uses another scheme.
pub fn resolve_token(header: Option<&str>) -> Option<&str> {
    header
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_resolved() {
        assert_eq!(resolve_token(Some("Bearer abc123")), Some("abc123"));
    }

    #[test]
    fn test_missing_or_foreign_scheme() {
        assert_eq!(resolve_token(None), None);
        assert_eq!(resolve_token(Some("   ")), None);
        assert_eq!(resolve_token(Some("Basic dXNlcjpwYXNz")), None);
        assert_eq!(resolve_token(Some("bearer abc123")), None);
    }

    #[test]
    fn test_prefix_only_yields_empty_token() {
        assert_eq!(resolve_token(Some("Bearer ")), Some(""));
    }
}
