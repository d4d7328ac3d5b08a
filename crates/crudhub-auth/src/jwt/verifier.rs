//! Bearer token verification.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use crudhub_core::config::AuthConfig;
use crudhub_core::error::AppError;

use super::claims::Claims;

/// Validates a bearer token and yields its claims.
///
/// The HTTP layer only depends on this trait so deployments can plug in a
/// different token authority.
#[async_trait]
pub trait TokenVerifier: Send + Sync + 'static {
    /// Verify `token`, returning an `Authentication` error when invalid.
    async fn verify(&self, token: &str) -> Result<Claims, AppError>;
}

/// HS256 verifier using the configured shared secret.
#[derive(Clone)]
pub struct JwtVerifier {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtVerifier {
    /// Creates a new verifier from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                debug!(error = %e, "Rejected bearer token");
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::authentication("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use crudhub_core::error::ErrorKind;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    #[tokio::test]
    async fn test_round_trip_claims() {
        let cfg = config("secret-one");
        let token = JwtEncoder::new(&cfg).issue("42", Some("alice")).unwrap();
        let claims = JwtVerifier::new(&cfg).verify(&token).await.unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.principal_name(), "alice");
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let token = JwtEncoder::new(&config("secret-one"))
            .issue("42", None)
            .unwrap();
        let err = JwtVerifier::new(&config("secret-two"))
            .verify(&token)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let cfg = config("secret-one");
        let now = chrono::Utc::now().timestamp();
        let token = JwtEncoder::new(&cfg)
            .encode(&Claims {
                sub: "42".into(),
                username: None,
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        let err = JwtVerifier::new(&cfg).verify(&token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.message, "Token has expired");
    }

    #[tokio::test]
    async fn test_garbage_rejected() {
        let err = JwtVerifier::new(&config("s"))
            .verify("not-a-token")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }
}
