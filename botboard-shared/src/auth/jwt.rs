/// JWT token generation and validation
///
/// Tokens are signed with HS256 and identify the single dashboard admin.
/// There are no refresh tokens: a token is valid for 8 hours and the
/// dashboard logs in again when it expires.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 8 hours
/// - **Validation**: Signature, expiration, nbf, and issuer checks
/// - **Secret Management**: The secret must be at least 32 bytes and comes
///   from the `JWT_SECRET` environment variable
///
/// # Example
///
/// ```
/// use botboard_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new("admin");
/// let token = create_token(&claims, "test-secret-key-at-least-32-bytes-long")?;
///
/// let validated = validate_token(&token, "test-secret-key-at-least-32-bytes-long")?;
/// assert_eq!(validated.sub, "admin");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer claim stamped into and required from every token
pub const ISSUER: &str = "botboard";

/// How long an admin session token stays valid
pub const TOKEN_TTL_HOURS: i64 = 8;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,
}

/// JWT claims for an admin session
///
/// Standard claims (`sub`, `iss`, `iat`, `exp`, `nbf`) plus a `role` claim
/// that is always `"admin"` today but leaves room for read-only accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the admin username
    pub sub: String,

    /// Issuer - always "botboard"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Role claim (custom)
    pub role: String,
}

impl Claims {
    /// Creates claims for the given username with the default 8-hour expiry
    pub fn new(username: &str) -> Self {
        Self::with_expiration(username, Duration::hours(TOKEN_TTL_HOURS))
    }

    /// Creates claims with a custom expiration, used by tests to produce
    /// already-expired tokens
    pub fn with_expiration(username: &str, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: username.to_string(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            role: "admin".to_string(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Seconds the token remains valid for, as reported to the login caller
    pub fn expires_in_seconds(&self) -> i64 {
        (self.exp - self.iat).max(0)
    }
}

/// Creates a signed JWT from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT and extracts its claims
///
/// Verifies the signature, expiration, nbf window, and that the issuer is
/// `"botboard"`.
///
/// # Errors
///
/// Returns `JwtError::Expired` for expired tokens, `JwtError::InvalidIssuer`
/// when the issuer claim does not match, and `JwtError::ValidationError` for
/// every other failure (bad signature, malformed token, ...).
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("admin");

        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.role, "admin");
        assert!(!claims.is_expired());
        assert_eq!(claims.expires_in_seconds(), TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = Claims::new("admin");
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, "admin");
        assert_eq!(validated.iss, ISSUER);
        assert_eq!(validated.role, "admin");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new("admin");
        let token = create_token(&claims, SECRET).expect("Should create token");

        let result = validate_token(&token, "a-completely-different-secret-value");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_expiration("admin", Duration::seconds(-3600));

        assert!(claims.is_expired());
        assert_eq!(claims.expires_in_seconds(), 0);

        let token = create_token(&claims, SECRET).expect("Should create token");
        let result = validate_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_wrong_issuer() {
        // Forge a token with a different issuer but a valid signature
        let mut claims = Claims::new("admin");
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).expect("Should create token");

        let result = validate_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::InvalidIssuer)));
    }

    #[test]
    fn test_validate_garbage_token() {
        let result = validate_token("not.a.token", SECRET);
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }
}
