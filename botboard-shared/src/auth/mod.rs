/// Authentication for the admin dashboard
///
/// The dashboard has exactly one account: the admin configured through the
/// environment. Login checks the configured username and Argon2 hash, then
/// issues an 8-hour JWT that every other endpoint requires as a bearer token.
///
/// # Modules
///
/// - `jwt`: Token creation and validation (HS256)
/// - `password`: Argon2id hashing and verification

pub mod jwt;
pub mod password;

use serde::{Deserialize, Serialize};

/// Identity of the authenticated admin, injected into request extensions by
/// the bearer-token middleware after a token validates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminContext {
    /// Username the token was issued to
    pub username: String,

    /// Role claim carried by the token (always "admin" today)
    pub role: String,
}

impl AdminContext {
    /// Builds the context from validated JWT claims
    pub fn from_claims(claims: &jwt::Claims) -> Self {
        Self {
            username: claims.sub.clone(),
            role: claims.role.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_claims() {
        let claims = jwt::Claims::new("admin");
        let ctx = AdminContext::from_claims(&claims);
        assert_eq!(ctx.username, "admin");
        assert_eq!(ctx.role, "admin");
    }
}
