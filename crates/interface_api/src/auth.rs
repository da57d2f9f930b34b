//! Authentication and authorization
//!
//! The bearer token's `sub` is the actor recorded in reclamation history.
//! Roles carry permission names directly; `admin` grants everything.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User's roles
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    /// Name recorded as the author of lifecycle changes
    pub fn actor(&self) -> &str {
        &self.sub
    }

    /// Fails with `MissingPermission` unless a role grants `permission`
    pub fn require(&self, permission: &str) -> Result<(), AuthError> {
        if has_role(self, permission) {
            Ok(())
        } else {
            Err(AuthError::MissingPermission(permission.to_string()))
        }
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing permission: {0}")]
    MissingPermission(String),
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `user_id` - User identifier, becomes the actor
/// * `roles` - User's roles
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    user_id: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(AuthError::InvalidToken);
    }

    Ok(token_data.claims)
}

/// Checks if user has required role
pub fn has_role(claims: &Claims, required_role: &str) -> bool {
    claims.roles.iter().any(|r| r == required_role || r == "admin")
}

/// Permission definitions
pub mod permissions {
    pub const RECLAMATION_READ: &str = "reclamation:read";
    pub const RECLAMATION_WRITE: &str = "reclamation:write";
    pub const RECLAMATION_DELETE: &str = "reclamation:delete";
    pub const DASHBOARD_READ: &str = "dashboard:read";
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip() {
        let roles = vec![permissions::RECLAMATION_READ.into()];
        let token = create_token("tech-42", roles, SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();

        assert_eq!(claims.actor(), "tech-42");
        assert!(claims.require(permissions::RECLAMATION_READ).is_ok());
        assert!(matches!(
            claims.require(permissions::RECLAMATION_WRITE),
            Err(AuthError::MissingPermission(_))
        ));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = create_token("tech-42", vec![], SECRET, 60).unwrap();
        assert!(matches!(validate_token(&token, "other"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token() {
        let claims = Claims {
            sub: "tech-42".into(),
            roles: vec![],
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
            iat: (Utc::now() - Duration::hours(3)).timestamp(),
        };
        let key = EncodingKey::from_secret(SECRET.as_bytes());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert!(matches!(validate_token(&token, SECRET), Err(AuthError::TokenExpired)));
    }

    proptest::proptest! {
        #[test]
        fn prop_subject_survives_round_trip(sub in "[a-z][a-z0-9._-]{0,30}") {
            let token = create_token(&sub, vec![], SECRET, 60).unwrap();
            let claims = validate_token(&token, SECRET).unwrap();
            proptest::prop_assert_eq!(claims.actor(), sub.as_str());
        }
    }

    #[test]
    fn test_admin_has_every_permission() {
        let token = create_token("root", vec!["admin".into()], SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();
        assert!(claims.require(permissions::DASHBOARD_READ).is_ok());
        assert!(claims.require(permissions::RECLAMATION_DELETE).is_ok());
    }
}
