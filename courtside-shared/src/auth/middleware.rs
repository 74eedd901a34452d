/// Request authentication context for Axum handlers
///
/// The API's JWT layer validates the bearer token and inserts an
/// [`AuthContext`] into request extensions; handlers extract it with
/// `Extension(auth)`. Admin-only route groups additionally call
/// [`AuthContext::require_admin`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::jwt::Claims;
use crate::models::user::UserRole;

/// Authentication context attached to authenticated requests
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user id
    pub user_id: ObjectId,

    /// Role carried by the token
    pub role: UserRole,
}

impl AuthContext {
    /// Builds a context from validated access-token claims
    pub fn from_claims(claims: &Claims) -> Result<Self, AuthError> {
        let user_id = claims
            .user_id()
            .map_err(|_| AuthError::InvalidToken("Invalid subject claim".to_string()))?;

        Ok(Self {
            user_id,
            role: claims.role,
        })
    }

    /// Whether the caller holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Errors unless the caller holds the admin role
    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

/// Error type for request authentication
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Malformed authorization header
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// Authenticated but not allowed
    Forbidden,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg),
            AuthError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Admin access required".to_string(),
            ),
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("error"),
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{Claims, TokenType};

    #[test]
    fn test_context_from_claims() {
        let user_id = ObjectId::new();
        let claims = Claims::new(user_id, UserRole::Admin, TokenType::Access);

        let ctx = AuthContext::from_claims(&claims).unwrap();
        assert_eq!(ctx.user_id, user_id);
        assert!(ctx.is_admin());
        assert!(ctx.require_admin().is_ok());
    }

    #[test]
    fn test_customer_is_not_admin() {
        let claims = Claims::new(ObjectId::new(), UserRole::Customer, TokenType::Access);
        let ctx = AuthContext::from_claims(&claims).unwrap();

        assert!(!ctx.is_admin());
        assert!(matches!(ctx.require_admin(), Err(AuthError::Forbidden)));
    }
}
