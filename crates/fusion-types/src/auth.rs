//! Identity and authentication exchange types.
//!
//! The backend issues JWT access/refresh pairs. The access token's payload
//! carries `user_id`, `email` and `is_staff`; these decode straight into
//! [`Identity`], which is also the persisted "current user" snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend user primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The logged-in user as decoded from the access token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "user_id")]
    pub id: UserId,
    pub email: String,
    /// Staff users get the admin back-office.
    #[serde(rename = "is_staff", default)]
    pub is_privileged: bool,
}

/// Response of the password and third-party login endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Body of `POST /auth/token/refresh/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Response of the refresh endpoint.
///
/// The refresh token is only present when the backend rotates refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Password grant credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Third-party identity exchange: the provider's ID token, passed through opaquely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThirdPartyLogin {
    pub token: String,
}

/// Account registration form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub password2: String,
    pub first_name: String,
    pub last_name: String,
}

/// User record returned by registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_jwt_claims() {
        let claims = r#"{
            "token_type": "access",
            "exp": 1716900000,
            "iat": 1716896400,
            "jti": "abc",
            "user_id": 7,
            "email": "ada@example.com",
            "is_staff": true
        }"#;
        let identity: Identity = serde_json::from_str(claims).unwrap();
        assert_eq!(identity.id, UserId(7));
        assert_eq!(identity.email, "ada@example.com");
        assert!(identity.is_privileged);
    }

    #[test]
    fn test_identity_snapshot_uses_claim_names() {
        let identity = Identity {
            id: UserId(3),
            email: "bob@example.com".to_string(),
            is_privileged: false,
        };
        let json = serde_json::to_string(&identity).unwrap();
        assert!(json.contains("\"user_id\":3"));
        assert!(json.contains("\"is_staff\":false"));
    }

    #[test]
    fn test_refresh_response_without_rotation() {
        let resp: RefreshResponse = serde_json::from_str(r#"{"access":"a.b.c"}"#).unwrap();
        assert_eq!(resp.access, "a.b.c");
        assert!(resp.refresh.is_none());
    }
}
