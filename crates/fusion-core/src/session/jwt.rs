//! Access token payload decoding.
//!
//! The payload segment is decoded and parsed without verifying the signature;
//! the backend is the authority on token validity.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use fusion_types::auth::Identity;
use fusion_types::error::SessionError;

/// Decode the identity claims from a JWT access token.
pub fn decode_identity(token: &str) -> Result<Identity, SessionError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) if !payload.is_empty() => payload,
        _ => {
            return Err(SessionError::InvalidToken(
                "expected three dot-separated segments".to_string(),
            ));
        }
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| SessionError::InvalidToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice::<Identity>(&bytes)
        .map_err(|e| SessionError::InvalidToken(format!("payload claims: {e}")))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use fusion_types::auth::UserId;

    /// Build an unsigned token carrying the given claims.
    pub(crate) fn token_for(user_id: i64, email: &str, is_staff: bool) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let claims = serde_json::json!({
            "token_type": "access",
            "exp": 1_900_000_000_u64,
            "user_id": user_id,
            "email": email,
            "is_staff": is_staff,
        });
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.signature")
    }

    #[test]
    fn decodes_claims() {
        let token = token_for(7, "ada@example.com", true);
        let identity = decode_identity(&token).unwrap();
        assert_eq!(identity.id, UserId(7));
        assert_eq!(identity.email, "ada@example.com");
        assert!(identity.is_privileged);
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert!(matches!(
            decode_identity("only.two"),
            Err(SessionError::InvalidToken(_))
        ));
        assert!(decode_identity("").is_err());
    }

    #[test]
    fn rejects_non_json_payload() {
        let payload = URL_SAFE_NO_PAD.encode("not json");
        let token = format!("h.{payload}.s");
        assert!(decode_identity(&token).is_err());
    }

    #[test]
    fn tolerates_padded_payload() {
        let token = token_for(1, "a@b.c", false);
        let mut parts: Vec<&str> = token.split('.').collect();
        let padded = format!("{}==", parts[1]);
        parts[1] = &padded;
        let identity = decode_identity(&parts.join(".")).unwrap();
        assert_eq!(identity.email, "a@b.c");
    }
}
