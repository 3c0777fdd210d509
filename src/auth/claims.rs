//! Session token claims and the authenticated user projection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::error::VerifyError;

/// Decoded token payload. Kept untyped so shape checks happen after the
/// signature and expiry checks, in that order.
pub(super) type Claims = Map<String, Value>;

/// Verified caller identity for the duration of one request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    /// Role as embedded in the token. Informational only; authorization
    /// always re-reads the role from the user store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl AuthUser {
    /// Project verified claims into a user, rejecting payloads whose `id` is
    /// not an integer or whose `username` is not a string.
    pub(super) fn from_claims(claims: &Claims) -> Result<Self, VerifyError> {
        let id = claims
            .get("id")
            .and_then(Value::as_i64)
            .ok_or(VerifyError::MalformedClaim("id"))?;
        let username = claims
            .get("username")
            .and_then(Value::as_str)
            .ok_or(VerifyError::MalformedClaim("username"))?;
        let role = claims
            .get("role")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            id,
            username: username.to_string(),
            role,
        })
    }
}

/// `exp` as epoch seconds, if present and numeric.
pub(super) fn expires_at(claims: &Claims) -> Option<f64> {
    claims.get("exp").and_then(Value::as_f64)
}

/// `nbf` as epoch seconds, if present and numeric.
pub(super) fn not_before(claims: &Claims) -> Option<f64> {
    claims.get("nbf").and_then(Value::as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn from_claims_keeps_role_when_present() {
        let user = AuthUser::from_claims(&claims(json!({
            "id": 7,
            "username": "alice",
            "role": "admin",
        })));
        assert!(matches!(
            user,
            Ok(AuthUser { id: 7, ref username, role: Some(ref role) })
                if username == "alice" && role == "admin"
        ));
    }

    #[test]
    fn from_claims_allows_missing_role() {
        let user = AuthUser::from_claims(&claims(json!({"id": 7, "username": "alice"})));
        assert!(matches!(user, Ok(AuthUser { role: None, .. })));
    }

    #[test]
    fn from_claims_rejects_non_numeric_id() {
        let user = AuthUser::from_claims(&claims(json!({"id": "7", "username": "alice"})));
        assert!(matches!(user, Err(VerifyError::MalformedClaim("id"))));
    }

    #[test]
    fn from_claims_rejects_fractional_id() {
        let user = AuthUser::from_claims(&claims(json!({"id": 7.5, "username": "alice"})));
        assert!(matches!(user, Err(VerifyError::MalformedClaim("id"))));
    }

    #[test]
    fn from_claims_rejects_non_string_username() {
        let user = AuthUser::from_claims(&claims(json!({"id": 7, "username": 42})));
        assert!(matches!(user, Err(VerifyError::MalformedClaim("username"))));

        let user = AuthUser::from_claims(&claims(json!({"id": 7})));
        assert!(matches!(user, Err(VerifyError::MalformedClaim("username"))));
    }

    #[test]
    fn expires_at_reads_numeric_exp_only() {
        assert_eq!(expires_at(&claims(json!({"exp": 1_700_000_000}))), Some(1.7e9));
        assert_eq!(expires_at(&claims(json!({"exp": "soon"}))), None);
        assert_eq!(expires_at(&claims(json!({}))), None);
    }

    #[test]
    fn auth_user_serializes_without_absent_role() {
        let user = AuthUser {
            id: 7,
            username: "alice".to_string(),
            role: None,
        };
        let value = serde_json::to_value(&user).ok();
        assert_eq!(value, Some(json!({"id": 7, "username": "alice"})));
    }
}
