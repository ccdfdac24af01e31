//! Request types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Form body for `POST /v1/auth/login`.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    /// Username or email.
    #[serde(alias = "emailorusername")]
    pub identifier: String,
    pub password: String,
}

/// Form body for `POST /v1/auth/register`.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn login_request_accepts_legacy_field_name() -> Result<()> {
        let request: LoginRequest =
            serde_json::from_value(serde_json::json!({"emailorusername": "alice", "password": "pw"}))?;
        assert_eq!(request.identifier, "alice");
        assert_eq!(request.password, "pw");
        Ok(())
    }

    #[test]
    fn register_request_requires_all_fields() {
        let parsed: Result<RegisterRequest, _> =
            serde_json::from_value(serde_json::json!({"email": "a@example.com"}));
        assert!(parsed.is_err());
    }
}
