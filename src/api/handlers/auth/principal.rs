//! Authenticated principal carried inside credentials and handed to handlers.
//!
//! The session middleware is the only place that inserts a [`Principal`] into
//! request extensions, so `Extension<Principal>` in a handler signature means
//! the request already passed the access/refresh checks.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity resolved from a verified credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    pub user_id: i64,
    pub username: Option<String>,
}

impl Principal {
    #[must_use]
    pub fn new(user_id: i64, username: Option<String>) -> Self {
        Self { user_id, username }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn principal_serializes_user_id_and_username() -> Result<()> {
        let principal = Principal::new(7, Some("alice".to_string()));
        let value = serde_json::to_value(&principal)?;
        assert_eq!(value, serde_json::json!({"user_id": 7, "username": "alice"}));
        Ok(())
    }

    #[test]
    fn principal_without_username_serializes_null() -> Result<()> {
        let value = serde_json::to_value(Principal::new(3, None))?;
        assert_eq!(value, serde_json::json!({"user_id": 3, "username": null}));
        Ok(())
    }
}
