//! Authentication failures and how they render as HTTP responses.

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use super::{cookies::append_clear_cookies, token::TokenError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid access credential: {0}")]
    InvalidAccess(TokenError),
    #[error("missing refresh credential")]
    MissingRefresh,
    #[error("refresh credential expired")]
    RefreshExpired,
    #[error("invalid refresh credential: {0}")]
    InvalidRefresh(TokenError),
    #[error("refresh credential is not registered")]
    NotRegistered,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    BadRequest(String),
    #[error("account already exists")]
    Conflict,
    #[error("credential store unavailable: {0:#}")]
    StoreUnavailable(anyhow::Error),
    #[error("internal error: {0:#}")]
    Internal(anyhow::Error),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidAccess(_)
            | Self::MissingRefresh
            | Self::RefreshExpired
            | Self::InvalidRefresh(_)
            | Self::NotRegistered
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::StoreUnavailable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the response should expire both credential cookies.
    #[must_use]
    pub fn clears_cookies(&self) -> bool {
        matches!(
            self,
            Self::MissingRefresh | Self::RefreshExpired | Self::NotRegistered
        )
    }

    fn public_message(&self) -> String {
        match self {
            Self::InvalidAccess(_)
            | Self::MissingRefresh
            | Self::RefreshExpired
            | Self::InvalidRefresh(_)
            | Self::NotRegistered => "Authentication required".to_string(),
            Self::InvalidCredentials => "Invalid credentials".to_string(),
            Self::BadRequest(message) => message.clone(),
            Self::Conflict => "Account already exists".to_string(),
            Self::StoreUnavailable(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {self}");
        } else {
            debug!("Request rejected: {self}");
        }

        let mut headers = HeaderMap::new();
        if self.clears_cookies() {
            append_clear_cookies(&mut headers);
        }
        let body = Json(json!({ "error": self.public_message() }));
        (status, headers, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use axum::http::header::SET_COOKIE;

    #[test]
    fn statuses() {
        assert_eq!(
            AuthError::InvalidAccess(TokenError::BadSignature).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::NotRegistered.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::BadRequest("nope".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::StoreUnavailable(anyhow!("down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn only_refresh_failures_clear_cookies() {
        assert!(AuthError::MissingRefresh.clears_cookies());
        assert!(AuthError::RefreshExpired.clears_cookies());
        assert!(AuthError::NotRegistered.clears_cookies());
        assert!(!AuthError::InvalidAccess(TokenError::Malformed).clears_cookies());
        assert!(!AuthError::InvalidRefresh(TokenError::BadSignature).clears_cookies());
        assert!(!AuthError::StoreUnavailable(anyhow!("down")).clears_cookies());
    }

    #[test]
    fn response_carries_clear_cookies() {
        let response = AuthError::NotRegistered.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 2);

        let response = AuthError::StoreUnavailable(anyhow!("down")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 0);
    }
}
