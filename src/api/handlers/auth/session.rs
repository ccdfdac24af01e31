//! Session orchestration for cookie credentials.
//!
//! Flow Overview:
//! 1) A valid `access` cookie authenticates with no storage I/O.
//! 2) An expired `access` cookie (or none) falls back to the `refresh` cookie.
//! 3) A verified refresh token must still be registered; if it is, a new access
//!    token is minted and returned as a cookie. The refresh token is not rotated.
//! 4) A forged or corrupt access cookie is rejected outright, without refresh.
//!
//! Protected routes are wrapped with [`require_session`], which is the only
//! place a [`Principal`] is inserted into request extensions.

use anyhow::anyhow;
use axum::{
    extract::{Extension, Request, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{
    cookies::{access_cookie, append_clear_cookies, refresh_cookie, CredentialCookies},
    error::AuthError,
    principal::Principal,
    state::AuthState,
    token::TokenError,
    utils::generate_session_id,
};

/// Outcome of a successful session check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The access cookie was valid as presented.
    Access(Principal),
    /// The access cookie was missing or expired; a live refresh token minted a new one.
    Renewed {
        principal: Principal,
        access_token: String,
    },
}

impl Resolution {
    #[must_use]
    pub fn principal(&self) -> &Principal {
        match self {
            Self::Access(principal) | Self::Renewed { principal, .. } => principal,
        }
    }
}

/// Decide whether the presented cookies authenticate the request.
///
/// Performs at most one registry read and only on the refresh path.
///
/// # Errors
/// Returns the [`AuthError`] describing why the request is not authenticated.
pub async fn resolve_session(
    auth_state: &AuthState,
    cookies: &CredentialCookies,
) -> Result<Resolution, AuthError> {
    if let Some(access) = cookies.access.as_deref() {
        match auth_state.access_codec().verify(access) {
            Ok(verified) => return Ok(Resolution::Access(verified.principal)),
            Err(TokenError::Expired) => debug!("Access credential expired, trying refresh"),
            Err(err) => return Err(AuthError::InvalidAccess(err)),
        }
    }

    let Some(refresh) = cookies.refresh.as_deref() else {
        return Err(AuthError::MissingRefresh);
    };
    let verified = match auth_state.refresh_codec().verify(refresh) {
        Ok(verified) => verified,
        Err(TokenError::Expired) => return Err(AuthError::RefreshExpired),
        Err(err) => return Err(AuthError::InvalidRefresh(err)),
    };

    let live = auth_state
        .registry()
        .is_live(verified.principal.user_id, refresh)
        .await
        .map_err(AuthError::StoreUnavailable)?;
    if !live {
        warn!(
            user_id = verified.principal.user_id,
            "Refresh credential is not registered"
        );
        return Err(AuthError::NotRegistered);
    }

    let issued = auth_state
        .access_codec()
        .issue(&verified.principal, auth_state.access_ttl())
        .map_err(AuthError::Internal)?;
    debug!(
        user_id = verified.principal.user_id,
        "Renewed access credential"
    );
    Ok(Resolution::Renewed {
        principal: verified.principal,
        access_token: issued.token,
    })
}

/// Mint both credentials for `principal`, register the refresh token, and
/// return the `Set-Cookie` headers.
///
/// # Errors
/// Returns [`AuthError::StoreUnavailable`] if the refresh token cannot be
/// registered, or [`AuthError::Internal`] if signing or cookie encoding fails.
pub async fn issue_session(
    auth_state: &AuthState,
    principal: &Principal,
) -> Result<HeaderMap, AuthError> {
    let session_id = generate_session_id().map_err(AuthError::Internal)?;
    let access = auth_state
        .access_codec()
        .issue(principal, auth_state.access_ttl())
        .map_err(AuthError::Internal)?;
    let refresh = auth_state
        .refresh_codec()
        .issue_with_id(principal, auth_state.refresh_ttl(), &session_id)
        .map_err(AuthError::Internal)?;

    let config = auth_state.config();
    let access_value = access_cookie(&access.token, config.access_ttl_seconds())
        .map_err(|err| AuthError::Internal(anyhow!("failed to build access cookie: {err}")))?;
    let refresh_value = refresh_cookie(&refresh.token, config.refresh_ttl_seconds())
        .map_err(|err| AuthError::Internal(anyhow!("failed to build refresh cookie: {err}")))?;

    auth_state
        .registry()
        .register(principal.user_id, &refresh.token, refresh.expires_at)
        .await
        .map_err(AuthError::StoreUnavailable)?;

    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, access_value);
    headers.append(SET_COOKIE, refresh_value);
    Ok(headers)
}

/// Middleware guarding protected routes.
///
/// On success the request is forwarded with `Extension<Principal>`; a renewed
/// access token is appended to the downstream response as a cookie.
pub async fn require_session(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookies = CredentialCookies::from_headers(request.headers());
    let resolution = match resolve_session(&auth_state, &cookies).await {
        Ok(resolution) => resolution,
        Err(err) => return err.into_response(),
    };
    debug!(user_id = resolution.principal().user_id, "Session resolved");

    let (principal, renewed_cookie) = match resolution {
        Resolution::Access(principal) => (principal, None),
        Resolution::Renewed {
            principal,
            access_token,
        } => {
            let ttl_seconds = auth_state.config().access_ttl_seconds();
            match access_cookie(&access_token, ttl_seconds) {
                Ok(cookie) => (principal, Some(cookie)),
                Err(err) => {
                    return AuthError::Internal(anyhow!("failed to build access cookie: {err}"))
                        .into_response()
                }
            }
        }
    };

    request.extensions_mut().insert(principal);
    let mut response = next.run(request).await;
    if let Some(cookie) = renewed_cookie {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    response
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 204, description = "Credentials cleared")
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let cookies = CredentialCookies::from_headers(&headers);
    if let Some(token) = cookies.refresh.as_deref() {
        // Expired tokens still identify their row.
        match auth_state.refresh_codec().inspect(token) {
            Ok(verified) => {
                let user_id = verified.principal.user_id;
                match auth_state.registry().revoke(user_id, token).await {
                    Ok(()) => info!(user_id, "Revoked refresh credential"),
                    Err(err) => warn!(user_id, "Failed to revoke refresh credential: {err:#}"),
                }
            }
            Err(err) => debug!("Ignoring undecodable refresh cookie on logout: {err}"),
        }
    }

    // Always clear cookies, even if revocation failed.
    let mut response_headers = HeaderMap::new();
    append_clear_cookies(&mut response_headers);
    (StatusCode::NO_CONTENT, response_headers)
}
