//! Password login.
//!
//! Unknown identifiers and wrong passwords produce the same 401, and both paths
//! run one Argon2 verification.

use axum::{
    extract::{rejection::FormRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Form,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    accounts::Identifier, error::AuthError, principal::Principal, session::issue_session,
    state::AuthState, types::LoginRequest,
};

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logged in; access and refresh cookies set", body = Principal),
        (status = 400, description = "Missing or malformed fields"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Storage failure")
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Form<LoginRequest>, FormRejection>,
) -> Response {
    match authenticate(&auth_state, payload).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn authenticate(
    auth_state: &AuthState,
    payload: Result<Form<LoginRequest>, FormRejection>,
) -> Result<Response, AuthError> {
    let Form(request) = payload.map_err(|err| AuthError::BadRequest(err.body_text()))?;
    if request.identifier.trim().is_empty() || request.password.is_empty() {
        return Err(AuthError::BadRequest(
            "Identifier and password are required".to_string(),
        ));
    }

    let identifier = Identifier::parse(&request.identifier);
    let record = auth_state
        .accounts()
        .find_login(&identifier)
        .await
        .map_err(AuthError::StoreUnavailable)?;

    let Some(record) = record else {
        auth_state.passwords().verify_dummy(request.password).await;
        return Err(AuthError::InvalidCredentials);
    };

    let matched = auth_state
        .passwords()
        .verify(request.password, record.password_hash)
        .await
        .map_err(AuthError::Internal)?;
    if !matched {
        return Err(AuthError::InvalidCredentials);
    }

    let principal = Principal::new(record.account_id, Some(record.username));
    let headers = issue_session(auth_state, &principal).await?;
    info!(user_id = principal.user_id, "Login succeeded");
    Ok((StatusCode::OK, headers, Json(principal)).into_response())
}
