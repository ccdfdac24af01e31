//! Account registration. A successful signup is logged in immediately.

use axum::{
    extract::{rejection::FormRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Form,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    accounts::CreateOutcome,
    error::AuthError,
    principal::Principal,
    session::issue_session,
    state::AuthState,
    types::RegisterRequest,
    utils::{normalize_email, valid_email},
};

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body(content = RegisterRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Account created; access and refresh cookies set", body = Principal),
        (status = 400, description = "Missing fields or invalid email"),
        (status = 409, description = "Email or username already taken"),
        (status = 500, description = "Storage failure")
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Form<RegisterRequest>, FormRejection>,
) -> Response {
    match create_account(&auth_state, payload).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn create_account(
    auth_state: &AuthState,
    payload: Result<Form<RegisterRequest>, FormRejection>,
) -> Result<Response, AuthError> {
    let Form(request) = payload.map_err(|err| AuthError::BadRequest(err.body_text()))?;
    let email = normalize_email(&request.email);
    let username = request.username.trim().to_string();
    if email.is_empty() || username.is_empty() || request.password.is_empty() {
        return Err(AuthError::BadRequest(
            "Email, username and password are required".to_string(),
        ));
    }
    if !valid_email(&email) {
        return Err(AuthError::BadRequest("Invalid email".to_string()));
    }
    // Usernames that parse as emails would be unreachable at login.
    if valid_email(&normalize_email(&username)) {
        return Err(AuthError::BadRequest(
            "Username must not be an email address".to_string(),
        ));
    }

    let password_hash = auth_state
        .passwords()
        .hash(request.password)
        .await
        .map_err(AuthError::Internal)?;

    let outcome = auth_state
        .accounts()
        .create(&email, &username, &password_hash)
        .await
        .map_err(AuthError::StoreUnavailable)?;
    let account_id = match outcome {
        CreateOutcome::Created(account_id) => account_id,
        CreateOutcome::Conflict => return Err(AuthError::Conflict),
    };

    let principal = Principal::new(account_id, Some(username));
    let headers = issue_session(auth_state, &principal).await?;
    info!(user_id = principal.user_id, "Account registered");
    Ok((StatusCode::OK, headers, Json(principal)).into_response())
}
