//! Identity check for the current session.

use axum::{
    extract::Extension,
    response::{IntoResponse, Json},
};

use super::auth::principal::Principal;

#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses(
        (status = 200, description = "Authenticated principal; may set a renewed access cookie", body = Principal),
        (status = 401, description = "Missing, invalid or revoked credentials"),
        (status = 500, description = "Revocation registry unavailable")
    ),
    tag = "auth"
)]
pub async fn me(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(principal)
}
