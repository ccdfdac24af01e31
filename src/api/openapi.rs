use super::handlers::{
    auth::{login, principal, register, session, types},
    health, me,
};
use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        login::login,
        register::register,
        session::logout,
        me::me,
    ),
    components(
        schemas(
            health::Health,
            principal::Principal,
            types::LoginRequest,
            types::RegisterRequest
        )
    ),
    tags(
        (name = "dualpass", description = "Dual-token cookie authentication"),
        (name = "auth", description = "Login, registration, logout and identity"),
        (name = "health", description = "Service health"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

// axum handler for /openapi.json
pub async fn openapi_json() -> impl IntoResponse {
    Json(openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let doc = openapi();
        assert_eq!(doc.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(doc.info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn openapi_tags_and_paths() {
        let doc = openapi();
        let tags = doc.tags.clone().unwrap_or_default();
        assert!(tags.iter().any(|tag| tag.name == "auth"));
        for path in [
            "/health",
            "/v1/auth/login",
            "/v1/auth/register",
            "/v1/auth/logout",
            "/v1/auth/me",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
