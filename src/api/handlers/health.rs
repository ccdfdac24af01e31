use crate::GIT_COMMIT_HASH;
use axum::{
    extract::Extension,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use sqlx::{Connection, PgPool};
use tracing::{debug, error, info_span, Instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Database is healthy", body = Health),
        (status = 503, description = "Database is unhealthy", body = Health)
    ),
    tag= "health"
)]
// axum handler for health
pub async fn health(pool: Extension<PgPool>) -> impl IntoResponse {
    let acquire_span = info_span!(
        "db.acquire",
        db.system = "postgresql",
        db.operation = "ACQUIRE"
    );
    let result = match pool.0.acquire().instrument(acquire_span).await {
        Ok(mut conn) => {
            let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
            conn.ping().instrument(ping_span).await.map_err(|error| {
                error!("Failed to ping database: {}", error);
            })
        }
        Err(error) => {
            error!("Failed to acquire database connection: {}", error);
            Err(())
        }
    };

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if result.is_ok() { "ok" } else { "error" }.to_string(),
    };

    let mut headers = HeaderMap::new();
    match x_app_header(&health) {
        Ok(value) => {
            headers.insert("X-App", value);
        }
        Err(err) => error!("Failed to build X-App header: {err}"),
    }

    if result.is_ok() {
        debug!("Database connection is healthy");
        (StatusCode::OK, headers, Json(health))
    } else {
        debug!("Database connection is unhealthy");
        (StatusCode::SERVICE_UNAVAILABLE, headers, Json(health))
    }
}

fn x_app_header(health: &Health) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    let short_hash = if health.commit.len() > 7 {
        &health.commit[0..7]
    } else {
        ""
    };
    HeaderValue::from_str(&format!(
        "{}:{}:{}",
        health.name, health.version, short_hash
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_app_header_uses_short_hash() -> anyhow::Result<()> {
        let health = Health {
            commit: "0123456789abcdef".to_string(),
            name: "dualpass".to_string(),
            version: "0.1.0".to_string(),
            database: "ok".to_string(),
        };
        assert_eq!(x_app_header(&health)?.to_str()?, "dualpass:0.1.0:0123456");
        Ok(())
    }

    #[test]
    fn x_app_header_tolerates_unknown_commit() -> anyhow::Result<()> {
        let health = Health {
            commit: "unknown".to_string(),
            name: "dualpass".to_string(),
            version: "0.1.0".to_string(),
            database: "ok".to_string(),
        };
        assert_eq!(x_app_header(&health)?.to_str()?, "dualpass:0.1.0:");
        Ok(())
    }
}
