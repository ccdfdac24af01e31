use crate::{
    api::{self, handlers::auth::AuthConfig, ServerConfig},
    cli::telemetry,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub db_max_connections: u32,
    pub access_secret: SecretString,
    pub refresh_secret: SecretString,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
    pub frontend_base_url: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the DSN is invalid, the database is unreachable, the
/// secrets are rejected, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let dsn = Url::parse(&args.dsn).context("Invalid database DSN")?;
    debug!(
        host = dsn.host_str().unwrap_or(""),
        database = dsn.path().trim_start_matches('/'),
        "Connecting to database"
    );

    let auth_config = AuthConfig::new(args.access_secret, args.refresh_secret)
        .with_access_ttl_seconds(args.access_ttl_seconds)
        .with_refresh_ttl_seconds(args.refresh_ttl_seconds)
        .with_frontend_base_url(args.frontend_base_url);

    let server = ServerConfig {
        port: args.port,
        dsn: dsn.to_string(),
        db_max_connections: args.db_max_connections,
    };

    let result = api::new(server, auth_config).await;
    telemetry::shutdown_tracer();
    result
}
