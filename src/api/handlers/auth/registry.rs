//! Revocation registry: the server-side record of live refresh tokens.
//!
//! A refresh token only mints access tokens while a row for
//! `(principal, token)` exists here. Rows are keyed by a SHA-256 of the token,
//! never the raw value. One principal may hold any number of rows (one per
//! device); nothing is unique per principal.
//!
//! Expired rows are inert and stay until an external cleanup removes them.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::Instrument;

#[async_trait]
pub trait RevocationRegistry: Send + Sync {
    /// Record a newly issued refresh token.
    async fn register(&self, principal_id: i64, token: &str, expires_at_unix: i64) -> Result<()>;

    /// True when `(principal_id, token)` was registered and not revoked.
    async fn is_live(&self, principal_id: i64, token: &str) -> Result<bool>;

    /// Remove `(principal_id, token)`. Revoking an absent row is not an error.
    async fn revoke(&self, principal_id: i64, token: &str) -> Result<()>;
}

/// Hash a refresh token so raw values never touch storage.
pub(crate) fn hash_refresh_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Registry backed by the `refresh_tokens` table.
#[derive(Clone, Debug)]
pub struct PgRevocationRegistry {
    pool: PgPool,
}

impl PgRevocationRegistry {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationRegistry for PgRevocationRegistry {
    async fn register(&self, principal_id: i64, token: &str, expires_at_unix: i64) -> Result<()> {
        let query = r"
            INSERT INTO refresh_tokens (account_id, token_hash, expires_at)
            VALUES ($1, $2, TO_TIMESTAMP($3::BIGINT))
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(principal_id)
            .bind(hash_refresh_token(token))
            .bind(expires_at_unix)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert refresh token")?;
        Ok(())
    }

    async fn is_live(&self, principal_id: i64, token: &str) -> Result<bool> {
        let query = r"
            SELECT 1
            FROM refresh_tokens
            WHERE account_id = $1
              AND token_hash = $2
            LIMIT 1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(principal_id)
            .bind(hash_refresh_token(token))
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup refresh token")?;
        Ok(row.is_some())
    }

    async fn revoke(&self, principal_id: i64, token: &str) -> Result<()> {
        let query = "DELETE FROM refresh_tokens WHERE account_id = $1 AND token_hash = $2";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(principal_id)
            .bind(hash_refresh_token(token))
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete refresh token")?;
        Ok(())
    }
}

/// Process-local registry for tests and single-node development.
#[derive(Debug, Default)]
pub struct MemoryRevocationRegistry {
    rows: RwLock<HashMap<i64, HashSet<Vec<u8>>>>,
}

impl MemoryRevocationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live rows for a principal.
    pub async fn count(&self, principal_id: i64) -> usize {
        self.rows
            .read()
            .await
            .get(&principal_id)
            .map_or(0, HashSet::len)
    }
}

#[async_trait]
impl RevocationRegistry for MemoryRevocationRegistry {
    async fn register(&self, principal_id: i64, token: &str, _expires_at_unix: i64) -> Result<()> {
        self.rows
            .write()
            .await
            .entry(principal_id)
            .or_default()
            .insert(hash_refresh_token(token));
        Ok(())
    }

    async fn is_live(&self, principal_id: i64, token: &str) -> Result<bool> {
        Ok(self
            .rows
            .read()
            .await
            .get(&principal_id)
            .is_some_and(|tokens| tokens.contains(&hash_refresh_token(token))))
    }

    async fn revoke(&self, principal_id: i64, token: &str) -> Result<()> {
        let mut rows = self.rows.write().await;
        if let Some(tokens) = rows.get_mut(&principal_id) {
            tokens.remove(&hash_refresh_token(token));
            if tokens.is_empty() {
                rows.remove(&principal_id);
            }
        }
        Ok(())
    }
}
