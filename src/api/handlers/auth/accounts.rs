//! Account lookups used by login and registration.
//!
//! Login needs the stored password hash for an identifier; signup needs to
//! insert a row and learn whether the email or username was taken.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tokio::sync::Mutex;
use tracing::Instrument;

use super::utils::{is_unique_violation, normalize_email, valid_email};

/// Login identifier: an email when it looks like one, a username otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identifier {
    Email(String),
    Username(String),
}

impl Identifier {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let email = normalize_email(trimmed);
        if valid_email(&email) {
            Self::Email(email)
        } else {
            Self::Username(trimmed.to_string())
        }
    }
}

/// Minimal fields needed to check a password and build a principal.
#[derive(Clone, Debug)]
pub struct LoginRecord {
    pub account_id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(i64),
    Conflict,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_login(&self, identifier: &Identifier) -> Result<Option<LoginRecord>>;

    async fn create(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<CreateOutcome>;
}

#[derive(Clone, Debug)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_login(&self, identifier: &Identifier) -> Result<Option<LoginRecord>> {
        let (query, value) = match identifier {
            Identifier::Email(email) => (
                "SELECT id, username, password_hash FROM accounts WHERE email = $1",
                email,
            ),
            Identifier::Username(username) => (
                "SELECT id, username, password_hash FROM accounts WHERE username = $1",
                username,
            ),
        };
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(value)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup login record")?;

        Ok(row.map(|row| LoginRecord {
            account_id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
        }))
    }

    async fn create(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<CreateOutcome> {
        let query = r"
            INSERT INTO accounts (email, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(CreateOutcome::Created(row.get("id"))),
            Err(err) if is_unique_violation(&err) => Ok(CreateOutcome::Conflict),
            Err(err) => Err(err).context("failed to insert account"),
        }
    }
}

#[derive(Debug)]
struct MemoryAccount {
    id: i64,
    email: String,
    username: String,
    password_hash: String,
}

/// Process-local account store for tests and development.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<Vec<MemoryAccount>>,
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_login(&self, identifier: &Identifier) -> Result<Option<LoginRecord>> {
        let accounts = self.accounts.lock().await;
        let found = accounts.iter().find(|account| match identifier {
            Identifier::Email(email) => account.email == *email,
            Identifier::Username(username) => account.username == *username,
        });
        Ok(found.map(|account| LoginRecord {
            account_id: account.id,
            username: account.username.clone(),
            password_hash: account.password_hash.clone(),
        }))
    }

    async fn create(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<CreateOutcome> {
        let mut accounts = self.accounts.lock().await;
        if accounts
            .iter()
            .any(|account| account.email == email || account.username == username)
        {
            return Ok(CreateOutcome::Conflict);
        }
        let id = accounts.last().map_or(1, |account| account.id + 1);
        accounts.push(MemoryAccount {
            id,
            email: email.to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        });
        Ok(CreateOutcome::Created(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_detects_email() {
        assert_eq!(
            Identifier::parse(" Alice@Example.com "),
            Identifier::Email("alice@example.com".to_string())
        );
        assert_eq!(
            Identifier::parse("alice"),
            Identifier::Username("alice".to_string())
        );
        assert_eq!(
            Identifier::parse("not@an-email"),
            Identifier::Username("not@an-email".to_string())
        );
    }

    #[tokio::test]
    async fn memory_store_creates_and_finds() -> Result<()> {
        let store = MemoryAccountStore::new();
        let outcome = store.create("a@example.com", "alice", "hash").await?;
        assert_eq!(outcome, CreateOutcome::Created(1));

        let by_email = store
            .find_login(&Identifier::Email("a@example.com".to_string()))
            .await?
            .context("missing account by email")?;
        assert_eq!(by_email.account_id, 1);
        assert_eq!(by_email.username, "alice");

        let by_username = store
            .find_login(&Identifier::Username("alice".to_string()))
            .await?;
        assert!(by_username.is_some());

        let missing = store
            .find_login(&Identifier::Username("bob".to_string()))
            .await?;
        assert!(missing.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn memory_store_rejects_duplicates() -> Result<()> {
        let store = MemoryAccountStore::new();
        store.create("a@example.com", "alice", "hash").await?;
        assert_eq!(
            store.create("a@example.com", "other", "hash").await?,
            CreateOutcome::Conflict
        );
        assert_eq!(
            store.create("b@example.com", "alice", "hash").await?,
            CreateOutcome::Conflict
        );
        assert_eq!(
            store.create("b@example.com", "bob", "hash").await?,
            CreateOutcome::Created(2)
        );
        Ok(())
    }
}
