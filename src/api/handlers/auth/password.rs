//! Argon2id password hashing and verification.
//!
//! Both operations are CPU-bound and run on the blocking pool. Verification
//! reads its cost parameters from the stored PHC string, so hashes created
//! with older parameters keep verifying after a parameter change.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::SaltString, Algorithm, Argon2, Params, PasswordHash, PasswordHasher,
    PasswordVerifier as _, Version,
};
use rand::rngs::OsRng;
use std::sync::{Arc, OnceLock};
use tracing::warn;

#[derive(Clone, Debug)]
pub struct PasswordVerifier {
    params: Params,
    dummy_hash: Arc<OnceLock<String>>,
}

impl Default for PasswordVerifier {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl PasswordVerifier {
    #[must_use]
    pub fn new(params: Params) -> Self {
        Self {
            params,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Hash a plaintext password into a PHC string.
    ///
    /// # Errors
    /// Returns an error if hashing fails or the blocking task panics.
    pub async fn hash(&self, password: String) -> Result<String> {
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || hash_with(&params, &password))
            .await
            .context("password hashing task failed")?
    }

    /// Constant-time comparison of `password` against a stored PHC hash.
    ///
    /// An unparseable stored hash is logged and treated as a mismatch.
    ///
    /// # Errors
    /// Returns an error only if the blocking task panics.
    pub async fn verify(&self, password: String, stored_hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || verify_blocking(&password, &stored_hash))
            .await
            .context("password verification task failed")
    }

    /// Burn the same work as a real verification when no account matched, so
    /// response timing does not tell unknown identifiers from wrong passwords.
    pub async fn verify_dummy(&self, password: String) {
        let params = self.params.clone();
        let dummy_hash = self.dummy_hash.clone();
        let result = tokio::task::spawn_blocking(move || {
            if dummy_hash.get().is_none() {
                let hash = hash_with(&params, "dualpass-dummy-password")?;
                let _ = dummy_hash.set(hash);
            }
            let hash = dummy_hash
                .get()
                .ok_or_else(|| anyhow!("dummy hash unavailable"))?;
            Ok::<bool, anyhow::Error>(verify_blocking(&password, hash))
        })
        .await;
        match result {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => warn!("Dummy password verification failed: {err}"),
            Err(err) => warn!("Dummy password verification task failed: {err}"),
        }
    }
}

fn hash_with(params: &Params, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone());
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?
        .to_string();
    Ok(hash)
}

fn verify_blocking(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("Stored password hash is not a valid PHC string: {err}");
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Cheap parameters so tests do not spend seconds per hash.
#[cfg(test)]
pub(crate) fn test_verifier() -> PasswordVerifier {
    #[allow(clippy::unwrap_used)]
    let params = Params::new(Params::MIN_M_COST, 1, 1, None).unwrap();
    PasswordVerifier::new(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() -> Result<()> {
        let verifier = test_verifier();
        let hash = verifier.hash("correct horse".to_string()).await?;
        assert!(hash.starts_with("$argon2id$"));
        assert!(verifier.verify("correct horse".to_string(), hash.clone()).await?);
        assert!(!verifier.verify("wrong horse".to_string(), hash).await?);
        Ok(())
    }

    #[tokio::test]
    async fn hashes_are_salted() -> Result<()> {
        let verifier = test_verifier();
        let first = verifier.hash("same".to_string()).await?;
        let second = verifier.hash("same".to_string()).await?;
        assert_ne!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_stored_hash_is_mismatch() -> Result<()> {
        let verifier = test_verifier();
        assert!(!verifier.verify("pw".to_string(), "plaintext".to_string()).await?);
        Ok(())
    }

    #[tokio::test]
    async fn verify_dummy_caches_hash() {
        let verifier = test_verifier();
        verifier.verify_dummy("anything".to_string()).await;
        assert!(verifier.dummy_hash.get().is_some());
    }
}
