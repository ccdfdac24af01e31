//! Auth configuration and shared state.

use anyhow::{bail, Result};
use argon2::Params;
use secrecy::{ExposeSecret, SecretString};
use std::{sync::Arc, time::Duration};

use super::{
    accounts::AccountStore, clock::Clock, password::PasswordVerifier,
    registry::RevocationRegistry, token::TokenCodec,
};

const DEFAULT_ACCESS_TTL_SECONDS: u64 = 5 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: u64 = 24 * 60 * 60;
const DEFAULT_FRONTEND_BASE_URL: &str = "http://localhost:5173";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    access_secret: SecretString,
    refresh_secret: SecretString,
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
    frontend_base_url: String,
    password_params: Params,
}

impl AuthConfig {
    #[must_use]
    pub fn new(access_secret: SecretString, refresh_secret: SecretString) -> Self {
        Self {
            access_secret,
            refresh_secret,
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
            frontend_base_url: DEFAULT_FRONTEND_BASE_URL.to_string(),
            password_params: Params::default(),
        }
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: u64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: u64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_frontend_base_url(mut self, url: String) -> Self {
        self.frontend_base_url = url;
        self
    }

    #[must_use]
    pub fn with_password_params(mut self, params: Params) -> Self {
        self.password_params = params;
        self
    }

    #[must_use]
    pub fn access_ttl_seconds(&self) -> u64 {
        self.access_ttl_seconds
    }

    #[must_use]
    pub fn refresh_ttl_seconds(&self) -> u64 {
        self.refresh_ttl_seconds
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }
}

pub struct AuthState {
    config: AuthConfig,
    access: TokenCodec,
    refresh: TokenCodec,
    registry: Arc<dyn RevocationRegistry>,
    accounts: Arc<dyn AccountStore>,
    passwords: PasswordVerifier,
}

impl AuthState {
    /// Build the shared auth state.
    ///
    /// # Errors
    /// Returns an error when a secret is empty, when both secrets are equal, or
    /// when a TTL is zero.
    pub fn new(
        config: AuthConfig,
        registry: Arc<dyn RevocationRegistry>,
        accounts: Arc<dyn AccountStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let access_secret = config.access_secret.expose_secret();
        let refresh_secret = config.refresh_secret.expose_secret();
        if access_secret.is_empty() || refresh_secret.is_empty() {
            bail!("access and refresh secrets must not be empty");
        }
        if access_secret == refresh_secret {
            bail!("access and refresh secrets must differ");
        }
        if config.access_ttl_seconds == 0 || config.refresh_ttl_seconds == 0 {
            bail!("credential TTLs must be positive");
        }

        let access = TokenCodec::new(&config.access_secret, clock.clone());
        let refresh = TokenCodec::new(&config.refresh_secret, clock);
        let passwords = PasswordVerifier::new(config.password_params.clone());
        Ok(Self {
            config,
            access,
            refresh,
            registry,
            accounts,
            passwords,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn access_codec(&self) -> &TokenCodec {
        &self.access
    }

    pub(crate) fn refresh_codec(&self) -> &TokenCodec {
        &self.refresh
    }

    pub(crate) fn registry(&self) -> &dyn RevocationRegistry {
        self.registry.as_ref()
    }

    pub(crate) fn accounts(&self) -> &dyn AccountStore {
        self.accounts.as_ref()
    }

    pub(crate) fn passwords(&self) -> &PasswordVerifier {
        &self.passwords
    }

    pub(crate) fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.config.access_ttl_seconds)
    }

    pub(crate) fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.config.refresh_ttl_seconds)
    }
}
