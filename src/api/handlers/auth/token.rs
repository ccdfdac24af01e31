//! Credential codec: compact HS256 tokens carrying a principal and an expiry.
//!
//! Access and refresh credentials share this encoding but each gets its own
//! [`TokenCodec`] built from a different secret, so a token minted for one
//! purpose fails with [`TokenError::BadSignature`] under the other.
//!
//! Expiry is checked here against the injected [`Clock`] rather than by
//! `jsonwebtoken`, so `exp <= now` is expired with no leeway.

use anyhow::{Context, Result};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc, time::Duration};
use thiserror::Error;

use super::{clock::Clock, principal::Principal};

/// Why a presented token was not accepted. Callers branch on the kind.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Principal id, decimal.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: i64,
    /// Session id; only refresh credentials carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Decoded contents of a token whose signature checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub principal: Principal,
    pub expires_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("keys", &"***")
            .field("clock", &self.clock)
            .finish()
    }
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &SecretString, clock: Arc<dyn Clock>) -> Self {
        let secret = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            clock,
        }
    }

    /// Sign `principal` with an expiry of `now + ttl`.
    ///
    /// # Errors
    /// Returns an error if the ttl does not fit in seconds or signing fails.
    pub fn issue(&self, principal: &Principal, ttl: Duration) -> Result<IssuedToken> {
        self.sign(principal, ttl, None)
    }

    /// Like [`issue`](Self::issue), embedding a session id so concurrent sessions
    /// of one principal get distinct tokens.
    ///
    /// # Errors
    /// Returns an error if the ttl does not fit in seconds or signing fails.
    pub fn issue_with_id(
        &self,
        principal: &Principal,
        ttl: Duration,
        session_id: &str,
    ) -> Result<IssuedToken> {
        self.sign(principal, ttl, Some(session_id.to_string()))
    }

    /// Check signature and expiry.
    ///
    /// # Errors
    /// [`TokenError::Malformed`], [`TokenError::BadSignature`] or [`TokenError::Expired`].
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let verified = self.inspect(token)?;
        if verified.expires_at <= self.clock.now_unix() {
            return Err(TokenError::Expired);
        }
        Ok(verified)
    }

    /// Check signature and shape only; an expired token still decodes.
    ///
    /// # Errors
    /// [`TokenError::Malformed`] or [`TokenError::BadSignature`].
    pub fn inspect(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| classify(err.kind()))?;
        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Malformed)?;
        Ok(VerifiedToken {
            principal: Principal::new(user_id, data.claims.name),
            expires_at: data.claims.exp,
        })
    }

    fn sign(
        &self,
        principal: &Principal,
        ttl: Duration,
        session_id: Option<String>,
    ) -> Result<IssuedToken> {
        let ttl_seconds = i64::try_from(ttl.as_secs()).context("token ttl out of range")?;
        let expires_at = self.clock.now_unix().saturating_add(ttl_seconds);
        let claims = Claims {
            sub: principal.user_id.to_string(),
            name: principal.username.clone(),
            exp: expires_at,
            jti: session_id,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("failed to sign token")?;
        Ok(IssuedToken { token, expires_at })
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
        _ => TokenError::Malformed,
    }
}

/// Replace the first signature character, keeping the token well-formed.
#[cfg(test)]
pub(crate) fn tamper_signature(token: &str) -> String {
    let (signing_input, signature) = token.rsplit_once('.').unwrap_or((token, ""));
    let mut chars: Vec<char> = signature.chars().collect();
    if let Some(first) = chars.first_mut() {
        *first = if *first == 'A' { 'B' } else { 'A' };
    }
    format!("{signing_input}.{}", chars.into_iter().collect::<String>())
}
