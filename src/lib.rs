//! # Dualpass (Dual-Token Cookie Authentication)
//!
//! `dualpass` authenticates HTTP clients with two cookies:
//!
//! - **`access`**: a short-lived HS256 token carrying the principal and its expiry.
//!   It is trusted on signature and expiry alone, so the fast path never touches storage.
//! - **`refresh`**: a long-lived HS256 token signed with a *different* secret and also
//!   recorded in the revocation registry. It only mints new access tokens while its row
//!   is still present, which is what makes logout effective before the token expires.
//!
//! ## Request Flow
//!
//! Every protected route sits behind the session middleware. A valid access cookie
//! authenticates immediately. An expired one falls back to the refresh cookie, which is
//! checked against the registry and, if live, yields a fresh `access` cookie on the
//! response. A forged or corrupt access cookie is rejected without attempting a refresh.
//!
//! ## Storage
//!
//! Accounts and refresh-token rows live in Postgres (`sql/schema.sql`). Only a SHA-256
//! of each refresh token is stored.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
