//! Auth handlers and supporting modules.
//!
//! Two cookies carry the session: a short-lived `access` token checked on
//! signature and expiry alone, and a long-lived `refresh` token that is also
//! recorded in the [`RevocationRegistry`]. Each is signed with its own secret.
//!
//! ## Renewal
//!
//! When the access token has expired, [`session::require_session`] verifies the
//! refresh token and checks it is still registered before minting a new access
//! token. Logout deletes the registry row, so a refresh token stops working
//! immediately even though its signature and expiry remain valid.

pub(crate) mod accounts;
pub(crate) mod clock;
pub(crate) mod cookies;
mod error;
pub(crate) mod login;
pub(crate) mod password;
pub(crate) mod principal;
pub(crate) mod register;
pub(crate) mod registry;
pub(crate) mod session;
mod state;
pub(crate) mod token;
pub(crate) mod types;
mod utils;

pub use accounts::{
    AccountStore, CreateOutcome, Identifier, LoginRecord, MemoryAccountStore, PgAccountStore,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AuthError;
pub use principal::Principal;
pub use registry::{MemoryRevocationRegistry, PgRevocationRegistry, RevocationRegistry};
pub use state::{AuthConfig, AuthState};
pub use token::{TokenCodec, TokenError};
