//! Cookie transport for the access and refresh credentials.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};

pub const ACCESS_COOKIE_NAME: &str = "access";
pub const REFRESH_COOKIE_NAME: &str = "refresh";

const COOKIE_ATTRIBUTES: &str = "Path=/; HttpOnly; SameSite=Lax; Secure";
const EPOCH: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Credentials presented on a request. Empty cookie values count as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialCookies {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl CredentialCookies {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = Self::default();
        for header in headers.get_all(COOKIE) {
            let Ok(value) = header.to_str() else {
                continue;
            };
            for pair in value.split(';') {
                let Some((key, val)) = pair.trim().split_once('=') else {
                    continue;
                };
                let val = val.trim();
                if val.is_empty() {
                    continue;
                }
                match key.trim() {
                    ACCESS_COOKIE_NAME => cookies.access = Some(val.to_string()),
                    REFRESH_COOKIE_NAME => cookies.refresh = Some(val.to_string()),
                    _ => {}
                }
            }
        }
        cookies
    }
}

pub(crate) fn access_cookie(
    token: &str,
    ttl_seconds: u64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    credential_cookie(ACCESS_COOKIE_NAME, token, ttl_seconds)
}

pub(crate) fn refresh_cookie(
    token: &str,
    ttl_seconds: u64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    credential_cookie(REFRESH_COOKIE_NAME, token, ttl_seconds)
}

fn credential_cookie(
    name: &str,
    token: &str,
    ttl_seconds: u64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{name}={token}; {COOKIE_ATTRIBUTES}; Max-Age={ttl_seconds}"
    ))
}

/// Append expiring cookies for both credentials. They are always cleared together.
pub(crate) fn append_clear_cookies(headers: &mut HeaderMap) {
    for name in [ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME] {
        let cookie = format!("{name}=; {COOKIE_ATTRIBUTES}; Max-Age=0; Expires={EPOCH}");
        // Static ASCII; never fails.
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.append(SET_COOKIE, value);
        }
    }
}
