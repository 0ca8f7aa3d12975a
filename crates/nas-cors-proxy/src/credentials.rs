//! Per-request credential resolution.
//!
//! Credentials are never stored or logged server-side; they exist only as
//! transient values scoped to one request.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hyper::header::{HeaderMap, HeaderName, AUTHORIZATION};

/// Custom headers a browser client can use instead of `Authorization`.
pub static X_NAS_USERNAME: HeaderName = HeaderName::from_static("x-nas-username");
pub static X_NAS_PASSWORD: HeaderName = HeaderName::from_static("x-nas-password");

/// Authorization material extracted from the inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A pre-formed authorization value, passed through verbatim.
    Opaque(String),
    /// A username/password pair, encoded as HTTP Basic when attached.
    BasicPair { username: String, password: String },
    /// No credential material supplied.
    None,
}

impl Credentials {
    /// Resolve credentials from inbound headers.
    ///
    /// `Authorization` wins over the custom header pair. Empty usernames and
    /// passwords still count as present; only missing headers fall through.
    /// Action-independent: every handler calls this identically.
    pub fn resolve(headers: &HeaderMap) -> Self {
        if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            return Credentials::Opaque(value.to_string());
        }

        let username = headers.get(&X_NAS_USERNAME).and_then(|v| v.to_str().ok());
        let password = headers.get(&X_NAS_PASSWORD).and_then(|v| v.to_str().ok());
        match (username, password) {
            (Some(username), Some(password)) => Credentials::BasicPair {
                username: username.to_string(),
                password: password.to_string(),
            },
            _ => Credentials::None,
        }
    }

    /// Outbound `Authorization` header value, if any credentials resolved.
    ///
    /// `Opaque` values are returned unmodified; no re-encoding.
    pub fn authorization_value(&self) -> Option<String> {
        match self {
            Credentials::Opaque(value) => Some(value.clone()),
            Credentials::BasicPair { username, password } => Some(format!(
                "Basic {}",
                STANDARD.encode(format!("{username}:{password}"))
            )),
            Credentials::None => None,
        }
    }
}
