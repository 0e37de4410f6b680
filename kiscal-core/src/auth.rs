//! HTTP Basic credentials.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::credentials::CredentialStore;
use crate::error::{KiscalError, KiscalResult};

/// Realm sent back in the `WWW-Authenticate` challenge.
pub const REALM: &str = "Restricted";

/// A verified username, valid for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    username: String,
}

impl Identity {
    pub(crate) fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether this identity may write calendars owned by `owner`.
    pub fn owns(&self, owner: &str) -> bool {
        self.username == owner
    }
}

/// Value of the `WWW-Authenticate` header sent with 401 responses.
pub fn challenge() -> String {
    format!("Basic realm=\"{REALM}\"")
}

/// Split an `Authorization` header value into username and secret.
///
/// Returns `None` unless the value is `Basic <base64(username:secret)>`.
pub fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, secret) = decoded.split_once(':')?;

    Some((username.to_string(), secret.to_string()))
}

/// Verify the `Authorization` header against `store`.
///
/// A missing header, a malformed header, an unknown user and a wrong secret
/// all produce the same `Unauthenticated` error.
pub fn authenticate(header: Option<&str>, store: &CredentialStore) -> KiscalResult<Identity> {
    let (username, secret) = header
        .and_then(parse_basic)
        .ok_or(KiscalError::Unauthenticated)?;

    store.verify(&username, &secret).ok_or_else(|| {
        tracing::debug!(%username, "rejected credentials");
        KiscalError::Unauthenticated
    })
}
