//! Username/secret store loaded once at startup.

use std::collections::HashMap;
use std::path::Path;

use crate::auth::Identity;
use crate::error::{KiscalError, KiscalResult};

/// Credentials written when no user file exists yet. The server refuses to
/// start until an operator has looked at the file.
const PLACEHOLDER_USERS: [(&str, &str); 2] = [("user1", "changeme"), ("user2", "pleasereset")];

/// Immutable mapping from username to secret.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(users: HashMap<String, String>) -> Self {
        Self { users }
    }

    /// Read a JSON object of `"username": "secret"` pairs.
    pub fn load(path: &Path) -> KiscalResult<Self> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(KiscalError::CredentialsNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let users: HashMap<String, String> =
            serde_json::from_slice(&data).map_err(|source| KiscalError::CredentialsParse {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::info!(count = users.len(), path = %path.display(), "loaded users");

        Ok(Self { users })
    }

    /// Write the placeholder credential file to `path`.
    pub fn write_placeholder(path: &Path) -> KiscalResult<()> {
        let users: HashMap<&str, &str> = PLACEHOLDER_USERS.into_iter().collect();
        let content = serde_json::to_string_pretty(&users)
            .map_err(|e| KiscalError::Config(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn lookup(&self, username: &str) -> Option<&str> {
        self.users.get(username).map(String::as_str)
    }

    /// Check a username/secret pair. Unknown users and wrong secrets are
    /// indistinguishable to the caller.
    pub fn verify(&self, username: &str, secret: &str) -> Option<Identity> {
        let (expected, known) = match self.lookup(username) {
            Some(expected) => (expected, true),
            None => ("", false),
        };

        let matches = constant_time_eq(expected.as_bytes(), secret.as_bytes());

        (known && matches).then(|| Identity::new(username))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
