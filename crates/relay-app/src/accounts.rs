//! In-memory account directory shared by all sessions.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Result of checking a username/password pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialCheck {
    /// No account with this username.
    UnknownUser,
    /// Account exists, password does not match.
    WrongPassword,
    /// Username and password match.
    Valid,
}

/// Process-wide username → password map.
///
/// Demo-grade storage: plaintext, no persistence. Real credential policy is
/// application territory, outside the dispatch core.
#[derive(Default)]
pub struct AccountDirectory {
    accounts: RwLock<HashMap<String, String>>,
}

impl AccountDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account. Returns `false` if the username is taken.
    pub fn register(&self, username: &str, password: &str) -> bool {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(username) {
            return false;
        }
        let _ = accounts.insert(username.to_owned(), password.to_owned());
        true
    }

    /// Check a username/password pair.
    pub fn check(&self, username: &str, password: &str) -> CredentialCheck {
        match self.accounts.read().get(username) {
            None => CredentialCheck::UnknownUser,
            Some(stored) if stored == password => CredentialCheck::Valid,
            Some(_) => CredentialCheck::WrongPassword,
        }
    }

    /// Whether an account with this username exists.
    pub fn contains(&self, username: &str) -> bool {
        self.accounts.read().contains_key(username)
    }

    /// Number of registered accounts.
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    /// Whether no accounts are registered.
    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}
