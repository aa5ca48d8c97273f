//! The account session type: login, registration, identity lookup.

use std::sync::Arc;

use serde_json::{Value, json};

use relay_session::table::{OperationError, OperationTable, Operations};

use crate::accounts::{AccountDirectory, CredentialCheck};

/// Per-client session state for the account demo.
///
/// Holds at most one signed-in username; the directory itself is shared
/// across all sessions.
pub struct AccountSession {
    accounts: Arc<AccountDirectory>,
    signed_in: Option<String>,
}

impl AccountSession {
    /// Create a signed-out session over a shared directory.
    pub fn new(accounts: Arc<AccountDirectory>) -> Self {
        Self {
            accounts,
            signed_in: None,
        }
    }

    fn login(&mut self, input: Value) -> Result<Value, OperationError> {
        let (username, password) = credentials(&input)?;
        let text = match self.accounts.check(&username, &password) {
            CredentialCheck::UnknownUser => "user does not exist",
            CredentialCheck::WrongPassword => "password incorrect",
            CredentialCheck::Valid => {
                self.signed_in = Some(username.clone());
                "logged in"
            }
        };
        Ok(json!({ "text": text }))
    }

    fn register(&mut self, input: Value) -> Result<Value, OperationError> {
        let (username, password) = credentials(&input)?;
        let text = if self.accounts.register(&username, &password) {
            "registered successfully"
        } else {
            "user already exists"
        };
        Ok(json!({ "text": text }))
    }

    fn user_name(&mut self, _input: Value) -> Result<Value, OperationError> {
        Ok(json!({ "username": self.signed_in.clone().unwrap_or_default() }))
    }

    // Keepalive: the payload is echoed back; the dispatch path refreshes the
    // session's last-activity timestamp on every successful invocation.
    fn refresh(&mut self, input: Value) -> Result<Value, OperationError> {
        Ok(input)
    }

    fn logout(&mut self, _input: Value) -> Result<Value, OperationError> {
        self.signed_in = None;
        Ok(json!({ "text": "logged out" }))
    }
}

impl Operations for AccountSession {
    fn table() -> OperationTable<Self> {
        OperationTable::new()
            .with("login", AccountSession::login)
            .with("register", AccountSession::register)
            .with("getUserName", AccountSession::user_name)
            .with("updateSession", AccountSession::refresh)
            .with("logout", AccountSession::logout)
    }
}

/// Pull `username` and `password` out of the operation input.
fn credentials(input: &Value) -> Result<(String, String), OperationError> {
    let username = input
        .get("username")
        .and_then(Value::as_str)
        .ok_or_else(|| OperationError::new("username missing"))?;
    let password = input
        .get("password")
        .and_then(Value::as_str)
        .ok_or_else(|| OperationError::new("password missing"))?;
    Ok((username.to_owned(), password.to_owned()))
}
