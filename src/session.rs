// Authentication state for one run of the client.
//
// A [`Session`] starts empty and is filled by a single successful
// [`Session::authenticate`]. Tokens are never refreshed; once the remote
// side expires them, later calls simply fail with an auth error.

use crate::config::{AccountScope, Credentials};
use crate::error::{ApiError, Result};
use crate::transport::{HttpTransport, Payload};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

/// Substring of the general API key that is swapped for an account scope.
pub const KEY_PLACEHOLDER: &str = "-1";

#[derive(Serialize)]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Default, Clone)]
pub struct Session {
    auth_token: Option<String>,
    api_key: Option<String>,
    account_api_key: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn account_api_key(&self) -> Option<&str> {
        self.account_api_key.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some() && self.api_key.is_some()
    }

    /// Token and general key, or [`ApiError::NotAuthenticated`].
    pub(crate) fn require(&self) -> Result<(&str, &str)> {
        match (self.auth_token.as_deref(), self.api_key.as_deref()) {
            (Some(token), Some(key)) => Ok((token, key)),
            _ => {
                error!("Authentication required. Please authenticate first.");
                Err(ApiError::NotAuthenticated)
            }
        }
    }

    /// Replace the account-scoped key, e.g. after a by-name lookup.
    pub fn set_account_api_key(&mut self, key: String) {
        self.account_api_key = Some(key);
    }

    /// Log in and store the token and keys.
    ///
    /// Empty credentials fail with [`ApiError::MissingCredentials`] before any
    /// request is made.
    pub fn authenticate(
        &mut self,
        transport: &HttpTransport,
        auth_url: &str,
        credentials: &Credentials,
        scope: &AccountScope,
    ) -> Result<()> {
        if !credentials.is_complete() {
            error!("Missing credentials. Set them in config.toml or as environment variables.");
            return Err(ApiError::MissingCredentials);
        }

        let payload = AuthRequest {
            username: &credentials.username,
            password: &credentials.password,
        };
        let response = transport.post(
            auth_url,
            &[("Content-Type", "application/json")],
            &payload,
        )?;

        if let Payload::Json(body) = &response.payload {
            let token = body.get("Authorization").and_then(Value::as_str);
            let key = body.get("apikey").and_then(Value::as_str);
            if let (Some(token), Some(key)) = (token, key) {
                self.auth_token = Some(token.to_string());
                self.api_key = Some(key.to_string());
                self.account_api_key = Some(derive_account_key(key, scope));
            }
        }

        if self.is_authenticated() {
            info!(username = %credentials.username, "Authentication successful");
            Ok(())
        } else {
            let reason = if response.is_success() {
                "response did not contain Authorization and apikey".to_string()
            } else {
                format!("auth endpoint returned {}", response.status)
            };
            error!(%reason, "Authentication failed");
            Err(ApiError::AuthFailed(reason))
        }
    }
}

/// Bind a general API key to an account scope.
pub fn derive_account_key(api_key: &str, scope: &AccountScope) -> String {
    api_key.replace(KEY_PLACEHOLDER, &scope.to_string())
}

/// Look up `target_account_name` in a user-list `accounts` array and bind
/// `api_key` to that account's key and division.
///
/// Returns `None` when no account matches or the match lacks either id.
pub fn resolve_account_scope(
    api_key: &str,
    accounts: &[Value],
    target_account_name: &str,
) -> Option<String> {
    let account = accounts
        .iter()
        .find(|acc| acc.get("accountName").and_then(Value::as_str) == Some(target_account_name))?;
    let scope = AccountScope {
        account_key: id_to_string(account.get("accountKey")?)?,
        division_id: id_to_string(account.get("divisionId")?)?,
    };
    Some(derive_account_key(api_key, &scope))
}

// Ids come back as numbers or strings depending on the endpoint.
fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
