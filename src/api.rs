// API client module: the Pileus domain operations (users, onboarding) on
// top of the session and the blocking HTTP transport. Nothing in here
// touches the terminal or the filesystem.

use crate::config::{AccountScope, ApiSettings, ConfigFile, Credentials};
use crate::error::{ApiError, Result};
use crate::request::{AwsOnboardingRequest, MspOnboardingRequest};
use crate::session::{resolve_account_scope, Session};
use crate::transport::{HttpTransport, Payload};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// What an onboarding call handed back.
#[derive(Debug, Clone, PartialEq)]
pub enum OnboardingOutcome {
    /// Regular JSON confirmation.
    Structured(Value),
    /// A setup script the user has to run to finish onboarding.
    RawArtifact(String),
}

/// Client for the Pileus API. Holds the transport, the endpoint settings
/// and the session filled in by [`ApiClient::authenticate`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    transport: HttpTransport,
    settings: ApiSettings,
    scope: AccountScope,
    session: Session,
}

impl ApiClient {
    pub fn new(settings: ApiSettings, scope: AccountScope) -> Result<Self> {
        let transport = HttpTransport::new(settings.timeout)?;
        Ok(ApiClient {
            transport,
            settings,
            scope,
            session: Session::new(),
        })
    }

    /// Create a client from the `[API]` and `[ACCOUNT]` sections of the
    /// config file, with defaults for anything unset.
    pub fn from_config(config: &ConfigFile) -> Result<Self> {
        Self::new(config.api_settings(), config.account_scope())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Log in once for this run.
    pub fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        self.session.authenticate(
            &self.transport,
            &self.settings.auth_url,
            credentials,
            &self.scope,
        )
    }

    /// Re-derive the account-scoped key from the account called
    /// `account_name` in the user list. Returns false, keeping the static
    /// scope, when no such account exists.
    pub fn bind_account_by_name(&mut self, account_name: &str) -> Result<bool> {
        let users = self.list_users()?;
        let (_, api_key) = self.session.require()?;
        let accounts = users
            .get("accounts")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        match resolve_account_scope(api_key, accounts, account_name) {
            Some(key) => {
                info!(%account_name, "Bound account-scoped API key by account name");
                self.session.set_account_api_key(key);
                Ok(true)
            }
            None => {
                warn!(%account_name, "Account not found in user list, keeping configured scope");
                Ok(false)
            }
        }
    }

    /// `GET /users`
    pub fn list_users(&self) -> Result<Value> {
        self.get(&format!("{}/users", self.settings.base_url))
    }

    /// `GET /users/with-roles`
    pub fn list_users_with_roles(&self) -> Result<Value> {
        self.get(&format!("{}/users/with-roles", self.settings.base_url))
    }

    /// Onboard an AWS billing account.
    pub fn onboard_aws_account(&self, req: &AwsOnboardingRequest) -> Result<OnboardingOutcome> {
        self.onboard(&req.account_id, req)
    }

    /// Onboard an AWS billing account on behalf of a reseller customer.
    ///
    /// The service may answer with a shell script instead of JSON; that comes
    /// back as [`OnboardingOutcome::RawArtifact`] for the caller to save.
    pub fn onboard_aws_account_msp(&self, req: &MspOnboardingRequest) -> Result<OnboardingOutcome> {
        self.onboard(req.account_id(), req)
    }

    fn get(&self, url: &str) -> Result<Value> {
        let (token, api_key) = self.session.require()?;
        self.transport
            .get(url, &[("Authorization", token), ("apikey", api_key)])
    }

    fn onboard<T: Serialize>(&self, account_id: &str, payload: &T) -> Result<OnboardingOutcome> {
        let (token, _) = self.session.require()?;
        let account_key = self
            .session
            .account_api_key()
            .ok_or(ApiError::NotAuthenticated)?;
        let url = format!("{}/onboarding/aws/{}", self.settings.base_v2_url, account_id);

        let response = self.transport.post(
            &url,
            &[
                ("Authorization", token),
                ("apikey", account_key),
                ("Content-Type", "application/json"),
            ],
            payload,
        )?;

        if !response.is_success() {
            return Err(ApiError::Server {
                status: response.status,
                body: response.payload.to_body_string(),
            });
        }

        Ok(match response.payload {
            Payload::Json(value) => {
                info!(%account_id, "Onboarding request accepted");
                OnboardingOutcome::Structured(value)
            }
            // An empty reply carries no script to save.
            Payload::Text(text) if text.trim().is_empty() => {
                info!(%account_id, "Onboarding request accepted with an empty reply");
                OnboardingOutcome::Structured(Value::Null)
            }
            Payload::Text(script) => {
                info!(%account_id, "Onboarding returned a setup script");
                OnboardingOutcome::RawArtifact(script)
            }
        })
    }
}
