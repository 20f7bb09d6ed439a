// Configuration loading: the `config.toml` file, credential resolution and
// the API endpoint settings.
//
// Lookup order for the file is `./config.toml`, then
// `<config dir>/pileus/config.toml`. Credentials missing from the file fall
// back to the `PILEUS_USERNAME` / `PILEUS_PASSWORD` environment variables.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const USERNAME_VAR: &str = "PILEUS_USERNAME";
pub const PASSWORD_VAR: &str = "PILEUS_PASSWORD";

pub const DEFAULT_AUTH_URL: &str = "https://tokenizer.mypileus.io/prod/credentials";
pub const DEFAULT_BASE_URL: &str = "https://api.mypileus.io/api/v1";
pub const DEFAULT_BASE_V2_URL: &str = "https://api.mypileus.io/api/v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 100;

const DEFAULT_ACCOUNT_KEY: &str = "18745";
const DEFAULT_DIVISION_ID: &str = "0";

const DEFAULT_CONFIG: &str = r#"[AUTH]
PILEUS_USERNAME = "your_username"
PILEUS_PASSWORD = "your_password"
"#;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write default config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Contents of `config.toml`. Every section is optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ConfigFile {
    #[serde(rename = "AUTH", default)]
    pub auth: AuthSection,
    #[serde(rename = "ACCOUNT", default)]
    pub account: AccountSection,
    #[serde(rename = "API", default)]
    pub api: ApiSection,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuthSection {
    #[serde(rename = "PILEUS_USERNAME")]
    pub username: Option<String>,
    #[serde(rename = "PILEUS_PASSWORD")]
    pub password: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct AccountSection {
    #[serde(rename = "ACCOUNT_KEY")]
    pub account_key: Option<String>,
    #[serde(rename = "DIVISION_ID")]
    pub division_id: Option<String>,
    /// When set, the scope is looked up by name in the user list after login.
    #[serde(rename = "ACCOUNT_NAME")]
    pub account_name: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ApiSection {
    #[serde(rename = "AUTH_URL")]
    pub auth_url: Option<String>,
    #[serde(rename = "BASE_URL")]
    pub base_url: Option<String>,
    #[serde(rename = "BASE_V2_URL")]
    pub base_v2_url: Option<String>,
    #[serde(rename = "TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Endpoint settings with defaults filled in.
    pub fn api_settings(&self) -> ApiSettings {
        let defaults = ApiSettings::default();
        ApiSettings {
            auth_url: self.api.auth_url.clone().unwrap_or(defaults.auth_url),
            base_url: self.api.base_url.clone().unwrap_or(defaults.base_url),
            base_v2_url: self.api.base_v2_url.clone().unwrap_or(defaults.base_v2_url),
            timeout: self
                .api
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Static account scope, defaulting to the CloudZone-MOCB tenant.
    pub fn account_scope(&self) -> AccountScope {
        AccountScope {
            account_key: self
                .account
                .account_key
                .clone()
                .unwrap_or_else(|| DEFAULT_ACCOUNT_KEY.to_string()),
            division_id: self
                .account
                .division_id
                .clone()
                .unwrap_or_else(|| DEFAULT_DIVISION_ID.to_string()),
        }
    }
}

/// Base URLs and the per-request timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub auth_url: String,
    pub base_url: String,
    pub base_v2_url: String,
    pub timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            base_v2_url: DEFAULT_BASE_V2_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiSettings {
    /// Point all three endpoints at one server, as the tests do with mockito.
    pub fn with_server(url: &str) -> Self {
        let url = url.trim_end_matches('/');
        Self {
            auth_url: format!("{url}/prod/credentials"),
            base_url: format!("{url}/api/v1"),
            base_v2_url: format!("{url}/api/v2"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Billing account and division an account-scoped API key is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountScope {
    pub account_key: String,
    pub division_id: String,
}

impl Default for AccountScope {
    fn default() -> Self {
        Self {
            account_key: DEFAULT_ACCOUNT_KEY.to_string(),
            division_id: DEFAULT_DIVISION_ID.to_string(),
        }
    }
}

impl fmt::Display for AccountScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.account_key, self.division_id)
    }
}

/// Username and password used for the single login of a run.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Resolve from the config file, falling back to the process environment.
    pub fn resolve(config: &ConfigFile) -> Self {
        Self::resolve_with(config, |key| std::env::var(key).ok())
    }

    /// Same as [`Credentials::resolve`] with an injectable variable lookup.
    pub fn resolve_with<F>(config: &ConfigFile, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = config
            .auth
            .username
            .clone()
            .or_else(|| lookup(USERNAME_VAR))
            .unwrap_or_default();
        let password = config
            .auth
            .password
            .clone()
            .or_else(|| lookup(PASSWORD_VAR))
            .unwrap_or_default();
        Self { username, password }
    }

    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// Find an existing config file, checking `dir` before the user config dir.
pub fn locate(dir: &Path) -> Option<PathBuf> {
    let local = dir.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    let user = dirs::config_dir()?.join("pileus").join(CONFIG_FILE_NAME);
    user.is_file().then_some(user)
}

/// Write a placeholder `config.toml` into `dir` unless one already exists.
///
/// Returns the path of the file that will be used.
pub fn ensure_config_file(dir: &Path) -> Result<PathBuf, ConfigError> {
    if let Some(path) = locate(dir) {
        debug!(path = %path.display(), "Using config file");
        return Ok(path);
    }
    let path = dir.join(CONFIG_FILE_NAME);
    std::fs::write(&path, DEFAULT_CONFIG).map_err(|source| ConfigError::Write {
        path: path.clone(),
        source,
    })?;
    info!(
        path = %path.display(),
        "Generated default config file. Please update it with your credentials."
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let text = r#"
[AUTH]
PILEUS_USERNAME = "alice"
PILEUS_PASSWORD = "s3cret"

[ACCOUNT]
ACCOUNT_KEY = "42"
DIVISION_ID = "7"

[API]
BASE_URL = "http://localhost:9000/api/v1"
TIMEOUT_SECS = 5
"#;
        let config = ConfigFile::parse(Path::new("config.toml"), text).unwrap();
        assert_eq!(config.auth.username.as_deref(), Some("alice"));
        assert_eq!(config.account_scope().to_string(), "42:7");

        let settings = config.api_settings();
        assert_eq!(settings.base_url, "http://localhost:9000/api/v1");
        assert_eq!(settings.auth_url, DEFAULT_AUTH_URL);
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_default_scope_and_timeout() {
        let config = ConfigFile::default();
        assert_eq!(config.account_scope().to_string(), "18745:0");
        assert_eq!(config.api_settings().timeout, Duration::from_secs(100));
    }

    #[test]
    fn test_parse_error_names_path() {
        let err = ConfigFile::parse(Path::new("broken.toml"), "[AUTH\n").unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_credentials_fall_back_to_env() {
        let config = ConfigFile {
            auth: AuthSection {
                username: Some("from-file".into()),
                password: None,
            },
            ..Default::default()
        };
        let creds = Credentials::resolve_with(&config, |key| match key {
            USERNAME_VAR => Some("from-env".into()),
            PASSWORD_VAR => Some("env-pass".into()),
            _ => None,
        });
        assert_eq!(creds.username, "from-file");
        assert_eq!(creds.password, "env-pass");
        assert!(creds.is_complete());
    }

    #[test]
    fn test_credentials_missing_is_incomplete() {
        let creds = Credentials::resolve_with(&ConfigFile::default(), |_| None);
        assert!(!creds.is_complete());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("bob", "hunter2");
        let shown = format!("{creds:?}");
        assert!(shown.contains("bob"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn test_ensure_config_file_writes_default_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = ensure_config_file(dir.path()).unwrap();
        assert_eq!(path, dir.path().join(CONFIG_FILE_NAME));

        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.auth.username.as_deref(), Some("your_username"));

        std::fs::write(&path, "[AUTH]\nPILEUS_USERNAME = \"kept\"\n").unwrap();
        ensure_config_file(dir.path()).unwrap();
        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.auth.username.as_deref(), Some("kept"));
    }

    #[test]
    fn test_with_server_builds_endpoints() {
        let settings = ApiSettings::with_server("http://127.0.0.1:1234/");
        assert_eq!(settings.auth_url, "http://127.0.0.1:1234/prod/credentials");
        assert_eq!(settings.base_v2_url, "http://127.0.0.1:1234/api/v2");
    }
}
