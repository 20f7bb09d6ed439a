// Error types for the Pileus client.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur while talking to the Pileus API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Username or password is missing; no request was sent.
    #[error("Missing credentials. Set them in config.toml or as environment variables.")]
    MissingCredentials,

    /// An operation was called before a successful authentication.
    #[error("Authentication required. Please authenticate first.")]
    NotAuthenticated,

    /// The auth endpoint answered but did not hand out a token and API key.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Connection error when sending request to {url}")]
    Connection { url: String },

    /// Any other failure inside the HTTP stack.
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-200 status.
    #[error("Server returned {status}: {body}")]
    Server { status: u16, body: String },

    /// A response that had to be JSON was not.
    #[error("Invalid response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// A header value contained characters HTTP does not allow.
    #[error("Invalid value for header {0}")]
    InvalidHeader(String),
}

impl ApiError {
    /// Map a reqwest failure onto the transport tags.
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if err.is_connect() {
            Self::Connection {
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }

    /// Check if this error indicates an authentication problem.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials
                | Self::NotAuthenticated
                | Self::AuthFailed(_)
                | Self::Server { status: 401, .. }
                | Self::Server { status: 403, .. }
        )
    }

    /// Check if the request never produced an HTTP response.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Connection { .. } | Self::Transport { .. }
        )
    }

    /// Short advice for the user, when there is something they can do.
    pub fn hint(&self) -> Option<&'static str> {
        if self.is_auth_error() {
            Some("The session was rejected; restart the client to log in again.")
        } else if self.is_transport_error() {
            Some("Check your network connection and try again.")
        } else {
            None
        }
    }
}
