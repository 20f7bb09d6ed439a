// Library root
// -----------
// This crate exposes the Pileus API client as a library. The binary
// (`main.rs`) wires it to the interactive menu.
//
// Module responsibilities:
// - `config`: `config.toml` loading, credential resolution, endpoint and
//   account-scope settings.
// - `transport`: blocking HTTP with a fixed timeout and uniform logging.
// - `session`: the login and the token/API keys it produces.
// - `api`: the domain operations (users, AWS onboarding).
// - `request`: onboarding payloads and their validation from raw input.
// - `artifact`: saving returned setup scripts and opening their folder.
// - `logging`: the per-run log file and console output.
// - `ui`: the terminal menus; the only module that reads stdin.
pub mod api;
pub mod artifact;
pub mod config;
pub mod error;
pub mod logging;
pub mod request;
pub mod session;
pub mod transport;
pub mod ui;

pub use api::{ApiClient, OnboardingOutcome};
pub use config::{AccountScope, ApiSettings, ConfigFile, Credentials};
pub use error::{ApiError, Result};
