// Entrypoint for the CLI application.
// - Sets up logging and the config file, logs in once, then hands the
//   client to the interactive menu.
// - Authentication failure is logged and ends the run normally.

use anyhow::Context;
use pileus_cli::{config, logging, ui::main_menu, ApiClient, ConfigFile, Credentials};
use tracing::{debug, error, warn};

fn main() -> anyhow::Result<()> {
    let workdir = std::env::current_dir().context("Failed to read current directory")?;

    // Load .env before logging so RUST_LOG set there takes effect.
    let dotenv = logging::load_dotenv(&workdir);

    // Keep the guard alive for the whole run so the log file is flushed.
    let (_log_guard, log_path) = logging::init(&workdir)?;
    debug!(path = %log_path.display(), "Logging to file");

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Failed to load .env"),
    }

    let config_path = config::ensure_config_file(&workdir)?;
    let config = ConfigFile::load(&config_path)?;
    let credentials = Credentials::resolve(&config);

    let mut api = ApiClient::from_config(&config)?;
    if let Err(e) = api.authenticate(&credentials) {
        error!(error = %e, "Authentication failed.");
        return Ok(());
    }

    if let Some(account_name) = config.account.account_name.as_deref() {
        if let Err(e) = api.bind_account_by_name(account_name) {
            warn!(error = %e, "Could not resolve account scope by name");
        }
    }

    main_menu(&api, &workdir)?;
    Ok(())
}
