// Local handling of setup scripts returned by MSP onboarding.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const SCRIPT_FILE_NAME: &str = "setup.sh";

/// Folder a script for this account is saved into: `{name}_{id}`.
pub fn artifact_dir(root: &Path, account_name: &str, account_id: &str) -> PathBuf {
    root.join(format!("{account_name}_{account_id}"))
}

/// Write `script` to `{root}/{account_name}_{account_id}/setup.sh`,
/// creating the folder if needed. Returns the script path.
pub fn save_setup_script(
    root: &Path,
    account_name: &str,
    account_id: &str,
    script: &str,
) -> io::Result<PathBuf> {
    let dir = artifact_dir(root, account_name, account_id);
    let path = dir.join(SCRIPT_FILE_NAME);
    let result = std::fs::create_dir_all(&dir).and_then(|_| std::fs::write(&path, script));
    match result {
        Ok(()) => {
            info!(path = %path.display(), "Script saved");
            Ok(path)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not save setup script");
            Err(e)
        }
    }
}

/// Open `dir` in the platform file manager.
pub fn open_folder(dir: &Path) -> io::Result<()> {
    match open::that(dir) {
        Ok(()) => {
            info!(path = %dir.display(), "Opened folder");
            Ok(())
        }
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Could not open folder");
            Err(e)
        }
    }
}
