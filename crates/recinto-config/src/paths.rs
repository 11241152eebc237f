//! Platform-specific configuration paths.
//!
//! - **User config**: `~/.config/recinto/` (Linux), `~/Library/Application Support/recinto/` (macOS), `%APPDATA%\recinto\` (Windows)
//! - **Batch config file**: `batch.toml` inside the user config directory

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "recinto";

/// File name of the default batch configuration.
const BATCH_CONFIG_FILE: &str = "batch.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the default batch configuration file (may not exist).
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(BATCH_CONFIG_FILE)
}

/// Resolve which configuration file to load.
///
/// An explicit path is returned as-is when it is a file. Without one, the
/// default file in the user config directory is used if present.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => path.is_file().then(|| path.to_path_buf()),
        None => {
            let default = default_config_path();
            default.is_file().then_some(default)
        }
    }
}

/// Ensure the user config directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_config_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}
