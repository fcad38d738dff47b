//! Default paths for curfewd components
//!
//! Paths are user-writable by default (no root required):
//! - Config: `$XDG_CONFIG_HOME/curfew/config.toml` or `~/.config/curfew/config.toml`
//! - Data: `$XDG_DATA_HOME/curfew` or `~/.local/share/curfew`
//! - Logs: `$XDG_STATE_HOME/curfew` or `~/.local/state/curfew`

use std::path::{Path, PathBuf};

/// Environment variable for overriding the config file path
pub const CURFEW_CONFIG_ENV: &str = "CURFEW_CONFIG";

/// Environment variable for overriding the data directory
pub const CURFEW_DATA_DIR_ENV: &str = "CURFEW_DATA_DIR";

/// Application subdirectory name
const APP_DIR: &str = "curfew";

const CONFIG_FILENAME: &str = "config.toml";
const STATE_FILENAME: &str = "state.json";
const LOG_FILENAME: &str = "curfewd.log";
const ERR_LOG_FILENAME: &str = "curfewd.err.log";

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Resolve an XDG base directory, falling back to `~/<fallback>` and then `/tmp`.
fn xdg_dir(var: &str, fallback: &[&str], last_resort: &str) -> PathBuf {
    if let Some(dir) = std::env::var_os(var).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir).join(APP_DIR);
    }

    if let Some(home) = home_dir() {
        let mut path = home;
        path.extend(fallback);
        return path.join(APP_DIR);
    }

    PathBuf::from("/tmp").join(APP_DIR).join(last_resort)
}

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$CURFEW_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/curfew/config.toml`
/// 3. `~/.config/curfew/config.toml`
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CURFEW_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    xdg_dir("XDG_CONFIG_HOME", &[".config"], "config").join(CONFIG_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$CURFEW_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/curfew`
/// 3. `~/.local/share/curfew`
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(CURFEW_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    xdg_dir("XDG_DATA_HOME", &[".local", "share"], "data")
}

/// Get the default log directory (`$XDG_STATE_HOME/curfew` or `~/.local/state/curfew`).
pub fn default_log_dir() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", &[".local", "state"], "logs")
}

/// Default location of the persisted usage snapshot
pub fn default_state_path() -> PathBuf {
    default_data_dir().join(STATE_FILENAME)
}

pub fn default_log_file() -> PathBuf {
    default_log_dir().join(LOG_FILENAME)
}

pub fn default_err_log_file() -> PathBuf {
    default_log_dir().join(ERR_LOG_FILENAME)
}

/// Expand a leading `~` or `~/` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
