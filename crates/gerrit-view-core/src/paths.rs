//! Filesystem locations.
//!
//! Everything lives under `~/.gerrit-view` unless `GERRIT_VIEW_HOME` points
//! somewhere else.

use dirs::home_dir;
use std::path::PathBuf;

/// Returns the gerrit-view home directory, or None if the user's home cannot be resolved.
pub fn try_gerrit_view_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("GERRIT_VIEW_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".gerrit-view"))
}

/// Default config file: ~/.gerrit-view/config.toml
pub fn config_path() -> Option<PathBuf> {
    try_gerrit_view_home().map(|h| h.join("config.toml"))
}

/// Logs directory: ~/.gerrit-view/logs
pub fn log_dir() -> Option<PathBuf> {
    try_gerrit_view_home().map(|h| h.join("logs"))
}

/// Default log file for a binary, e.g. ~/.gerrit-view/logs/cgerrit.log
pub fn log_path(binary: &str) -> Option<PathBuf> {
    log_dir().map(|d| d.join(format!("{binary}.log")))
}

/// SSH directory of the current user: ~/.ssh
pub fn ssh_dir() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".ssh"))
}
