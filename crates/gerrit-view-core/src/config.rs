//! Connection settings.
//!
//! Settings are layered: explicit overrides (command line flags, which clap
//! already merges with environment variables) win over the optional
//! `config.toml`, which wins over built-in defaults.

use crate::{DEFAULT_PORT, DEFAULT_SERVER};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Private keys tried in `~/.ssh`, in order of preference.
pub const KEY_CANDIDATES: [&str; 4] = ["id_ed25519", "id_ecdsa", "id_rsa", "id_dsa"];

/// Errors raised while resolving connection settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Parser error with location.
        #[source]
        source: toml::de::Error,
    },

    /// No layer supplied a username.
    #[error("could not determine a username; pass --user or set GERRIT_USER")]
    NoUsername,
}

/// The `config.toml` file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Gerrit host name.
    pub server: Option<String>,
    /// Gerrit SSH port.
    pub port: Option<u16>,
    /// Gerrit login name.
    pub username: Option<String>,
    /// SSH private key.
    pub keyfile: Option<PathBuf>,
}

impl FileConfig {
    /// Load a config file. A missing file yields an empty config.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file exists but is unreadable,
    /// [`ConfigError::Parse`] if it is not a valid config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values supplied on the command line (or through their env fallbacks).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--server` / `GERRIT_HOST`.
    pub server: Option<String>,
    /// `--port` / `GERRIT_PORT`.
    pub port: Option<u16>,
    /// `--user` / `GERRIT_USER`.
    pub username: Option<String>,
    /// `--keyfile` / `GERRIT_KEYFILE`.
    pub keyfile: Option<PathBuf>,
}

/// Fully resolved connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Gerrit host name.
    pub server: String,
    /// Gerrit SSH port.
    pub port: u16,
    /// Login name used for `user@host`.
    pub username: String,
    /// Private key passed with `-i`, if any was found.
    pub keyfile: Option<PathBuf>,
}

impl Settings {
    /// Merge overrides, file config and defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoUsername`] if no layer provides a username and
    /// none can be read from the environment.
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<Self, ConfigError> {
        let username = overrides
            .username
            .or(file.username)
            .or_else(current_user)
            .ok_or(ConfigError::NoUsername)?;

        let keyfile = overrides
            .keyfile
            .or(file.keyfile)
            .or_else(|| crate::paths::ssh_dir().and_then(|d| find_key(&d)));

        Ok(Self {
            server: overrides
                .server
                .or(file.server)
                .unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            username,
            keyfile,
        })
    }
}

/// Login name of the current user, from the usual environment variables.
pub fn current_user() -> Option<String> {
    ["LOGNAME", "USER", "LNAME", "USERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.is_empty())
}

/// First private key from [`KEY_CANDIDATES`] present in `ssh_dir`.
pub fn find_key(ssh_dir: &Path) -> Option<PathBuf> {
    if !ssh_dir.is_dir() {
        return None;
    }
    KEY_CANDIDATES
        .iter()
        .map(|k| ssh_dir.join(k))
        .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_win() {
        let file = FileConfig {
            server: Some("file.example.org".into()),
            port: Some(1),
            username: Some("file-user".into()),
            keyfile: Some("/file/key".into()),
        };
        let overrides = Overrides {
            server: Some("cli.example.org".into()),
            port: Some(2),
            username: Some("cli-user".into()),
            keyfile: Some("/cli/key".into()),
        };
        let settings = Settings::resolve(overrides, file).unwrap();
        assert_eq!(settings.server, "cli.example.org");
        assert_eq!(settings.port, 2);
        assert_eq!(settings.username, "cli-user");
        assert_eq!(settings.keyfile, Some(PathBuf::from("/cli/key")));
    }

    #[test]
    fn test_file_then_defaults() {
        let file = FileConfig {
            port: Some(2222),
            username: Some("jenkins".into()),
            keyfile: Some("/k".into()),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(Overrides::default(), file).unwrap();
        assert_eq!(settings.server, DEFAULT_SERVER);
        assert_eq!(settings.port, 2222);
        assert_eq!(settings.username, "jenkins");
    }

    #[test]
    fn test_load_file_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "server = \"gerrit.example.org\"\nport = 29419\n").unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.server.as_deref(), Some("gerrit.example.org"));
        assert_eq!(config.port, Some(29419));
        assert_eq!(config.username, None);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let config = FileConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "hostname = \"typo\"\n").unwrap();
        assert!(matches!(
            FileConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_find_key_order() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_key(dir.path()), None);

        std::fs::write(dir.path().join("id_dsa"), "").unwrap();
        assert_eq!(find_key(dir.path()), Some(dir.path().join("id_dsa")));

        std::fs::write(dir.path().join("id_rsa"), "").unwrap();
        assert_eq!(find_key(dir.path()), Some(dir.path().join("id_rsa")));
    }

    #[test]
    fn test_find_key_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_key(&dir.path().join(".ssh")), None);
    }
}
