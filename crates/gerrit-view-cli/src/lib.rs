//! gerrit-view - Gerrit viewer tools for the console
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Three binaries share this crate:
//!
//! - `cgerrit`: live dashboard of the Gerrit event stream.
//! - `qgerrit`: run a `gerrit query` and print the results as a table.
//! - `gerrit-view`: package maintenance (`gerrit-view manifest`).

pub mod cmd;
pub mod logging;
pub mod ui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gerrit_view_core::config::{FileConfig, Overrides};
use gerrit_view_core::{DEFAULT_PORT, DEFAULT_SERVER, Settings};
use std::path::PathBuf;

/// Version reported by `--version` (derived from git tags at build time).
pub const VERSION: &str = env!("GERRIT_VIEW_VERSION");

/// Connection flags shared by `cgerrit` and `qgerrit`.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Gerrit server hostname [default: review.openstack.org]
    #[arg(short, long, env = "GERRIT_HOST")]
    pub server: Option<String>,

    /// Gerrit SSH port [default: 29418]
    #[arg(short, long, env = "GERRIT_PORT")]
    pub port: Option<u16>,

    /// Gerrit username [default: current user]
    #[arg(short, long, env = "GERRIT_USER")]
    pub user: Option<String>,

    /// SSH private key [default: first of ~/.ssh/id_{ed25519,ecdsa,rsa,dsa}]
    #[arg(short, long, env = "GERRIT_KEYFILE")]
    pub keyfile: Option<PathBuf>,

    /// Config file [default: ~/.gerrit-view/config.toml]
    #[arg(long, env = "GERRIT_VIEW_CONFIG")]
    pub config: Option<PathBuf>,
}

impl ConnectionArgs {
    /// Resolve these flags against the config file and defaults.
    pub fn settings(&self) -> Result<Settings> {
        let file = match self.config.clone().or_else(gerrit_view_core::config_path) {
            Some(path) => FileConfig::load(&path)?,
            None => FileConfig::default(),
        };
        let overrides = Overrides {
            server: self.server.clone(),
            port: self.port,
            username: self.user.clone(),
            keyfile: self.keyfile.clone(),
        };
        let settings =
            Settings::resolve(overrides, file).context("Failed to resolve connection settings")?;
        tracing::debug!(?settings, "resolved settings");
        Ok(settings)
    }
}

#[derive(Debug, Parser)]
#[command(name = "cgerrit", version = VERSION)]
#[command(about = "Watch the Gerrit event stream in a live console table")]
#[command(after_help = format!("Defaults: {DEFAULT_SERVER}:{DEFAULT_PORT}. Press q or Esc to quit."))]
pub struct WatchCli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Log file [default: ~/.gerrit-view/logs/cgerrit.log]
    #[arg(long, env = "CGERRIT_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryFormat {
    /// Aligned table
    Table,
    /// Raw JSON lines, one change per line
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "qgerrit", version = VERSION)]
#[command(about = "Query Gerrit changes and print them as a table")]
pub struct QueryCli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Only changes in this project
    #[arg(long)]
    pub project: Option<String>,

    /// Only changes with this status (open, merged, abandoned, ...)
    #[arg(long)]
    pub status: Option<String>,

    /// Only changes owned by this user
    #[arg(long)]
    pub owner: Option<String>,

    /// Only changes targeting this branch
    #[arg(long)]
    pub branch: Option<String>,

    /// Only changes with this topic
    #[arg(long)]
    pub topic: Option<String>,

    /// Maximum number of changes
    #[arg(long, default_value_t = gerrit_view_core::query::DEFAULT_LIMIT)]
    pub limit: u32,

    /// Output format
    #[arg(long, value_enum, default_value_t = QueryFormat::Table)]
    pub format: QueryFormat,

    /// Additional raw search terms (e.g. is:starred)
    #[arg(trailing_var_arg = true)]
    pub terms: Vec<String>,
}

#[derive(Debug, Parser)]
#[command(name = "gerrit-view", version = VERSION)]
#[command(about = "gerrit-view package maintenance")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the package manifest assembled from requirements.txt and README.rst
    Manifest {
        /// Directory holding requirements.txt and README.rst
        #[arg(long, default_value_os_t = default_root())]
        root: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = ManifestFormat::Json)]
        format: ManifestFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ManifestFormat {
    Json,
    Toml,
}

/// The workspace root this binary was built from.
pub fn default_root() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../.."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definitions() {
        WatchCli::command().debug_assert();
        QueryCli::command().debug_assert();
        Cli::command().debug_assert();
    }

    #[test]
    fn test_query_cli_parse() {
        let cli = QueryCli::parse_from([
            "qgerrit",
            "--server",
            "review.example.org",
            "--project",
            "openstack/nova",
            "--limit",
            "5",
            "is:starred",
        ]);
        assert_eq!(cli.connection.server.as_deref(), Some("review.example.org"));
        assert_eq!(cli.project.as_deref(), Some("openstack/nova"));
        assert_eq!(cli.limit, 5);
        assert_eq!(cli.format, QueryFormat::Table);
        assert_eq!(cli.terms, ["is:starred"]);
    }

    #[test]
    fn test_manifest_cli_defaults() {
        let cli = Cli::parse_from(["gerrit-view", "manifest"]);
        let Commands::Manifest { root, format } = cli.command;
        assert_eq!(root, default_root());
        assert_eq!(format, ManifestFormat::Json);
    }
}
