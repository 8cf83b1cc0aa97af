//! gerrit-view - package maintenance commands

use anyhow::Result;
use clap::Parser;
use gerrit_view_cli::{Cli, Commands, cmd, logging};

fn main() -> Result<()> {
    logging::init_stderr();
    let cli = Cli::parse();

    match cli.command {
        Commands::Manifest { root, format } => cmd::manifest::manifest(&root, format),
    }
}
