//! cgerrit - live console view of the Gerrit event stream

use anyhow::{Context, Result};
use clap::Parser;
use gerrit_view_cli::{WatchCli, cmd, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = WatchCli::parse();

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| gerrit_view_core::log_path("cgerrit"))
        .context("Could not determine a log file location; pass --log-file")?;
    logging::init_file(&log_file)?;

    cmd::watch::watch(&cli).await
}
