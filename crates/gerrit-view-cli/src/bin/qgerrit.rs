//! qgerrit - query Gerrit changes from the console

use anyhow::Result;
use clap::Parser;
use gerrit_view_cli::{QueryCli, cmd, logging};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_stderr();
    let cli = QueryCli::parse();
    cmd::query::query(&cli).await
}
