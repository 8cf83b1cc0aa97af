//! Watch command (`cgerrit`)

use crate::WatchCli;
use crate::ui::DashboardActor;
use anyhow::{Context, Result};
use gerrit_view_core::ssh::SshTarget;
use gerrit_view_core::watcher::GerritWatcher;

/// Stream Gerrit events into the dashboard until the user quits.
pub async fn watch(cli: &WatchCli) -> Result<()> {
    let settings = cli.connection.settings()?;
    let target = SshTarget::new(&settings);
    // Fail before taking over the terminal if there is no ssh client
    target.locate().context("Could not find an ssh client on PATH")?;

    let label = format!("{}@{}:{}", settings.username, settings.server, settings.port);
    tracing::info!(target = %label, "starting dashboard");

    let actor = DashboardActor::spawn(label);
    let sink = actor.sink();
    let watcher = GerritWatcher::new(target);
    let stream = tokio::spawn(async move {
        if let Err(e) = watcher.run(&sink).await {
            tracing::error!("{e}");
        }
    });

    let result = tokio::task::spawn_blocking(move || actor.wait())
        .await
        .context("dashboard task failed")?;
    stream.abort();
    tracing::info!("dashboard closed");
    result
}
