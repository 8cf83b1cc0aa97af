//! Query command (`qgerrit`)

use crate::{QueryCli, QueryFormat};
use anyhow::{Context, Result};
use chrono::Local;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use gerrit_view_core::format::{cell, format_created_on, truncate};
use gerrit_view_core::query::{self, QueryRequest, QueryResult};
use gerrit_view_core::ssh::SshTarget;

/// Run a `gerrit query` and print the matching changes.
pub async fn query(cli: &QueryCli) -> Result<()> {
    let settings = cli.connection.settings()?;
    let target = SshTarget::new(&settings);
    let request = request_from(cli);
    tracing::debug!(terms = ?request.search_terms(), "running query");

    let result = query::run(&target, &request)
        .await
        .with_context(|| format!("Query against '{}' failed", settings.server))?;

    match cli.format {
        QueryFormat::Json => {
            for line in &result.raw {
                println!("{line}");
            }
        }
        QueryFormat::Table => {
            if result.changes.is_empty() {
                println!("No changes found.");
            } else {
                println!("{}", render_table(&result));
            }
            if let Some(stats) = &result.stats {
                let more = if stats.more_changes { " (more available)" } else { "" };
                println!(
                    "{} changes in {} ms{more}",
                    stats.row_count, stats.run_time_milliseconds
                );
            }
        }
    }
    Ok(())
}

fn request_from(cli: &QueryCli) -> QueryRequest {
    QueryRequest {
        project: cli.project.clone(),
        status: cli.status.clone(),
        owner: cli.owner.clone(),
        branch: cli.branch.clone(),
        topic: cli.topic.clone(),
        terms: cli.terms.clone(),
        limit: Some(cli.limit),
    }
}

/// Render query results as an aligned table, one row per change.
pub fn render_table(result: &QueryResult) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Number", "Owner", "Project", "Subject", "Status", "Updated", "Url"]);

    for queried in &result.changes {
        let change = &queried.change;
        let owner = change.owner.username.as_deref().or(change.owner.name.as_deref());
        table.add_row([
            cell(change.number.as_deref()),
            cell(owner),
            cell(change.project.as_deref()),
            truncate(change.subject.as_deref().unwrap_or_default()),
            cell(queried.status.as_deref()),
            format_created_on(queried.last_updated.or(queried.created_on), &Local),
            cell(change.url.as_deref()),
        ]);
    }
    table
}
