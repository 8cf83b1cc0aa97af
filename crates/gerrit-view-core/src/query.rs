//! One-shot `gerrit query` client.
//!
//! `gerrit query --format=JSON` prints one change object per line followed
//! by a `{"type":"stats",...}` row, or a single `{"type":"error",...}` row if
//! the query was rejected.

use crate::event::Change;
use crate::ssh::SshTarget;
use serde::Deserialize;
use thiserror::Error;

/// Default number of results requested.
pub const DEFAULT_LIMIT: u32 = 50;

/// Errors from running a query.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The ssh process could not be started or awaited.
    #[error("failed to run ssh: {0}")]
    Spawn(#[from] std::io::Error),

    /// No ssh client on `PATH`.
    #[error("ssh client not found: {0}")]
    MissingClient(#[from] which::Error),

    /// ssh exited non-zero without a Gerrit error row.
    #[error("gerrit query exited with {status}: {stderr}")]
    Failed {
        /// Exit status as printed by the OS.
        status: String,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// Gerrit answered with an error row.
    #[error("gerrit rejected the query: {0}")]
    Remote(String),

    /// A line of output was not valid JSON or not a change.
    #[error("invalid query output on line {line}: {source}")]
    Parse {
        /// 1-based output line.
        line: usize,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
}

/// Search terms for a query. Empty requests match everything Gerrit allows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    /// `project:` operator.
    pub project: Option<String>,
    /// `status:` operator (open, merged, abandoned, ...).
    pub status: Option<String>,
    /// `owner:` operator.
    pub owner: Option<String>,
    /// `branch:` operator.
    pub branch: Option<String>,
    /// `topic:` operator.
    pub topic: Option<String>,
    /// Raw search terms appended as given.
    pub terms: Vec<String>,
    /// `limit:` operator.
    pub limit: Option<u32>,
}

impl QueryRequest {
    /// Render the request as Gerrit search operators.
    pub fn search_terms(&self) -> Vec<String> {
        let operators = [
            ("project", &self.project),
            ("status", &self.status),
            ("owner", &self.owner),
            ("branch", &self.branch),
            ("topic", &self.topic),
        ];
        let mut terms: Vec<String> = operators
            .iter()
            .filter_map(|(op, value)| value.as_ref().map(|v| format!("{op}:{v}")))
            .collect();
        terms.extend(self.terms.iter().cloned());
        if let Some(limit) = self.limit {
            terms.push(format!("limit:{limit}"));
        }
        terms
    }

    /// Full remote command line after `gerrit`.
    pub fn remote_args(&self) -> Vec<String> {
        let mut args = vec![
            "query".to_string(),
            "--format=JSON".to_string(),
            "--current-patch-set".to_string(),
        ];
        args.extend(self.search_terms());
        args
    }
}

/// A change row returned by `gerrit query`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueriedChange {
    /// Fields shared with stream events.
    #[serde(flatten)]
    pub change: Change,
    /// Change status, e.g. `NEW` or `MERGED`.
    #[serde(default)]
    pub status: Option<String>,
    /// Creation time in seconds since the epoch.
    #[serde(default)]
    pub created_on: Option<i64>,
    /// Last update in seconds since the epoch.
    #[serde(default)]
    pub last_updated: Option<i64>,
}

/// Trailing statistics row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStats {
    /// Changes returned.
    #[serde(default)]
    pub row_count: u64,
    /// Server side run time.
    #[serde(default)]
    pub run_time_milliseconds: u64,
    /// More changes matched than the limit allowed.
    #[serde(default)]
    pub more_changes: bool,
}

/// Parsed query output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Changes in server order.
    pub changes: Vec<QueriedChange>,
    /// The trailing stats row, if present.
    pub stats: Option<QueryStats>,
    /// The raw change lines, for JSON passthrough.
    pub raw: Vec<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Control {
    Stats(QueryStats),
    Error { message: String },
}

/// Parse the JSON lines printed by `gerrit query --format=JSON`.
///
/// # Errors
///
/// [`QueryError::Remote`] for an error row, [`QueryError::Parse`] for a line
/// that is not valid JSON.
pub fn parse_output(output: &str) -> Result<QueryResult, QueryError> {
    let mut result = QueryResult::default();
    for (idx, line) in output.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: serde_json::Value =
            serde_json::from_str(line).map_err(|source| QueryError::Parse {
                line: idx + 1,
                source,
            })?;

        if value.get("type").is_some() {
            match serde_json::from_value::<Control>(value) {
                Ok(Control::Stats(stats)) => result.stats = Some(stats),
                Ok(Control::Error { message }) => return Err(QueryError::Remote(message)),
                Err(e) => tracing::debug!(error = %e, "ignoring unknown control row"),
            }
            continue;
        }

        let change = serde_json::from_value(value).map_err(|source| QueryError::Parse {
            line: idx + 1,
            source,
        })?;
        result.changes.push(change);
        result.raw.push(line.to_string());
    }
    Ok(result)
}

/// Run a query against the server.
///
/// # Errors
///
/// Any [`QueryError`]: missing ssh, spawn failure, non-zero exit or bad output.
pub async fn run(target: &SshTarget, request: &QueryRequest) -> Result<QueryResult, QueryError> {
    target.locate()?;
    let args = request.remote_args();
    tracing::info!(server = target.server(), query = %args.join(" "), "running gerrit query");

    let output = target.command(&args).output().await?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    // Gerrit reports bad queries as an error row with a zero exit status, so
    // parse first and only fall back to the exit status afterwards.
    let parsed = parse_output(&stdout);
    if !output.status.success() {
        if let Err(QueryError::Remote(msg)) = parsed {
            return Err(QueryError::Remote(msg));
        }
        return Err(QueryError::Failed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    parsed
}
