//! Gerrit event stream watcher.
//!
//! Keeps a `gerrit stream-events` session open over SSH, parses each line and
//! forwards it to an [`EventSink`]. Lost sessions are re-established; failed
//! attempts back off exponentially until [`CONNECT_ATTEMPTS`] is exhausted.

use crate::event::StreamEvent;
use crate::sink::{ConnectionState, EventSink};
use crate::ssh::SshTarget;
use std::fmt;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::ChildStderr;

/// Connection attempts before the watcher gives up.
pub const CONNECT_ATTEMPTS: u32 = 5;

/// Why the watcher stopped.
#[derive(Error, Debug)]
pub enum WatchError {
    /// No ssh client on `PATH`.
    #[error("ssh client not found: {0}")]
    MissingClient(#[from] which::Error),

    /// Every attempt of a backoff round failed.
    #[error("Could not connect to '{server}' on port {port}")]
    Exhausted {
        /// Gerrit host name.
        server: String,
        /// Gerrit SSH port.
        port: u16,
    },
}

/// Exponential delay sequence: `exponent^i` seconds for `i in 0..attempts`.
///
/// The sequence can be iterated any number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    /// Number of delays, and so of connection attempts per round.
    pub attempts: u32,
    /// Growth base in seconds.
    pub exponent: u64,
}

impl ExponentialBackoff {
    /// Backoff with `attempts` delays doubling from one second.
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts,
            exponent: 2,
        }
    }

    /// The delays, shortest first.
    pub fn iter(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.attempts).map(|i| Duration::from_secs(self.exponent.saturating_pow(i)))
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(CONNECT_ATTEMPTS)
    }
}

impl fmt::Display for ExponentialBackoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs: Vec<String> = self.iter().map(|d| d.as_secs().to_string()).collect();
        write!(f, "ExponentialBackoff: [{}]", secs.join(", "))
    }
}

/// How one stream session ended.
#[derive(Debug)]
struct SessionEnd {
    events: usize,
    status: ExitStatus,
    stderr: String,
}

impl SessionEnd {
    /// Only a session that delivered events was a real connection. A clean
    /// exit with nothing streamed still counts as a failed attempt.
    fn delivered(&self) -> bool {
        self.events > 0
    }

    fn failure_reason(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("ssh exited with {} before any event", self.status)
        } else {
            format!("ssh exited with {}: {stderr}", self.status)
        }
    }
}

/// Long-running stream watcher.
#[derive(Debug, Clone)]
pub struct GerritWatcher {
    target: SshTarget,
    backoff: ExponentialBackoff,
}

impl GerritWatcher {
    /// Watcher for `target` with the default backoff.
    pub fn new(target: SshTarget) -> Self {
        Self {
            target,
            backoff: ExponentialBackoff::default(),
        }
    }

    /// Replace the reconnect backoff.
    pub fn with_backoff(mut self, backoff: ExponentialBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Watch forever, or until every attempt in one backoff round failed.
    ///
    /// Every failed attempt is followed by its backoff delay. A session that
    /// delivered at least one event starts a fresh round.
    ///
    /// # Errors
    ///
    /// [`WatchError::MissingClient`] if the ssh binary is not on `PATH`,
    /// [`WatchError::Exhausted`] once reconnecting has failed
    /// `backoff.attempts` times in a row.
    pub async fn run(&self, sink: &dyn EventSink) -> Result<(), WatchError> {
        let program = self.target.locate()?;
        tracing::debug!(program = %program.display(), backoff = %self.backoff, "starting watcher");

        'reconnect: loop {
            let mut last_reason = String::from("no connection attempts configured");
            for (i, delay) in self.backoff.iter().enumerate() {
                let attempt = i as u32 + 1;
                sink.connection(ConnectionState::Connecting { attempt });

                let reason = match self.session(sink).await {
                    Ok(end) if end.delivered() => {
                        tracing::info!(events = end.events, status = %end.status, "stream session ended, reconnecting");
                        continue 'reconnect;
                    }
                    Ok(end) => end.failure_reason(),
                    Err(e) => format!("failed to start ssh: {e}"),
                };
                tracing::warn!(attempt, %reason, "exception while connecting to gerrit");
                tracing::info!("Trying connection again in {} seconds", delay.as_secs());
                sink.connection(ConnectionState::Retrying {
                    delay_secs: delay.as_secs(),
                    reason: reason.clone(),
                });
                last_reason = reason;
                tokio::time::sleep(delay).await;
            }

            sink.connection(ConnectionState::GaveUp {
                reason: last_reason,
            });
            return Err(WatchError::Exhausted {
                server: self.target.server().to_string(),
                port: self.target.port(),
            });
        }
    }

    /// Run a single `stream-events` session to completion.
    ///
    /// stdout and stderr are drained together so a chatty stderr cannot
    /// stall the stream.
    async fn session(&self, sink: &dyn EventSink) -> std::io::Result<SessionEnd> {
        let mut child = self
            .target
            .command(&["stream-events".to_string()])
            .spawn()?;
        tracing::info!(server = self.target.server(), port = self.target.port(), "Start watching gerrit event stream.");

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (events, stderr) = tokio::join!(
            async move {
                match stdout {
                    Some(out) => pump_lines(BufReader::new(out), sink).await,
                    None => 0,
                }
            },
            drain(stderr),
        );
        let status = child.wait().await?;

        Ok(SessionEnd {
            events,
            status,
            stderr,
        })
    }
}

async fn drain(stderr: Option<ChildStderr>) -> String {
    let Some(mut err) = stderr else {
        return String::new();
    };
    let mut buf = Vec::new();
    if let Err(e) = err.read_to_end(&mut buf).await {
        tracing::debug!(error = %e, "stopped reading ssh stderr");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Forward every parseable line from `reader` to `sink`.
///
/// Reports [`ConnectionState::Connected`] when the first line arrives.
/// Lines that are not UTF-8 or not a valid event are logged and skipped. A
/// read error ends the stream. Returns how many events were forwarded.
pub async fn pump_lines<R>(mut reader: R, sink: &dyn EventSink) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut forwarded = 0;
    let mut connected = false;
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, forwarded, "event stream read failed");
                break;
            }
        }
        if !connected {
            connected = true;
            sink.connection(ConnectionState::Connected);
        }

        let Ok(line) = std::str::from_utf8(&buf) else {
            tracing::warn!(bytes = buf.len(), "skipping stream line that is not UTF-8");
            continue;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match StreamEvent::from_line(line) {
            Ok(event) => {
                tracing::debug!(kind = event.kind(), "placing event on queue");
                sink.event(event);
                forwarded += 1;
            }
            Err(e) => tracing::warn!(error = %e, %line, "skipping malformed stream line"),
        }
    }
    forwarded
}
