//! gerrit-view core library
//!
//! Shared logic behind the `cgerrit`, `qgerrit` and `gerrit-view` binaries.
//!
//! # Overview
//!
//! - [`manifest`]: package descriptor assembly from `requirements.txt` and `README.rst`.
//! - [`config`]: connection settings merged from flags, environment and `config.toml`.
//! - [`event`]: typed model of the JSON lines emitted by `gerrit stream-events`.
//! - [`board`]: the bounded change table the dashboard renders.
//! - [`watcher`]: long-lived SSH stream session with exponential backoff.
//! - [`query`]: one-shot `gerrit query --format=JSON` client.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.gerrit-view/
//! ├── config.toml   # Optional connection defaults
//! └── logs/         # cgerrit log files
//! ```

pub mod board;
pub mod config;
pub mod event;
pub mod format;
pub mod manifest;
pub mod paths;
pub mod query;
pub mod sink;
pub mod ssh;
pub mod watcher;

pub use board::{ChangeBoard, ChangeRow, ChangeStatus};
pub use config::Settings;
pub use event::StreamEvent;
pub use paths::{config_path, log_dir, log_path, ssh_dir, try_gerrit_view_home};
pub use sink::{ConnectionState, EventSink, NullSink};

/// Default Gerrit server used when nothing else is configured.
pub const DEFAULT_SERVER: &str = "review.openstack.org";

/// Default Gerrit SSH port.
pub const DEFAULT_PORT: u16 = 29418;
