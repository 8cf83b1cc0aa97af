//! Event sink trait for dependency injection
//!
//! This trait lets the watcher hand events and connection changes to a
//! consumer without being coupled to a specific TUI.

use crate::event::StreamEvent;

/// Connection lifecycle reported by the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Spawning a new SSH session (attempt counts from 1).
    Connecting {
        /// 1-based attempt within the current backoff round.
        attempt: u32,
    },
    /// The stream session is up and delivering output.
    Connected,
    /// The last attempt failed; retrying after `delay_secs`.
    Retrying {
        /// Seconds until the next attempt.
        delay_secs: u64,
        /// Why the attempt failed.
        reason: String,
    },
    /// All attempts failed; the watcher has stopped.
    GaveUp {
        /// Why the last attempt failed.
        reason: String,
    },
}

/// Consumer of watcher output. Implementations must not block.
pub trait EventSink: Send + Sync {
    /// A parsed stream event arrived.
    fn event(&self, event: StreamEvent);

    /// The connection state changed.
    fn connection(&self, state: ConnectionState);
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn event(&self, event: StreamEvent) {
        (**self).event(event);
    }

    fn connection(&self, state: ConnectionState) {
        (**self).connection(state);
    }
}

/// A no-op sink for silent operation (e.g. testing).
#[derive(Debug, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn event(&self, _: StreamEvent) {}
    fn connection(&self, _: ConnectionState) {}
}
