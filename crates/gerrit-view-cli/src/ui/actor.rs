//! Dashboard Actor - Single-threaded event processing
//!
//! The watcher runs on the tokio runtime while the terminal is strictly
//! serial, so all UI state lives on one dedicated thread.
//!
//! 1. **Sender (Many)**: the watcher task pushes [`UiEvent`]s through an
//!    [`ActorSink`] without ever blocking on the terminal.
//!
//! 2. **Receiver (One)**: the actor thread owns the receiver, the
//!    [`ChangeBoard`], the [`Screen`] and keyboard polling. Only this thread
//!    touches them, so no locking is needed.
//!
//! 3. **Refresh**: the loop wakes at least every [`INPUT_POLL`] to read keys
//!    and redraws whenever something changed or [`REFRESH_INTERVAL`] has
//!    passed (the footer clock ticks).
use super::dashboard::{DashboardView, KeyAction, body_height, compose, handle_key};
use super::engine::Screen;
use super::theme::Theme;
use anyhow::{Context, Result};
use chrono::Local;
use crossterm::event::{self, Event, KeyEventKind};
use gerrit_view_core::format::format_clock;
use gerrit_view_core::{ChangeBoard, ConnectionState, EventSink, StreamEvent};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// How often the footer clock is redrawn.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(500);

/// Longest wait for channel events before checking the keyboard.
pub const INPUT_POLL: Duration = Duration::from_millis(50);

/// Events that can be sent to the dashboard actor
#[derive(Debug)]
pub enum UiEvent {
    /// A stream event from Gerrit
    Stream(StreamEvent),
    /// The watcher's connection state changed
    Connection(ConnectionState),
    /// Shutdown the actor
    Shutdown,
}

/// Forwards watcher output to the actor thread.
#[derive(Debug, Clone)]
pub struct ActorSink {
    sender: mpsc::Sender<UiEvent>,
}

impl EventSink for ActorSink {
    fn event(&self, event: StreamEvent) {
        // Ignore errors: the actor has already shut down
        let _ = self.sender.send(UiEvent::Stream(event));
    }

    fn connection(&self, state: ConnectionState) {
        let _ = self.sender.send(UiEvent::Connection(state));
    }
}

/// Handle to the dashboard thread
#[derive(Debug)]
pub struct DashboardActor {
    sender: mpsc::Sender<UiEvent>,
    handle: Option<thread::JoinHandle<Result<()>>>,
}

impl DashboardActor {
    /// Spawn the dashboard thread. `target` labels the server in the footer.
    pub fn spawn(target: String) -> Self {
        let (sender, receiver) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("dashboard".into())
            .spawn(move || run_event_loop(&receiver, target))
            .ok();

        Self { sender, handle }
    }

    /// Sink that feeds this actor
    pub fn sink(&self) -> ActorSink {
        ActorSink {
            sender: self.sender.clone(),
        }
    }

    /// Block until the user quits (or the terminal fails).
    pub fn wait(mut self) -> Result<()> {
        let handle = self
            .handle
            .take()
            .context("Failed to start the dashboard thread")?;
        match handle.join() {
            Ok(result) => result,
            Err(_) => anyhow::bail!("dashboard thread panicked"),
        }
    }
}

impl Drop for DashboardActor {
    fn drop(&mut self) {
        // Send shutdown signal (ignore errors if already shut down)
        let _ = self.sender.send(UiEvent::Shutdown);
    }
}

/// Main event loop for the dashboard
///
/// Returns when the user quits, on [`UiEvent::Shutdown`], or on a terminal error.
fn run_event_loop(receiver: &mpsc::Receiver<UiEvent>, target: String) -> Result<()> {
    let mut screen = Screen::enter().context("Failed to initialise the terminal")?;
    let theme = Theme::default();
    let mut board = ChangeBoard::default();
    let mut view = DashboardView::new(target);
    let mut dirty = true;
    let mut last_draw = Instant::now();

    loop {
        // Block briefly for the first event, then drain the rest
        let first = match receiver.recv_timeout(INPUT_POLL) {
            Ok(ev) => Some(ev),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(()),
        };
        for ui_event in first.into_iter().chain(receiver.try_iter()) {
            match ui_event {
                UiEvent::Stream(ev) => {
                    if board.apply(&ev) {
                        dirty = true;
                    } else {
                        tracing::debug!("ignoring unhandled stream event");
                    }
                }
                UiEvent::Connection(state) => {
                    tracing::info!(?state, "connection state");
                    view.set_connection(&state);
                    dirty = true;
                }
                UiEvent::Shutdown => return Ok(()),
            }
        }

        let (width, height) = Screen::size()?;

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let page = usize::from(body_height(height));
                    match handle_key(key, &mut view, board.len(), page) {
                        KeyAction::Quit => return Ok(()),
                        KeyAction::Redraw => dirty = true,
                        KeyAction::Ignore => {}
                    }
                }
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }

        if dirty || last_draw.elapsed() >= REFRESH_INTERVAL {
            view.scroll = view.scroll.min(board.len().saturating_sub(1));
            let clock = format_clock(&Local::now());
            let lines = compose(&board, &view, &theme, &clock, width, height);
            screen.draw(&lines)?;
            dirty = false;
            last_draw = Instant::now();
        }
    }
}
