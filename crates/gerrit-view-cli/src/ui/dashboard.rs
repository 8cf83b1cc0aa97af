//! Dashboard composition - board state to screen lines
//!
//! Composition is pure: [`compose`] turns the board and view state into a
//! list of colored lines sized to the terminal, and the engine paints them.
//! This keeps layout testable without a terminal.

use super::layout::{Column, column_widths, wrap_any};
use super::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Color;
use gerrit_view_core::{ChangeBoard, ChangeRow, ConnectionState};

/// Header, two dividers, footer and the two box borders.
const CHROME_ROWS: u16 = 6;

/// A run of same-colored text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub color: Color,
}

impl Span {
    fn new(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// One screen line.
pub type Line = Vec<Span>;

/// Plain text of a line, for tests and logging.
pub fn line_text(line: &Line) -> String {
    line.iter().map(|s| s.text.as_str()).collect()
}

/// Footer status severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
    Error,
}

/// Per-session view state that is not part of the board.
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Index of the first visible board row
    pub scroll: usize,
    pub status: String,
    pub severity: Severity,
    target: String,
}

impl DashboardView {
    /// `target` is the `server:port` label used in connection messages.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            scroll: 0,
            status: "Waiting for events...".to_string(),
            severity: Severity::Normal,
            target: target.into(),
        }
    }

    /// Update the footer for a connection state change.
    pub fn set_connection(&mut self, state: &ConnectionState) {
        let (status, severity) = match state {
            ConnectionState::Connecting { attempt: 1 } => {
                (format!("Connecting to {}...", self.target), Severity::Normal)
            }
            ConnectionState::Connecting { attempt } => (
                format!("Connecting to {} (attempt {attempt})...", self.target),
                Severity::Warning,
            ),
            ConnectionState::Connected => ("Waiting for events...".to_string(), Severity::Normal),
            ConnectionState::Retrying { delay_secs, .. } => (
                format!("Connection to {} failed, retrying in {delay_secs}s", self.target),
                Severity::Warning,
            ),
            ConnectionState::GaveUp { .. } => (
                format!("Could not connect to {}. Press q to quit.", self.target),
                Severity::Error,
            ),
        };
        self.status = status;
        self.severity = severity;
    }
}

/// Result of a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Redraw,
    Ignore,
}

/// Apply a key press to the view. `rows` is the board length and `page`
/// the number of rows a page scroll moves.
pub fn handle_key(key: KeyEvent, view: &mut DashboardView, rows: usize, page: usize) -> KeyAction {
    let last = rows.saturating_sub(1);
    let before = view.scroll;
    match key.code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => return KeyAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return KeyAction::Quit;
        }
        KeyCode::Up | KeyCode::Char('k') => view.scroll = view.scroll.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => view.scroll = (view.scroll + 1).min(last),
        KeyCode::PageUp => view.scroll = view.scroll.saturating_sub(page.max(1)),
        KeyCode::PageDown => view.scroll = (view.scroll + page.max(1)).min(last),
        KeyCode::Home => view.scroll = 0,
        KeyCode::End => view.scroll = last,
        _ => return KeyAction::Ignore,
    }
    if view.scroll == before {
        KeyAction::Ignore
    } else {
        KeyAction::Redraw
    }
}

/// Rows available for the table body at a given terminal height.
pub fn body_height(height: u16) -> u16 {
    height.saturating_sub(CHROME_ROWS)
}

/// Compose the whole screen.
///
/// `clock` is the right-hand footer timestamp. Returns exactly `height`
/// lines when the terminal is big enough for the frame, or none otherwise.
pub fn compose<Tz>(
    board: &ChangeBoard<Tz>,
    view: &DashboardView,
    theme: &Theme,
    clock: &str,
    width: u16,
    height: u16,
) -> Vec<Line>
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if width < 3 || height < CHROME_ROWS {
        return Vec::new();
    }
    let inner = width - 2;
    let divide = theme.layout.divide_chars;
    let widths = column_widths(inner, divide);
    let border = &theme.border;
    let colors = &theme.colors;

    let boxed = |mut content: Line| -> Line {
        let mut line = vec![Span::new(border.vertical.to_string(), colors.border)];
        line.append(&mut content);
        line.push(Span::new(border.vertical.to_string(), colors.border));
        line
    };
    let divider = || {
        let text: String = std::iter::repeat_n(border.divider, usize::from(inner)).collect();
        boxed(vec![Span::new(text, colors.border)])
    };

    let mut lines = Vec::with_capacity(usize::from(height));

    let horizontal: String = std::iter::repeat_n(border.horizontal, usize::from(inner)).collect();
    lines.push(vec![Span::new(
        format!("{}{horizontal}{}", border.top_left, border.top_right),
        colors.border,
    )]);

    let titles: Vec<(String, Color)> = Column::ALL
        .iter()
        .map(|c| (c.title().to_string(), colors.header))
        .collect();
    lines.push(boxed(cells_line(&titles, &widths, divide, inner)));
    lines.push(divider());

    let body = usize::from(body_height(height));
    let mut body_lines = Vec::with_capacity(body);
    for row in board.rows().skip(view.scroll) {
        if body_lines.len() >= body {
            break;
        }
        for line in row_lines(row, theme, &widths, divide, inner) {
            if body_lines.len() >= body {
                break;
            }
            body_lines.push(boxed(line));
        }
    }
    while body_lines.len() < body {
        body_lines.push(boxed(vec![Span::new(
            " ".repeat(usize::from(inner)),
            colors.body,
        )]));
    }
    lines.extend(body_lines);

    lines.push(divider());

    let right = format!("{clock}, {} events received", board.total_events());
    let status_color = match view.severity {
        Severity::Normal => colors.body,
        Severity::Warning => colors.warning,
        Severity::Error => colors.negative,
    };
    lines.push(boxed(footer_line(
        &view.status,
        status_color,
        &right,
        colors.body,
        inner,
    )));

    lines.push(vec![Span::new(
        format!("{}{horizontal}{}", border.bottom_left, border.bottom_right),
        colors.border,
    )]);
    lines
}

/// Lines for one board row, cells wrapped at any character.
fn row_lines(row: &ChangeRow, theme: &Theme, widths: &[u16], divide: u16, inner: u16) -> Vec<Line> {
    let wrapped: Vec<(Vec<String>, Color)> = Column::ALL
        .iter()
        .zip(widths)
        .map(|(column, &width)| {
            let color = match (column, row.status) {
                (Column::Status, Some(status)) => theme.status_color(status),
                _ => theme.colors.body,
            };
            (wrap_any(column.text(row), width), color)
        })
        .collect();
    let height = wrapped.iter().map(|(l, _)| l.len()).max().unwrap_or(1);

    (0..height)
        .map(|i| {
            let cells: Vec<(String, Color)> = wrapped
                .iter()
                .map(|(l, color)| (l.get(i).cloned().unwrap_or_default(), *color))
                .collect();
            cells_line(&cells, widths, divide, inner)
        })
        .collect()
}

/// Lay out one line of cells, padding each to its column width.
fn cells_line(cells: &[(String, Color)], widths: &[u16], divide: u16, inner: u16) -> Line {
    let mut line = Vec::with_capacity(cells.len() * 2);
    let mut used = 0usize;
    for (i, ((text, color), &width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push(Span::new(" ".repeat(usize::from(divide)), Color::Reset));
            used += usize::from(divide);
        }
        let clipped: String = text.chars().take(usize::from(width)).collect();
        line.push(Span::new(
            format!("{clipped:<w$}", w = usize::from(width)),
            *color,
        ));
        used += usize::from(width);
    }
    let inner = usize::from(inner);
    if used < inner {
        line.push(Span::new(" ".repeat(inner - used), Color::Reset));
    }
    line
}

/// Footer: status on the left, details right-aligned.
fn footer_line(left: &str, left_color: Color, right: &str, right_color: Color, inner: u16) -> Line {
    let inner = usize::from(inner);
    let right: String = right.chars().take(inner).collect();
    let right_len = right.chars().count();
    let room = inner - right_len;
    let left: String = left.chars().take(room).collect();
    let gap = room - left.chars().count();
    vec![
        Span::new(left, left_color),
        Span::new(" ".repeat(gap), Color::Reset),
        Span::new(right, right_color),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crossterm::event::KeyEventKind;
    use gerrit_view_core::event::{
        Account, Change, ChangeMerged, PatchSet, PatchsetCreated, StreamEvent,
    };

    fn created(url: &str, subject: &str) -> StreamEvent {
        StreamEvent::PatchsetCreated(Box::new(PatchsetCreated {
            change: Change {
                url: Some(url.into()),
                subject: Some(subject.into()),
                project: Some("openstack/nova".into()),
                ..Change::default()
            },
            patch_set: PatchSet::default(),
            uploader: Account::default(),
        }))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    fn char_len(line: &Line) -> usize {
        line_text(line).chars().count()
    }

    #[test]
    fn test_compose_empty_board() {
        let board = ChangeBoard::new(Utc);
        let view = DashboardView::new("review.example.org:29418");
        let lines = compose(&board, &view, &Theme::default(), "12:00:00 PM 01/01/2024", 120, 20);

        assert_eq!(lines.len(), 20);
        assert!(lines.iter().all(|l| char_len(l) == 120));
        assert!(line_text(&lines[1]).contains("Username"));
        assert!(line_text(&lines[1]).contains("Created On"));
        assert!(line_text(&lines[18]).contains("Waiting for events..."));
        assert!(line_text(&lines[18]).ends_with("12:00:00 PM 01/01/2024, 0 events received│"));
    }

    #[test]
    fn test_compose_rows_and_status_color() {
        let mut board = ChangeBoard::new(Utc);
        board.apply(&created("https://r/1", "First"));
        board.apply(&StreamEvent::ChangeMerged(Box::new(ChangeMerged {
            change: Change {
                url: Some("https://r/1".into()),
                ..Change::default()
            },
            patch_set: PatchSet::default(),
            submitter: Account::default(),
        })));
        let view = DashboardView::new("x:1");
        let theme = Theme::default();
        let lines = compose(&board, &view, &theme, "now", 160, 12);

        assert!(line_text(&lines[3]).contains("First"));
        assert!(
            lines[3]
                .iter()
                .any(|s| s.text.trim() == "Merged" && s.color == theme.colors.positive)
        );
        assert!(line_text(&lines[10]).contains("2 events received"));
    }

    #[test]
    fn test_compose_wraps_long_cells() {
        let mut board = ChangeBoard::new(Utc);
        board.apply(&created("https://review.example.org/c/openstack/nova/+/123456", "s"));
        let view = DashboardView::new("x:1");
        let lines = compose(&board, &view, &Theme::default(), "now", 80, 12);
        // Url column is narrow at 80 cols, so the row spans several lines
        assert!(!line_text(&lines[4]).trim_matches(|c| c == '│' || c == ' ').is_empty());
    }

    #[test]
    fn test_compose_too_small() {
        let board = ChangeBoard::new(Utc);
        let view = DashboardView::new("x:1");
        assert!(compose(&board, &view, &Theme::default(), "now", 80, 3).is_empty());
    }

    #[test]
    fn test_scroll_skips_rows() {
        let mut board = ChangeBoard::new(Utc);
        board.apply(&created("u1", "first"));
        board.apply(&created("u2", "second"));
        let mut view = DashboardView::new("x:1");
        view.scroll = 1;
        let lines = compose(&board, &view, &Theme::default(), "now", 160, 12);
        assert!(line_text(&lines[3]).contains("second"));
        assert!(!lines.iter().any(|l| line_text(l).contains("first")));
    }

    #[test]
    fn test_keys() {
        let mut view = DashboardView::new("x:1");
        assert_eq!(handle_key(key(KeyCode::Char('q')), &mut view, 0, 10), KeyAction::Quit);
        assert_eq!(handle_key(key(KeyCode::Esc), &mut view, 0, 10), KeyAction::Quit);
        assert_eq!(handle_key(key(KeyCode::Down), &mut view, 5, 10), KeyAction::Redraw);
        assert_eq!(view.scroll, 1);
        assert_eq!(handle_key(key(KeyCode::PageDown), &mut view, 5, 10), KeyAction::Redraw);
        assert_eq!(view.scroll, 4);
        assert_eq!(handle_key(key(KeyCode::Down), &mut view, 5, 10), KeyAction::Ignore);
        assert_eq!(handle_key(key(KeyCode::Home), &mut view, 5, 10), KeyAction::Redraw);
        assert_eq!(view.scroll, 0);
        assert_eq!(handle_key(key(KeyCode::Char('x')), &mut view, 5, 10), KeyAction::Ignore);

        let ctrl_c = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char('c'))
        };
        assert_eq!(handle_key(ctrl_c, &mut view, 5, 10), KeyAction::Quit);
    }

    #[test]
    fn test_connection_messages() {
        let mut view = DashboardView::new("review.example.org:29418");
        view.set_connection(&ConnectionState::Retrying {
            delay_secs: 4,
            reason: "boom".into(),
        });
        assert_eq!(view.severity, Severity::Warning);
        assert!(view.status.contains("retrying in 4s"));

        view.set_connection(&ConnectionState::GaveUp {
            reason: "boom".into(),
        });
        assert_eq!(view.severity, Severity::Error);

        view.set_connection(&ConnectionState::Connected);
        assert_eq!(view.status, "Waiting for events...");
    }
}
