//! Column layout for the dashboard table.
//!
//! Columns are either fixed width or share the remaining space by weight,
//! separated by a fixed number of blank divider columns.

use gerrit_view_core::{ChangeRow, ChangeStatus};

pub const COLUMN_COUNT: usize = 8;

/// Dashboard columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Username,
    Topic,
    Url,
    Project,
    Subject,
    CreatedOn,
    Status,
    Comment,
}

/// How a column claims horizontal space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    Fixed(u16),
    Weight(f32),
}

impl Column {
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::Username,
        Column::Topic,
        Column::Url,
        Column::Project,
        Column::Subject,
        Column::CreatedOn,
        Column::Status,
        Column::Comment,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Column::Username => "Username",
            Column::Topic => "Topic",
            Column::Url => "Url",
            Column::Project => "Project",
            Column::Subject => "Subject",
            Column::CreatedOn => "Created On",
            Column::Status => "Status",
            Column::Comment => "Comment",
        }
    }

    pub fn sizing(self) -> Sizing {
        match self {
            Column::CreatedOn | Column::Project => Sizing::Weight(0.5),
            Column::Status => Sizing::Fixed(9),
            Column::Username => Sizing::Fixed(10),
            Column::Topic => Sizing::Weight(0.33),
            Column::Url | Column::Subject => Sizing::Weight(1.0),
            Column::Comment => Sizing::Weight(0.7),
        }
    }

    /// Text of this column for a row.
    pub fn text(self, row: &ChangeRow) -> &str {
        match self {
            Column::Username => &row.username,
            Column::Topic => &row.topic,
            Column::Url => &row.url,
            Column::Project => &row.project,
            Column::Subject => &row.subject,
            Column::CreatedOn => &row.created_on,
            Column::Status => row.status.map_or("", ChangeStatus::label),
            Column::Comment => &row.comment,
        }
    }
}

/// Compute column widths for `available` terminal columns.
///
/// Fixed columns get their width, weighted columns split what is left.
/// Widths plus dividers never exceed `available`; on very narrow
/// terminals the rightmost columns are clipped first.
pub fn column_widths(available: u16, divide: u16) -> [u16; COLUMN_COUNT] {
    let dividers = divide.saturating_mul(COLUMN_COUNT as u16 - 1);
    let fixed: u16 = Column::ALL
        .iter()
        .map(|c| match c.sizing() {
            Sizing::Fixed(w) => w,
            Sizing::Weight(_) => 0,
        })
        .sum();
    let total_weight: f32 = Column::ALL
        .iter()
        .map(|c| match c.sizing() {
            Sizing::Fixed(_) => 0.0,
            Sizing::Weight(w) => w,
        })
        .sum();
    let flexible = available.saturating_sub(dividers).saturating_sub(fixed);

    let mut widths = [0u16; COLUMN_COUNT];
    let mut assigned: u16 = 0;
    for (width, column) in widths.iter_mut().zip(Column::ALL) {
        *width = match column.sizing() {
            Sizing::Fixed(w) => w,
            Sizing::Weight(w) => {
                let share = (f32::from(flexible) * w / total_weight).floor() as u16;
                assigned = assigned.saturating_add(share);
                share
            }
        };
    }

    // Hand out rounding leftovers left to right
    let mut leftover = flexible.saturating_sub(assigned);
    for (width, column) in widths.iter_mut().zip(Column::ALL) {
        if leftover == 0 {
            break;
        }
        if matches!(column.sizing(), Sizing::Weight(_)) {
            *width += 1;
            leftover -= 1;
        }
    }

    let mut budget = available;
    for (i, width) in widths.iter_mut().enumerate() {
        if i > 0 {
            budget = budget.saturating_sub(divide);
        }
        *width = (*width).min(budget);
        budget -= *width;
    }
    widths
}

/// Wrap text at any character to lines of at most `width` characters.
///
/// Embedded newlines start a new line. Always returns at least one line.
pub fn wrap_any(text: &str, width: u16) -> Vec<String> {
    let width = usize::from(width);
    let mut lines = Vec::new();
    if width == 0 {
        lines.push(String::new());
        return lines;
    }
    for segment in text.split('\n') {
        let chars: Vec<char> = segment.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(chars.chunks(width).map(|c| c.iter().collect::<String>()));
    }
    lines
}
