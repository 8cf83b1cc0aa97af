//! Change board - the table model behind the `cgerrit` dashboard.
//!
//! New patch sets append a row; comments and merges update the row for the
//! same change url. The board holds at most [`MAX_ROWS`] rows and evicts the
//! oldest one when full.

use crate::event::{Approval, ChangeMerged, CommentAdded, PatchsetCreated, StreamEvent};
use crate::format::{cell, format_created_on, truncate};
use chrono::{Local, TimeZone};
use std::collections::{BTreeMap, VecDeque};
use std::fmt::Display;

/// Maximum number of rows kept on the board.
pub const MAX_ROWS: usize = 50;

/// Review outcome shown in the Status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    /// The change was merged.
    Merged,
    /// Code-Review +2.
    Approved,
    /// Code-Review -2.
    Rejected,
    /// Verified +2.
    Succeeded,
    /// Verified -2.
    Failed,
}

impl ChangeStatus {
    /// Text shown in the Status column.
    pub fn label(self) -> &'static str {
        match self {
            Self::Merged => "Merged",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
        }
    }

    /// Whether this outcome is good news.
    pub fn is_positive(self) -> bool {
        matches!(self, Self::Merged | Self::Approved | Self::Succeeded)
    }

    /// Derive a status from comment votes. The last matching vote wins.
    pub fn from_approvals(approvals: &[Approval]) -> Option<Self> {
        approvals.iter().rev().find_map(Self::from_approval)
    }

    fn from_approval(approval: &Approval) -> Option<Self> {
        let verified = matches!(approval.label.as_str(), "VRIF" | "Verified");
        let review = matches!(approval.label.as_str(), "CRVW" | "Code-Review");
        match (verified, review, approval.value.trim_start_matches('+')) {
            (true, _, "-2") => Some(Self::Failed),
            (true, _, "2") => Some(Self::Succeeded),
            (_, true, "-2") => Some(Self::Rejected),
            (_, true, "2") => Some(Self::Approved),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeRow {
    /// Uploader login name.
    pub username: String,
    /// Change topic.
    pub topic: String,
    /// Change URL. Later events find their row by it.
    pub url: String,
    /// Project name.
    pub project: String,
    /// Subject, truncated.
    pub subject: String,
    /// Formatted upload time.
    pub created_on: String,
    /// Latest review outcome, if any vote or merge was seen.
    pub status: Option<ChangeStatus>,
    /// Latest non-empty comment, truncated.
    pub comment: String,
}

/// Bounded, ordered set of change rows plus handled-event counters.
#[derive(Debug)]
pub struct ChangeBoard<Tz: TimeZone = Local> {
    rows: VecDeque<ChangeRow>,
    counts: BTreeMap<&'static str, u64>,
    capacity: usize,
    tz: Tz,
}

impl Default for ChangeBoard {
    fn default() -> Self {
        Self::new(Local)
    }
}

impl<Tz> ChangeBoard<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    /// Create an empty board that formats timestamps in `tz`.
    pub fn new(tz: Tz) -> Self {
        Self::with_capacity(MAX_ROWS, tz)
    }

    /// Create an empty board holding at most `capacity` rows (minimum 1).
    pub fn with_capacity(capacity: usize, tz: Tz) -> Self {
        Self {
            rows: VecDeque::with_capacity(capacity),
            counts: BTreeMap::new(),
            capacity: capacity.max(1),
            tz,
        }
    }

    /// Apply an event. Returns `false` for event types the board ignores.
    pub fn apply(&mut self, event: &StreamEvent) -> bool {
        match event {
            StreamEvent::PatchsetCreated(e) => self.on_patchset_created(e),
            StreamEvent::CommentAdded(e) => self.on_comment_added(e),
            StreamEvent::ChangeMerged(e) => self.on_change_merged(e),
            StreamEvent::Other => return false,
        }
        *self.counts.entry(event.kind()).or_default() += 1;
        true
    }

    /// Rows from oldest to newest.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &ChangeRow> {
        self.rows.iter()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the board has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of handled events of one type.
    pub fn count(&self, kind: &str) -> u64 {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    /// Number of handled events across all types.
    pub fn total_events(&self) -> u64 {
        self.counts.values().sum()
    }

    fn on_patchset_created(&mut self, event: &PatchsetCreated) {
        let change = &event.change;
        let row = ChangeRow {
            username: cell(event.uploader.username.as_deref()),
            topic: cell(change.topic.as_deref()),
            url: cell(change.url.as_deref()),
            project: cell(change.project.as_deref()),
            subject: truncate(change.subject.as_deref().unwrap_or_default()),
            created_on: format_created_on(event.patch_set.created_on, &self.tz),
            status: None,
            comment: String::new(),
        };
        if self.rows.len() >= self.capacity {
            self.rows.pop_front();
        }
        self.rows.push_back(row);
    }

    fn on_comment_added(&mut self, event: &CommentAdded) {
        let Some(row) = self.find_mut(event.change.url.as_deref()) else {
            return;
        };
        let comment = truncate(&event.comment);
        if !comment.is_empty() {
            row.comment = comment;
        }
        if let Some(status) = ChangeStatus::from_approvals(&event.approvals) {
            row.status = Some(status);
        }
    }

    fn on_change_merged(&mut self, event: &ChangeMerged) {
        if let Some(row) = self.find_mut(event.change.url.as_deref()) {
            row.status = Some(ChangeStatus::Merged);
        }
    }

    /// Row for a change url. A missing or empty url never matches.
    fn find_mut(&mut self, url: Option<&str>) -> Option<&mut ChangeRow> {
        let url = url.filter(|u| !u.is_empty())?;
        self.rows.iter_mut().find(|r| r.url == url)
    }
}
