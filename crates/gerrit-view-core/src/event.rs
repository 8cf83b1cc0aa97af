//! Gerrit stream events.
//!
//! `gerrit stream-events` writes one JSON object per line. Only the event
//! types the dashboard reacts to are modelled; everything else becomes
//! [`StreamEvent::Other`].

use serde::{Deserialize, Deserializer};

/// A single event from the Gerrit event stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamEvent {
    /// A new patch set was uploaded.
    PatchsetCreated(Box<PatchsetCreated>),
    /// A reviewer commented, possibly with votes.
    CommentAdded(Box<CommentAdded>),
    /// A change was submitted and merged.
    ChangeMerged(Box<ChangeMerged>),
    /// Any event type we do not handle.
    #[serde(other)]
    Other,
}

/// Payload of `patchset-created`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchsetCreated {
    /// The change the patch set belongs to.
    pub change: Change,
    /// The new patch set.
    #[serde(default)]
    pub patch_set: PatchSet,
    /// Who uploaded it.
    #[serde(default)]
    pub uploader: Account,
}

/// Payload of `comment-added`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAdded {
    /// The change that was commented on.
    pub change: Change,
    /// The patch set the comment targets.
    #[serde(default)]
    pub patch_set: PatchSet,
    /// The reviewer.
    #[serde(default)]
    pub author: Account,
    /// Votes cast with the comment, in the order Gerrit lists them.
    #[serde(default)]
    pub approvals: Vec<Approval>,
    /// Comment text, possibly empty.
    #[serde(default)]
    pub comment: String,
}

/// Payload of `change-merged`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeMerged {
    /// The merged change.
    pub change: Change,
    /// The patch set that was merged.
    #[serde(default)]
    pub patch_set: PatchSet,
    /// Who submitted it.
    #[serde(default)]
    pub submitter: Account,
}

/// The `change` attribute shared by change events and query rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    /// Project name, e.g. `openstack/nova`.
    #[serde(default)]
    pub project: Option<String>,
    /// Target branch.
    #[serde(default)]
    pub branch: Option<String>,
    /// Topic, if one was set.
    #[serde(default)]
    pub topic: Option<String>,
    /// `Change-Id` footer value.
    #[serde(default)]
    pub id: Option<String>,
    /// Change number. Older servers send a string, newer ones a number.
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub number: Option<String>,
    /// First line of the commit message.
    #[serde(default)]
    pub subject: Option<String>,
    /// Change owner.
    #[serde(default)]
    pub owner: Account,
    /// Web URL of the change. Rows on the board are keyed by it.
    #[serde(default)]
    pub url: Option<String>,
}

/// The `patchSet` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSet {
    /// Patch set number within the change.
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub number: Option<String>,
    /// Commit sha.
    #[serde(default)]
    pub revision: Option<String>,
    /// Upload time in seconds since the epoch.
    #[serde(default)]
    pub created_on: Option<i64>,
}

/// A Gerrit user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Account {
    /// Full name.
    #[serde(default)]
    pub name: Option<String>,
    /// Preferred email.
    #[serde(default)]
    pub email: Option<String>,
    /// Login name.
    #[serde(default)]
    pub username: Option<String>,
}

/// A vote attached to a comment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Approval {
    /// Label name, e.g. `Code-Review` (or `CRVW` on old servers).
    #[serde(rename = "type")]
    pub label: String,
    /// Human readable label name.
    #[serde(default)]
    pub description: Option<String>,
    /// Vote value such as `-2` or `+1`, normalised to a string.
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
}

impl StreamEvent {
    /// Parse one line of `stream-events` output.
    ///
    /// # Errors
    ///
    /// Fails if the line is not a JSON object with a `type`, or a handled
    /// event type lacks its `change`.
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// The event type string, as Gerrit names it.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PatchsetCreated(_) => "patchset-created",
            Self::CommentAdded(_) => "comment-added",
            Self::ChangeMerged(_) => "change-merged",
            Self::Other => "other",
        }
    }

    /// The change this event refers to, for change events.
    pub fn change(&self) -> Option<&Change> {
        match self {
            Self::PatchsetCreated(e) => Some(&e.change),
            Self::CommentAdded(e) => Some(&e.change),
            Self::ChangeMerged(e) => Some(&e.change),
            Self::Other => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
}

impl From<StringOrNumber> for String {
    fn from(v: StringOrNumber) -> Self {
        match v {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(d).map(String::from)
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Option::<StringOrNumber>::deserialize(d).map(|v| v.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATCHSET: &str = r#"{"type":"patchset-created","change":{"project":"openstack/nova","branch":"master","topic":"bug/1234","id":"I0123","number":"45678","subject":"Fix the thing","owner":{"name":"Jane","username":"jane"},"url":"https://review.openstack.org/45678"},"patchSet":{"number":"2","revision":"abc","createdOn":1380000000},"uploader":{"name":"Jane","email":"jane@example.org","username":"jane"}}"#;

    #[test]
    fn test_parse_patchset_created() {
        let event = StreamEvent::from_line(PATCHSET).unwrap();
        let StreamEvent::PatchsetCreated(e) = &event else {
            panic!("wrong variant: {event:?}");
        };
        assert_eq!(e.change.project.as_deref(), Some("openstack/nova"));
        assert_eq!(e.change.number.as_deref(), Some("45678"));
        assert_eq!(e.patch_set.created_on, Some(1_380_000_000));
        assert_eq!(e.uploader.username.as_deref(), Some("jane"));
        assert_eq!(event.kind(), "patchset-created");
    }

    #[test]
    fn test_parse_comment_added_numeric_values() {
        let line = r#"{"type":"comment-added","change":{"url":"u","number":12},"approvals":[{"type":"Verified","description":"Verified","value":-1},{"type":"CRVW","value":"2"}],"comment":"LGTM"}"#;
        let StreamEvent::CommentAdded(e) = StreamEvent::from_line(line).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(e.change.number.as_deref(), Some("12"));
        assert_eq!(e.approvals[0].value, "-1");
        assert_eq!(e.approvals[1].label, "CRVW");
        assert_eq!(e.comment, "LGTM");
    }

    #[test]
    fn test_unknown_type_is_other() {
        let line = r#"{"type":"ref-updated","refUpdate":{"project":"x"}}"#;
        let event = StreamEvent::from_line(line).unwrap();
        assert_eq!(event, StreamEvent::Other);
        assert!(event.change().is_none());
    }

    #[test]
    fn test_reject_missing_type_or_change() {
        assert!(StreamEvent::from_line(r#"{"change":{}}"#).is_err());
        assert!(StreamEvent::from_line(r#"{"type":"change-merged"}"#).is_err());
        assert!(StreamEvent::from_line("[1,2]").is_err());
        assert!(StreamEvent::from_line("not json").is_err());
    }
}
