use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::sort::SortSpec;
use crate::status::StatusUpdateEvent;

/// A value a list can be ordered by.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey<'a> {
    Text(Cow<'a, str>),
    Number(f64),
    Timestamp(DateTime<Utc>),
}

impl<'a> SortKey<'a> {
    pub fn text(value: &'a str) -> Self {
        SortKey::Text(Cow::Borrowed(value))
    }

    /// Parses an RFC 3339 timestamp; unparsable input stays text.
    pub fn date(raw: &'a str) -> Self {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => SortKey::Timestamp(parsed.with_timezone(&Utc)),
            Err(_) => SortKey::text(raw),
        }
    }

    /// Text compares with [`locale_compare`], numbers and timestamps by
    /// value. Mismatched kinds fall back to comparing their text forms.
    pub fn compare(&self, other: &SortKey<'_>) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => locale_compare(a, b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Timestamp(a), SortKey::Timestamp(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Timestamp(b)) => a.total_cmp(&millis(b)),
            (SortKey::Timestamp(a), SortKey::Number(b)) => millis(a).total_cmp(b),
            _ => locale_compare(&self.as_text(), &other.as_text()),
        }
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            SortKey::Text(text) => Cow::Borrowed(text.as_ref()),
            SortKey::Number(value) => Cow::Owned(value.to_string()),
            SortKey::Timestamp(at) => Cow::Owned(at.to_rfc3339()),
        }
    }
}

fn millis(at: &DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64
}

/// Case-insensitive ordering; when letters match, lowercase sorts first.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);
    folded_a.cmp(folded_b).then_with(|| b.cmp(a))
}

/// Outcome of merging a status update into a record collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No record matched the update.
    NoMatch,
    /// A record matched but has no live fields, or already held this state.
    Unchanged,
    Applied,
}

/// Field accessors that let one list engine serve every entity.
pub trait ListRecord {
    /// Fields consulted by free-text search, in order.
    const SEARCH_FIELDS: &'static [&'static str];

    fn record_id(&self) -> &str;

    /// Categorical value for `field`, or `None` if the entity has no such field.
    fn category(&self, field: &str) -> Option<&str>;

    /// Searchable text for `field`. Missing values search as empty.
    fn search_text(&self, field: &str) -> Option<&str>;

    /// Sort key for `field`. Missing values sort as empty text.
    fn sort_key(&self, field: &str) -> Option<SortKey<'_>>;

    /// Ordering used when a view first opens.
    fn default_sort() -> SortSpec;

    /// Whether `event` targets this record.
    fn matches_update(&self, event: &StatusUpdateEvent) -> bool {
        self.record_id() == event.record_id
    }

    /// Patches live fields from `event`. Entities without live fields keep
    /// the default, which ignores the update.
    fn apply_status(&mut self, _event: &StatusUpdateEvent, _received_at: DateTime<Utc>) -> bool {
        false
    }
}
