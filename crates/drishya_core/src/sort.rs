use std::cmp::Ordering;

use crate::record::{ListRecord, SortKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// The single active sort column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Header click: the active field toggles direction, any other field
    /// becomes active in ascending order.
    pub fn select(&mut self, field: &str) {
        if self.field == field {
            self.direction = self.direction.toggled();
        } else {
            self.field = field.to_string();
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn compare<R: ListRecord>(&self, a: &R, b: &R) -> Ordering {
        let ordering = compare_keys(a.sort_key(&self.field), b.sort_key(&self.field));
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

fn compare_keys(a: Option<SortKey<'_>>, b: Option<SortKey<'_>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(a), Some(b)) => a.compare(&b),
        (Some(a), None) => a.compare(&SortKey::text("")),
        (None, Some(b)) => SortKey::text("").compare(&b),
    }
}

/// Stable sort: records that compare equal keep their input order in
/// either direction.
pub fn apply_sort<'a, R: ListRecord>(mut records: Vec<&'a R>, spec: &SortSpec) -> Vec<&'a R> {
    records.sort_by(|a, b| spec.compare(*a, *b));
    records
}
