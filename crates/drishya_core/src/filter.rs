use std::collections::{BTreeMap, BTreeSet};

use crate::record::ListRecord;

/// Value written by a filter control to mean "no constraint".
pub const ALL: &str = "all";

/// Constraint on one categorical field.
///
/// Several selected values match any of them. An empty selection behaves
/// like [`FieldFilter::All`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldFilter {
    #[default]
    All,
    AnyOf(BTreeSet<String>),
}

impl FieldFilter {
    /// Parses a single-select control value; `"all"` clears the constraint.
    pub fn parse(value: &str) -> Self {
        if value == ALL {
            FieldFilter::All
        } else {
            FieldFilter::only(value)
        }
    }

    pub fn only(value: impl Into<String>) -> Self {
        FieldFilter::AnyOf(BTreeSet::from([value.into()]))
    }

    pub fn any_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldFilter::AnyOf(values.into_iter().map(Into::into).collect())
    }

    pub fn is_active(&self) -> bool {
        matches!(self, FieldFilter::AnyOf(values) if !values.is_empty())
    }

    pub fn accepts(&self, value: Option<&str>) -> bool {
        match self {
            FieldFilter::All => true,
            FieldFilter::AnyOf(values) if values.is_empty() => true,
            FieldFilter::AnyOf(values) => value.is_some_and(|value| values.contains(value)),
        }
    }

    /// Adds `value` to the selection, or removes it if already selected.
    pub fn toggle(&mut self, value: &str) {
        match self {
            FieldFilter::All => *self = FieldFilter::only(value),
            FieldFilter::AnyOf(values) => {
                if !values.remove(value) {
                    values.insert(value.to_string());
                }
                if values.is_empty() {
                    *self = FieldFilter::All;
                }
            }
        }
    }
}

/// Active categorical constraints plus the free-text search term.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    fields: BTreeMap<String, FieldFilter>,
    search: String,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: impl Into<String>, filter: FieldFilter) -> Self {
        self.set_field(field, filter);
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn set_field(&mut self, field: impl Into<String>, filter: FieldFilter) {
        let field = field.into();
        if filter.is_active() {
            self.fields.insert(field, filter);
        } else {
            self.fields.remove(&field);
        }
    }

    pub fn toggle_value(&mut self, field: &str, value: &str) {
        let mut filter = self.field(field).clone();
        filter.toggle(value);
        self.set_field(field, filter);
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn field(&self, field: &str) -> &FieldFilter {
        static UNCONSTRAINED: FieldFilter = FieldFilter::All;
        self.fields.get(field).unwrap_or(&UNCONSTRAINED)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldFilter)> {
        self.fields.iter().map(|(name, filter)| (name.as_str(), filter))
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.search.clear();
    }

    /// True when any field constraint or search term narrows the list.
    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.fields.values().any(FieldFilter::is_active)
    }

    pub fn matches<R: ListRecord>(&self, record: &R) -> bool {
        self.accepts(record, &self.search.to_lowercase())
    }

    fn accepts<R: ListRecord>(&self, record: &R, needle: &str) -> bool {
        self.fields
            .iter()
            .all(|(field, filter)| filter.accepts(record.category(field)))
            && self.matches_search(record, needle)
    }

    fn matches_search<R: ListRecord>(&self, record: &R, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        R::SEARCH_FIELDS.iter().any(|field| {
            record
                .search_text(field)
                .unwrap_or("")
                .to_lowercase()
                .contains(needle)
        })
    }
}

/// Keeps the records accepted by `spec`, in input order.
pub fn apply_filters<'a, R: ListRecord>(records: &'a [R], spec: &FilterSpec) -> Vec<&'a R> {
    let needle = spec.search.to_lowercase();
    records
        .iter()
        .filter(|record| spec.accepts(*record, &needle))
        .collect()
}
