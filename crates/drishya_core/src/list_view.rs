use chrono::{DateTime, Utc};

use crate::filter::{FieldFilter, FilterSpec};
use crate::page::{self, ListPage, DEFAULT_PAGE_SIZE};
use crate::record::{ListRecord, MergeOutcome};
use crate::sort::SortSpec;
use crate::status::StatusUpdateEvent;

/// List state for one entity: the record set and the controls applied to it.
///
/// The visible page is recomputed from these five inputs on every call to
/// [`ListView::page`]; nothing derived is cached.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<R> {
    records: Vec<R>,
    filter: FilterSpec,
    sort: SortSpec,
    page_size: usize,
    requested_page: usize,
}

impl<R: ListRecord> Default for ListView<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ListRecord> ListView<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            filter: FilterSpec::default(),
            sort: R::default_sort(),
            page_size: DEFAULT_PAGE_SIZE,
            requested_page: 1,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Installs a freshly fetched record set. The page number is kept and
    /// clamped on the next read.
    pub fn replace_records(&mut self, records: Vec<R>) {
        self.records = records;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filter.set_search(term);
        self.requested_page = 1;
    }

    pub fn set_category(&mut self, field: &str, filter: FieldFilter) {
        self.filter.set_field(field, filter);
        self.requested_page = 1;
    }

    pub fn toggle_category_value(&mut self, field: &str, value: &str) {
        self.filter.toggle_value(field, value);
        self.requested_page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
        self.requested_page = 1;
    }

    pub fn select_sort(&mut self, field: &str) {
        self.sort.select(field);
        self.requested_page = 1;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.requested_page = 1;
    }

    pub fn go_to_page(&mut self, page_number: usize) {
        self.requested_page = page_number;
    }

    pub fn next_page(&mut self) {
        self.requested_page = self.current_page() + 1;
    }

    pub fn previous_page(&mut self) {
        self.requested_page = self.current_page().saturating_sub(1).max(1);
    }

    /// Requested page clamped to what the current filters can show.
    pub fn current_page(&self) -> usize {
        let matching = self
            .records
            .iter()
            .filter(|record| self.filter.matches(*record))
            .count();
        self.requested_page
            .clamp(1, page::total_pages(matching, self.page_size))
    }

    pub fn page(&self) -> ListPage<'_, R> {
        page::run(
            &self.records,
            &self.filter,
            &self.sort,
            self.page_size,
            self.requested_page,
        )
    }

    /// Patches the first record targeted by `event`. Later events for the
    /// same record simply overwrite earlier ones.
    pub fn apply_status(
        &mut self,
        event: &StatusUpdateEvent,
        received_at: DateTime<Utc>,
    ) -> MergeOutcome {
        match self
            .records
            .iter_mut()
            .find(|record| record.matches_update(event))
        {
            Some(record) => {
                if record.apply_status(event, received_at) {
                    MergeOutcome::Applied
                } else {
                    MergeOutcome::Unchanged
                }
            }
            None => MergeOutcome::NoMatch,
        }
    }
}
