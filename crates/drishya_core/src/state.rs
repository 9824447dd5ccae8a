use chrono::{DateTime, Utc};
use drishya_logging::{drishya_debug, drishya_warn};

use crate::filter::FieldFilter;
use crate::list_view::ListView;
use crate::query::{RecordQuery, RecordSet, ViewKind};
use crate::record::{ListRecord, MergeOutcome};
use crate::records::{Issue, Project, Scan, Website};
use crate::status::StatusUpdateEvent;
use crate::view_model::{page_view, AppViewModel};
use crate::ConnectionState;

/// List operations the update function applies to whichever view is active.
pub(crate) trait ListControls {
    fn set_search(&mut self, term: String);
    fn set_category(&mut self, field: &str, filter: FieldFilter);
    fn toggle_category_value(&mut self, field: &str, value: &str);
    fn clear_filters(&mut self);
    fn select_sort(&mut self, field: &str);
    fn go_to_page(&mut self, page_number: usize);
    fn next_page(&mut self);
    fn previous_page(&mut self);
    fn set_page_size(&mut self, page_size: usize);
}

impl<R: ListRecord> ListControls for ListView<R> {
    fn set_search(&mut self, term: String) {
        ListView::set_search(self, term);
    }

    fn set_category(&mut self, field: &str, filter: FieldFilter) {
        ListView::set_category(self, field, filter);
    }

    fn toggle_category_value(&mut self, field: &str, value: &str) {
        ListView::toggle_category_value(self, field, value);
    }

    fn clear_filters(&mut self) {
        ListView::clear_filters(self);
    }

    fn select_sort(&mut self, field: &str) {
        ListView::select_sort(self, field);
    }

    fn go_to_page(&mut self, page_number: usize) {
        ListView::go_to_page(self, page_number);
    }

    fn next_page(&mut self) {
        ListView::next_page(self);
    }

    fn previous_page(&mut self) {
        ListView::previous_page(self);
    }

    fn set_page_size(&mut self, page_size: usize) {
        ListView::set_page_size(self, page_size);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    issues: ListView<Issue>,
    scans: ListView<Scan>,
    websites: ListView<Website>,
    projects: ListView<Project>,
    active: Option<RecordQuery>,
    loading: bool,
    pending_crud: usize,
    connection: ConnectionState,
    banner: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.issues.set_page_size(page_size);
        self.scans.set_page_size(page_size);
        self.websites.set_page_size(page_size);
        self.projects.set_page_size(page_size);
        self
    }

    pub fn view(&self) -> AppViewModel {
        let page = self.active_view().map(|view| match view {
            ViewKind::Issues => page_view(view, &self.issues),
            ViewKind::Scans => page_view(view, &self.scans),
            ViewKind::Websites => page_view(view, &self.websites),
            ViewKind::Projects => page_view(view, &self.projects),
        });
        AppViewModel {
            active: self.active_view(),
            loading: self.loading,
            busy: self.is_busy(),
            connection: self.connection,
            banner: self.banner.clone(),
            page,
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn active_query(&self) -> Option<&RecordQuery> {
        self.active.as_ref()
    }

    pub fn active_view(&self) -> Option<ViewKind> {
        self.active.as_ref().map(RecordQuery::view)
    }

    /// A fetch or CRUD call is still outstanding.
    pub fn is_busy(&self) -> bool {
        self.loading || self.pending_crud > 0
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn issues(&self) -> &ListView<Issue> {
        &self.issues
    }

    pub fn scans(&self) -> &ListView<Scan> {
        &self.scans
    }

    pub fn websites(&self) -> &ListView<Website> {
        &self.websites
    }

    pub fn projects(&self) -> &ListView<Project> {
        &self.projects
    }

    pub(crate) fn open(&mut self, query: RecordQuery) {
        self.active = Some(query);
        self.loading = true;
        self.banner = None;
        self.mark_dirty();
    }

    /// Returns false when no view was open.
    pub(crate) fn close(&mut self) -> bool {
        let was_open = self.active.take().is_some();
        if was_open {
            self.loading = false;
            self.mark_dirty();
        }
        was_open
    }

    pub(crate) fn begin_refresh(&mut self) -> Option<RecordQuery> {
        let query = self.active.clone()?;
        self.loading = true;
        self.mark_dirty();
        Some(query)
    }

    pub(crate) fn load(&mut self, records: RecordSet) {
        let view = records.view();
        drishya_debug!("Loaded {} {}", records.len(), view);
        match records {
            RecordSet::Issues(records) => self.issues.replace_records(records),
            RecordSet::Scans(records) => self.scans.replace_records(records),
            RecordSet::Websites(records) => self.websites.replace_records(records),
            RecordSet::Projects(records) => self.projects.replace_records(records),
        }
        if self.active_view() == Some(view) {
            self.loading = false;
        }
        self.mark_dirty();
    }

    pub(crate) fn fail_load(&mut self, view: ViewKind, message: &str) {
        drishya_warn!("Failed to fetch {}: {}", view, message);
        if self.active_view() == Some(view) {
            self.loading = false;
            self.banner = Some(format!("Failed to fetch {view}: {message}"));
            self.mark_dirty();
        }
    }

    pub(crate) fn with_active_list(&mut self, apply: impl FnOnce(&mut dyn ListControls)) -> bool {
        let Some(view) = self.active_view() else {
            return false;
        };
        match view {
            ViewKind::Issues => apply(&mut self.issues),
            ViewKind::Scans => apply(&mut self.scans),
            ViewKind::Websites => apply(&mut self.websites),
            ViewKind::Projects => apply(&mut self.projects),
        }
        self.mark_dirty();
        true
    }

    /// Merges a live update into every loaded collection it targets. A
    /// failure reported against a record on screen raises the banner.
    pub(crate) fn merge_status(
        &mut self,
        event: &StatusUpdateEvent,
        received_at: DateTime<Utc>,
    ) -> MergeOutcome {
        let outcomes = [
            (ViewKind::Websites, self.websites.apply_status(event, received_at)),
            (ViewKind::Scans, self.scans.apply_status(event, received_at)),
            (ViewKind::Issues, self.issues.apply_status(event, received_at)),
            (ViewKind::Projects, self.projects.apply_status(event, received_at)),
        ];

        if let (Some(active), Some(error)) = (self.active_view(), event.failure()) {
            let on_screen = outcomes
                .iter()
                .any(|(view, outcome)| *view == active && *outcome != MergeOutcome::NoMatch);
            if on_screen {
                self.banner = Some(format!("Scan failed for {}: {error}", active.singular()));
                self.mark_dirty();
            }
        }

        let merged = outcomes
            .iter()
            .map(|(_, outcome)| *outcome)
            .fold(MergeOutcome::NoMatch, |acc, outcome| match (acc, outcome) {
                (MergeOutcome::Applied, _) | (_, MergeOutcome::Applied) => MergeOutcome::Applied,
                (MergeOutcome::Unchanged, _) | (_, MergeOutcome::Unchanged) => {
                    MergeOutcome::Unchanged
                }
                _ => MergeOutcome::NoMatch,
            });
        if merged == MergeOutcome::Applied {
            self.mark_dirty();
        } else if merged == MergeOutcome::NoMatch {
            drishya_debug!("Live update for unknown record {}", event.record_id);
        }
        merged
    }

    pub(crate) fn set_connection(&mut self, connection: ConnectionState) {
        if self.connection != connection {
            self.connection = connection;
            self.mark_dirty();
        }
    }

    pub(crate) fn begin_crud(&mut self) {
        self.pending_crud += 1;
        self.mark_dirty();
    }

    pub(crate) fn finish_crud(&mut self) {
        self.pending_crud = self.pending_crud.saturating_sub(1);
        self.mark_dirty();
    }

    pub(crate) fn set_banner(&mut self, message: String) {
        self.banner = Some(message);
        self.mark_dirty();
    }

    pub(crate) fn clear_banner(&mut self) {
        if self.banner.take().is_some() {
            self.mark_dirty();
        }
    }
}
