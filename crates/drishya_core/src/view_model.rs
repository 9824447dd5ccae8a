use crate::filter::FieldFilter;
use crate::list_view::ListView;
use crate::page::EmptyReason;
use crate::query::ViewKind;
use crate::record::ListRecord;
use crate::records::{Issue, Project, Scan, Website};
use crate::sort::SortSpec;
use crate::ConnectionState;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub active: Option<ViewKind>,
    pub loading: bool,
    pub busy: bool,
    pub connection: ConnectionState,
    pub banner: Option<String>,
    pub page: Option<PageView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub view: ViewKind,
    pub columns: Vec<&'static str>,
    pub rows: Vec<RowView>,
    pub current_page: usize,
    pub total_pages: usize,
    pub matching: usize,
    pub total: usize,
    pub filters_active: bool,
    pub empty: Option<EmptyReason>,
    pub search: String,
    /// Active categorical filters as (field, selected values).
    pub filters: Vec<(String, Vec<String>)>,
    pub sort: SortSpec,
}

impl PageView {
    /// Text shown in place of rows, distinguishing an empty collection from
    /// filters that exclude everything.
    pub fn empty_message(&self) -> Option<String> {
        match self.empty? {
            EmptyReason::NoRecords => Some(format!("No {} found", self.view.plural())),
            EmptyReason::NoMatches => Some(format!(
                "No {} match the current filters. Try adjusting your filters.",
                self.view.plural()
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: String,
    pub cells: Vec<String>,
}

/// Column layout for a record rendered as a table row.
pub trait TableRow: ListRecord {
    const COLUMNS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

pub(crate) fn page_view<R: TableRow>(view: ViewKind, list: &ListView<R>) -> PageView {
    let page = list.page();
    let empty = page.empty_reason();
    let rows = page
        .items
        .iter()
        .map(|record| RowView {
            id: record.record_id().to_string(),
            cells: record.cells(),
        })
        .collect();
    let filters = list
        .filter()
        .fields()
        .filter_map(|(field, filter)| match filter {
            FieldFilter::AnyOf(values) if !values.is_empty() => {
                Some((field.to_string(), values.iter().cloned().collect()))
            }
            _ => None,
        })
        .collect();
    PageView {
        view,
        columns: R::COLUMNS.to_vec(),
        rows,
        current_page: page.current_page,
        total_pages: page.total_pages,
        matching: page.matching,
        total: page.total,
        filters_active: page.filters_active,
        empty,
        search: list.filter().search().to_string(),
        filters,
        sort: list.sort().clone(),
    }
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => "-".to_string(),
    }
}

impl TableRow for Issue {
    const COLUMNS: &'static [&'static str] = &["severity", "title", "type", "status", "element"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.severity.as_str().to_string(),
            self.title.clone(),
            self.issue_type.as_str().to_string(),
            self.status.as_str().to_string(),
            or_dash(Some(&self.element)),
        ]
    }
}

impl TableRow for Scan {
    const COLUMNS: &'static [&'static str] =
        &["id", "website", "status", "started", "duration", "issues"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            or_dash(Some(&self.website_url)),
            self.status.as_str().to_string(),
            or_dash(Some(&self.started_at)),
            self.duration
                .map(|seconds| format!("{seconds:.0}s"))
                .unwrap_or_else(|| "-".to_string()),
            self.issues.len().to_string(),
        ]
    }
}

impl TableRow for Website {
    const COLUMNS: &'static [&'static str] = &["url", "status", "score", "last scan"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.url.clone(),
            self.status.as_str().to_string(),
            format!("{:.0}", self.accessibility_score),
            self.last_scan
                .as_ref()
                .map(|last| format!("{} ({})", last.start_time, last.status.as_str()))
                .unwrap_or_else(|| "never".to_string()),
        ]
    }
}

impl TableRow for Project {
    const COLUMNS: &'static [&'static str] =
        &["name", "status", "websites", "last scan", "description"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.status.as_str().to_string(),
            self.website_count.to_string(),
            or_dash(self.last_scan.as_deref()),
            or_dash(Some(&self.description)),
        ]
    }
}
