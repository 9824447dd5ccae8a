use chrono::{DateTime, Utc};

use crate::{ConnectionState, CrudRequest, FieldFilter, RecordQuery, RecordSet, StatusUpdateEvent, ViewKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// A list screen mounted and should load this query.
    ViewOpened(RecordQuery),
    /// The active list screen unmounted.
    ViewClosed,
    /// User asked to reload the active view.
    RefreshRequested,
    /// Engine finished fetching records.
    RecordsLoaded(RecordSet),
    /// Engine failed to fetch records.
    RecordsFailed { view: ViewKind, message: String },
    /// User edited the search box.
    SearchChanged(String),
    /// User picked a value in a single-select filter.
    FilterChanged { field: String, filter: FieldFilter },
    /// User ticked or unticked one value of a multi-select filter.
    FilterValueToggled { field: String, value: String },
    FiltersCleared,
    /// User clicked a column header.
    SortClicked(String),
    PageRequested(usize),
    NextPage,
    PreviousPage,
    PageSizeChanged(usize),
    /// Live channel delivered an update.
    StatusUpdated {
        event: StatusUpdateEvent,
        received_at: DateTime<Utc>,
    },
    /// Live channel changed state.
    ConnectionChanged(ConnectionState),
    /// User submitted a create/update/delete/start-scan action.
    CrudRequested(CrudRequest),
    /// Engine finished a CRUD action.
    CrudFinished {
        request: CrudRequest,
        result: Result<(), String>,
    },
    BannerDismissed,
}
