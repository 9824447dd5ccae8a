//! DrishyaScan core: the list view engine, the live channel state machine,
//! and the pure application state machine built on them.
mod channel;
mod effect;
mod filter;
mod list_view;
mod msg;
mod page;
mod query;
mod record;
mod records;
mod sort;
mod state;
mod status;
mod update;
mod view_model;

pub use channel::{ChannelAction, ChannelInput, ChannelMachine, ConnectionState, ReconnectPolicy};
pub use effect::{CrudRequest, Effect};
pub use filter::{apply_filters, FieldFilter, FilterSpec, ALL};
pub use list_view::ListView;
pub use msg::Msg;
pub use page::{paginate, run, total_pages, EmptyReason, ListPage, Page, DEFAULT_PAGE_SIZE};
pub use query::{RecordQuery, RecordSet, ViewKind};
pub use record::{locale_compare, ListRecord, MergeOutcome, SortKey};
pub use records::{
    Issue, IssueSeverity, IssueStatus, IssueType, LastScan, Project, ProjectStatus, Scan,
    ScanStatus, TimeRange, Website, WebsiteStatus,
};
pub use sort::{apply_sort, SortDirection, SortSpec};
pub use state::AppState;
pub use status::{LiveStatus, StatusUpdateEvent};
pub use update::update;
pub use view_model::{AppViewModel, PageView, RowView, TableRow};
