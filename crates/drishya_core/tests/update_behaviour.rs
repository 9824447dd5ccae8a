mod support;

use drishya_core::{
    update, AppState, ConnectionState, CrudRequest, Effect, EmptyReason, FieldFilter,
    IssueSeverity, Msg, RecordQuery, RecordSet, SortDirection, SortSpec, ViewKind,
};
use pretty_assertions::assert_eq;
use support::{ids, init_logging, issue, twelve_issues, websites};

fn apply(state: AppState, msgs: impl IntoIterator<Item = Msg>) -> (AppState, Vec<Effect>) {
    msgs.into_iter()
        .fold((state, Vec::new()), |(state, mut effects), msg| {
            let (state, more) = update(state, msg);
            effects.extend(more);
            (state, effects)
        })
}

fn issues_view() -> AppState {
    let query = RecordQuery::ScanIssues {
        scan_id: "scan-1".to_string(),
    };
    let (state, _) = apply(
        AppState::new(),
        [
            Msg::ViewOpened(query),
            Msg::RecordsLoaded(RecordSet::Issues(twelve_issues())),
        ],
    );
    state
}

#[test]
fn opening_a_view_fetches_and_connects() {
    init_logging();
    let query = RecordQuery::Websites;
    let (state, effects) = update(AppState::new(), Msg::ViewOpened(query.clone()));

    assert_eq!(effects, vec![Effect::FetchRecords(query.clone()), Effect::ConnectLive]);
    assert_eq!(state.active_query(), Some(&query));
    assert!(state.is_busy());
    assert!(state.view().loading);
}

#[test]
fn closing_disconnects_only_when_a_view_was_open() {
    let (state, effects) = update(AppState::new(), Msg::ViewClosed);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::ViewOpened(RecordQuery::Projects));
    let (state, effects) = update(state, Msg::ViewClosed);
    assert_eq!(effects, vec![Effect::DisconnectLive]);
    assert_eq!(state.active_view(), None);
}

#[test]
fn loading_records_clears_the_busy_flag() {
    let state = issues_view();
    let view = state.view();

    assert!(!view.loading);
    let page = view.page.expect("issues page");
    assert_eq!(page.view, ViewKind::Issues);
    assert_eq!(page.total, 12);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.rows.len(), 10);
    // Default ordering for issues is severity, descending.
    assert_eq!(page.sort, SortSpec::descending("severity"));
}

#[test]
fn severity_filter_message_narrows_to_three_rows() {
    let (state, effects) = apply(
        issues_view(),
        [Msg::FilterChanged {
            field: "severity".to_string(),
            filter: FieldFilter::parse("critical"),
        }],
    );
    assert!(effects.is_empty());

    let page = state.view().page.expect("issues page");
    let mut rows: Vec<_> = page.rows.iter().map(|row| row.id.clone()).collect();
    rows.sort();
    assert_eq!(rows, vec!["issue-2", "issue-5", "issue-9"]);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.current_page, 1);
    assert_eq!(
        page.filters,
        vec![("severity".to_string(), vec!["critical".to_string()])]
    );
}

#[test]
fn header_clicks_cycle_direction_and_switch_fields() {
    let mut state = issues_view();
    for field in ["severity", "severity"] {
        state = update(state, Msg::SortClicked(field.to_string())).0;
    }
    // Default severity desc, then asc, then desc again.
    assert_eq!(state.issues().sort(), &SortSpec::descending("severity"));

    let (state, _) = update(state, Msg::SortClicked("title".to_string()));
    assert_eq!(state.issues().sort().field, "title");
    assert_eq!(state.issues().sort().direction, SortDirection::Ascending);
}

#[test]
fn filter_changes_return_to_the_first_page() {
    let (state, _) = apply(issues_view(), [Msg::NextPage]);
    assert_eq!(state.issues().current_page(), 2);

    let (state, _) = apply(state, [Msg::SearchChanged("issue".to_string())]);
    assert_eq!(state.issues().current_page(), 1);

    let (state, _) = apply(state, [Msg::PageRequested(2), Msg::SortClicked("title".to_string())]);
    assert_eq!(state.issues().current_page(), 1);
}

#[test]
fn page_navigation_clamps_at_both_ends() {
    let (state, _) = apply(issues_view(), [Msg::PreviousPage]);
    assert_eq!(state.issues().current_page(), 1);

    let (state, _) = apply(state, [Msg::PageRequested(9)]);
    assert_eq!(state.issues().current_page(), 2);

    let (state, _) = apply(state, [Msg::NextPage, Msg::NextPage]);
    assert_eq!(state.issues().current_page(), 2);
}

#[test]
fn page_size_change_repaginates() {
    let (state, _) = apply(issues_view(), [Msg::PageSizeChanged(5)]);
    let page = state.view().page.expect("issues page");
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.rows.len(), 5);
}

#[test]
fn list_messages_without_an_open_view_are_ignored() {
    let (mut state, effects) = apply(
        AppState::new(),
        [
            Msg::SearchChanged("x".to_string()),
            Msg::NextPage,
            Msg::SortClicked("url".to_string()),
        ],
    );
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert_eq!(state.websites().filter().search(), "");
}

#[test]
fn empty_collection_and_excluding_filters_read_differently() {
    let (state, _) = apply(
        AppState::new(),
        [
            Msg::ViewOpened(RecordQuery::Websites),
            Msg::RecordsLoaded(RecordSet::Websites(Vec::new())),
        ],
    );
    let page = state.view().page.expect("websites page");
    assert_eq!(page.empty, Some(EmptyReason::NoRecords));
    assert_eq!(page.empty_message().as_deref(), Some("No websites found"));
    assert_eq!(page.total_pages, 1);

    let (state, _) = apply(
        state,
        [
            Msg::RecordsLoaded(RecordSet::Websites(websites(4))),
            Msg::SearchChanged("nowhere".to_string()),
        ],
    );
    let page = state.view().page.expect("websites page");
    assert_eq!(page.empty, Some(EmptyReason::NoMatches));
    assert_eq!(
        page.empty_message().as_deref(),
        Some("No websites match the current filters. Try adjusting your filters.")
    );

    let (state, _) = apply(state, [Msg::FiltersCleared]);
    let page = state.view().page.expect("websites page");
    assert_eq!(page.empty, None);
    assert_eq!(page.rows.len(), 4);
}

#[test]
fn refetch_keeps_the_page_but_clamps_it() {
    let (state, _) = apply(
        AppState::new(),
        [
            Msg::ViewOpened(RecordQuery::Websites),
            Msg::RecordsLoaded(RecordSet::Websites(websites(25))),
            Msg::PageRequested(3),
        ],
    );
    assert_eq!(state.websites().current_page(), 3);

    let (state, _) = apply(state, [Msg::RecordsLoaded(RecordSet::Websites(websites(15)))]);
    assert_eq!(state.websites().current_page(), 2);
    let page = state.view().page.expect("websites page");
    assert_eq!(page.rows.len(), 5);
}

#[test]
fn fetch_failure_raises_a_banner_for_the_active_view() {
    let (state, _) = apply(
        AppState::new(),
        [
            Msg::ViewOpened(RecordQuery::Projects),
            Msg::RecordsFailed {
                view: ViewKind::Projects,
                message: "connection refused".to_string(),
            },
        ],
    );
    assert_eq!(state.banner(), Some("Failed to fetch projects: connection refused"));
    assert!(!state.is_busy());

    let (state, _) = update(state, Msg::BannerDismissed);
    assert_eq!(state.banner(), None);
}

#[test]
fn fetch_failure_for_another_view_is_quiet() {
    let (state, _) = apply(
        AppState::new(),
        [
            Msg::ViewOpened(RecordQuery::Projects),
            Msg::RecordsFailed {
                view: ViewKind::Scans,
                message: "timeout".to_string(),
            },
        ],
    );
    assert_eq!(state.banner(), None);
    assert!(state.is_busy());
}

#[test]
fn refresh_refetches_the_active_query() {
    let query = RecordQuery::WebsiteScans {
        website_id: "site-1".to_string(),
    };
    let (state, effects) = apply(
        AppState::new(),
        [
            Msg::ViewOpened(query.clone()),
            Msg::RecordsLoaded(RecordSet::Scans(Vec::new())),
            Msg::RefreshRequested,
        ],
    );
    assert_eq!(
        effects,
        vec![
            Effect::FetchRecords(query.clone()),
            Effect::ConnectLive,
            Effect::FetchRecords(query),
        ]
    );
    assert!(state.is_busy());
}

#[test]
fn successful_crud_triggers_a_full_refetch() {
    let request = CrudRequest::DeleteWebsite {
        id: "site-3".to_string(),
    };
    let (state, _) = apply(
        AppState::new(),
        [
            Msg::ViewOpened(RecordQuery::Websites),
            Msg::RecordsLoaded(RecordSet::Websites(websites(3))),
        ],
    );

    let (state, effects) = update(state, Msg::CrudRequested(request.clone()));
    assert_eq!(effects, vec![Effect::Perform(request.clone())]);
    assert!(state.is_busy());

    let (state, effects) = update(
        state,
        Msg::CrudFinished {
            request,
            result: Ok(()),
        },
    );
    assert_eq!(effects, vec![Effect::FetchRecords(RecordQuery::Websites)]);
    assert_eq!(state.banner(), None);
}

#[test]
fn failed_crud_reports_without_refetching() {
    let request = CrudRequest::StartScan {
        website_id: "site-1".to_string(),
    };
    let (state, effects) = apply(
        AppState::new(),
        [
            Msg::ViewOpened(RecordQuery::Websites),
            Msg::RecordsLoaded(RecordSet::Websites(websites(1))),
            Msg::CrudRequested(request.clone()),
            Msg::CrudFinished {
                request,
                result: Err("HTTP 500".to_string()),
            },
        ],
    );
    assert_eq!(effects.len(), 3);
    assert_eq!(
        state.banner(),
        Some("Failed to start scan for website site-1: HTTP 500")
    );
    assert!(!state.is_busy());
}

#[test]
fn connection_changes_are_reflected_in_the_view_model() {
    let (mut state, _) = update(
        AppState::new(),
        Msg::ConnectionChanged(ConnectionState::Connecting),
    );
    assert!(state.consume_dirty());
    assert_eq!(state.view().connection, ConnectionState::Connecting);

    let (mut state, _) = update(state, Msg::ConnectionChanged(ConnectionState::Connecting));
    assert!(!state.consume_dirty());
}

#[test]
fn loads_for_inactive_views_are_kept_for_later() {
    let issues = vec![issue(1, IssueSeverity::Low, "kept")];
    let (state, _) = apply(
        AppState::new(),
        [
            Msg::ViewOpened(RecordQuery::Websites),
            Msg::RecordsLoaded(RecordSet::Issues(issues)),
        ],
    );
    assert!(state.is_busy());
    assert_eq!(ids(state.issues().records()), vec!["issue-1"]);
}
