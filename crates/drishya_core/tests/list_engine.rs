mod support;

use std::borrow::Cow;

use drishya_core::{
    apply_filters, apply_sort, locale_compare, paginate, run, EmptyReason, FieldFilter,
    FilterSpec, IssueSeverity, IssueStatus, IssueType, ListRecord, SortDirection, SortKey,
    SortSpec,
};
use pretty_assertions::assert_eq;
use support::{ids, init_logging, issue, twelve_issues, website, websites};

/// Minimal record with optional fields, for edge cases the real entities
/// cannot express.
#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: &'static str,
    kind: Option<&'static str>,
    note: Option<&'static str>,
    rank: Option<SortKey<'static>>,
}

impl ListRecord for Row {
    const SEARCH_FIELDS: &'static [&'static str] = &["note", "id"];

    fn record_id(&self) -> &str {
        self.id
    }

    fn category(&self, field: &str) -> Option<&str> {
        match field {
            "kind" => self.kind,
            _ => None,
        }
    }

    fn search_text(&self, field: &str) -> Option<&str> {
        match field {
            "note" => self.note,
            "id" => Some(self.id),
            _ => None,
        }
    }

    fn sort_key(&self, field: &str) -> Option<SortKey<'_>> {
        match field {
            "rank" => self.rank.clone(),
            _ => None,
        }
    }

    fn default_sort() -> SortSpec {
        SortSpec::ascending("rank")
    }
}

fn row(id: &'static str, rank: Option<SortKey<'static>>) -> Row {
    Row {
        id,
        kind: None,
        note: None,
        rank,
    }
}

#[test]
fn severity_filter_on_twelve_issues_yields_one_page_of_three() {
    init_logging();
    let issues = twelve_issues();
    let spec = FilterSpec::new().with_field("severity", FieldFilter::parse("critical"));

    let filtered = apply_filters(&issues, &spec);
    assert_eq!(ids(filtered.iter().copied()), vec!["issue-2", "issue-5", "issue-9"]);

    let page = paginate(&filtered, 10, 1);
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.current_page, 1);
    assert_eq!(page.total_pages, 1);
}

#[test]
fn all_means_no_constraint() {
    let issues = twelve_issues();
    let spec = FilterSpec::new().with_field("severity", FieldFilter::parse("all"));

    assert!(!spec.is_active());
    assert_eq!(apply_filters(&issues, &spec).len(), 12);
}

#[test]
fn filtering_is_idempotent() {
    let mut issues = twelve_issues();
    issues[3].description = "Missing alt text on hero".to_string();
    issues[4].title = "ALT text too long".to_string();
    let spec = FilterSpec::new()
        .with_field("severity", FieldFilter::any_of(["critical", "high"]))
        .with_search("alt");

    let once: Vec<_> = apply_filters(&issues, &spec).into_iter().cloned().collect();
    let twice: Vec<_> = apply_filters(&once, &spec).into_iter().cloned().collect();

    assert_eq!(ids(&once), vec!["issue-4", "issue-5"]);
    assert_eq!(once, twice);
}

#[test]
fn multi_select_is_or_within_a_field_and_across_fields() {
    let mut issues = vec![
        issue(1, IssueSeverity::Critical, "a"),
        issue(2, IssueSeverity::High, "b"),
        issue(3, IssueSeverity::Low, "c"),
        issue(4, IssueSeverity::High, "d"),
    ];
    issues[1].status = IssueStatus::Resolved;
    issues[3].issue_type = IssueType::Seo;

    let spec = FilterSpec::new()
        .with_field("severity", FieldFilter::any_of(["critical", "high"]))
        .with_field("status", FieldFilter::only("open"));

    assert_eq!(
        ids(apply_filters(&issues, &spec)),
        vec!["issue-1", "issue-4"]
    );

    let narrower = spec.with_field("type", FieldFilter::only("accessibility"));
    assert_eq!(ids(apply_filters(&issues, &narrower)), vec!["issue-1"]);
}

#[test]
fn toggling_every_value_off_restores_all() {
    let mut spec = FilterSpec::new();
    spec.toggle_value("severity", "critical");
    spec.toggle_value("severity", "high");
    assert_eq!(spec.field("severity"), &FieldFilter::any_of(["critical", "high"]));

    spec.toggle_value("severity", "critical");
    spec.toggle_value("severity", "high");
    assert_eq!(spec.field("severity"), &FieldFilter::All);
    assert!(!spec.is_active());
}

#[test]
fn search_is_case_insensitive_over_any_searchable_field() {
    let mut issues = twelve_issues();
    issues[0].element = "<IMG src=logo.png>".to_string();
    issues[6].description = "Image lacks alternative text".to_string();

    let spec = FilterSpec::new().with_search("img");
    assert_eq!(ids(apply_filters(&issues, &spec)), vec!["issue-1"]);

    let spec = FilterSpec::new().with_search("IMAGE");
    assert_eq!(ids(apply_filters(&issues, &spec)), vec!["issue-7"]);
}

#[test]
fn missing_searchable_field_searches_as_empty() {
    let rows = vec![
        Row {
            note: Some("contrast too low"),
            ..row("r1", None)
        },
        row("r2", None),
    ];

    let spec = FilterSpec::new().with_search("contrast");
    assert_eq!(ids(apply_filters(&rows, &spec)), vec!["r1"]);

    // The id is still searchable when the note is absent.
    let spec = FilterSpec::new().with_search("R2");
    assert_eq!(ids(apply_filters(&rows, &spec)), vec!["r2"]);
}

#[test]
fn record_without_the_filtered_field_is_excluded() {
    let rows = vec![
        Row {
            kind: Some("form"),
            ..row("r1", None)
        },
        row("r2", None),
    ];
    let spec = FilterSpec::new().with_field("kind", FieldFilter::only("form"));

    assert_eq!(ids(apply_filters(&rows, &spec)), vec!["r1"]);
}

#[test]
fn sort_is_stable_in_both_directions() {
    let issues = vec![
        issue(1, IssueSeverity::High, "first high"),
        issue(2, IssueSeverity::Critical, "first critical"),
        issue(3, IssueSeverity::High, "second high"),
        issue(4, IssueSeverity::Critical, "second critical"),
        issue(5, IssueSeverity::High, "third high"),
    ];
    let refs: Vec<_> = issues.iter().collect();

    let ascending = apply_sort(refs.clone(), &SortSpec::ascending("severity"));
    assert_eq!(
        ids(ascending),
        vec!["issue-2", "issue-4", "issue-1", "issue-3", "issue-5"]
    );

    let descending = apply_sort(refs, &SortSpec::descending("severity"));
    assert_eq!(
        ids(descending),
        vec!["issue-1", "issue-3", "issue-5", "issue-2", "issue-4"]
    );
}

#[test]
fn text_sorts_case_insensitively() {
    let sites = vec![
        website(1, "https://cherry.example.com", 0.0),
        website(2, "https://Banana.example.com", 0.0),
        website(3, "https://apple.example.com", 0.0),
    ];

    let sorted = apply_sort(sites.iter().collect(), &SortSpec::ascending("url"));
    assert_eq!(ids(sorted), vec!["site-3", "site-2", "site-1"]);

    assert!(locale_compare("a", "B").is_lt());
    assert!(locale_compare("a", "A").is_lt());
}

#[test]
fn numbers_sort_by_value_not_by_text() {
    let sites = vec![
        website(1, "a", 9.0),
        website(2, "b", 80.0),
        website(3, "c", 100.0),
    ];

    let sorted = apply_sort(sites.iter().collect(), &SortSpec::descending("score"));
    assert_eq!(ids(sorted), vec!["site-3", "site-2", "site-1"]);
}

#[test]
fn mismatched_sort_types_fall_back_to_text() {
    let rows = vec![
        row("number", Some(SortKey::Number(10.0))),
        row("text", Some(SortKey::Text(Cow::Borrowed("9")))),
        row("missing", None),
    ];

    let sorted = apply_sort(rows.iter().collect(), &SortSpec::ascending("rank"));
    // "" < "10" < "9" as text.
    assert_eq!(ids(sorted), vec!["missing", "number", "text"]);
}

#[test]
fn unknown_sort_field_keeps_input_order() {
    let issues = twelve_issues();
    let sorted = apply_sort(issues.iter().collect(), &SortSpec::descending("nonexistent"));
    assert_eq!(ids(sorted), ids(&issues));
}

#[test]
fn dates_sort_chronologically() {
    let mut first = issue(1, IssueSeverity::Low, "a");
    let mut second = issue(2, IssueSeverity::Low, "b");
    first.created_at = "2024-03-01T09:00:00+02:00".to_string();
    second.created_at = "2024-03-01T08:30:00Z".to_string();
    let issues = vec![first, second];

    // 07:00Z sorts before 08:30Z even though the raw text says otherwise.
    let sorted = apply_sort(issues.iter().collect(), &SortSpec::ascending("createdAt"));
    assert_eq!(ids(sorted), vec!["issue-1", "issue-2"]);
}

#[test]
fn header_clicks_toggle_or_reset_direction() {
    let mut sort = SortSpec::ascending("severity");

    sort.select("severity");
    assert_eq!(sort, SortSpec::descending("severity"));

    sort.select("title");
    assert_eq!(sort.field, "title");
    assert_eq!(sort.direction, SortDirection::Ascending);
}

#[test]
fn out_of_range_page_clamps_to_last_page() {
    let sites = websites(25);

    let page = paginate(&sites, 10, 4);
    assert_eq!(page.current_page, 3);
    assert_eq!(page.total_pages, 3);
    assert_eq!(ids(&page.items), ids(&sites[20..]));
}

#[test]
fn page_zero_clamps_to_first_page() {
    let sites = websites(25);

    let page = paginate(&sites, 10, 0);
    assert_eq!(page.current_page, 1);
    assert_eq!(ids(&page.items), ids(&sites[..10]));
}

#[test]
fn empty_input_still_has_one_page() {
    let empty: Vec<u32> = Vec::new();
    for requested in [0, 1, 7] {
        let page = paginate(&empty, 10, requested);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
        assert!(page.items.is_empty());
    }
}

#[test]
fn page_size_zero_is_treated_as_one() {
    let page = paginate(&[1, 2, 3], 0, 2);
    assert_eq!(page.items, vec![2]);
    assert_eq!(page.total_pages, 3);
}

#[test]
fn pipeline_distinguishes_no_records_from_no_matches() {
    let nothing: Vec<drishya_core::Website> = Vec::new();
    let page = run(&nothing, &FilterSpec::new(), &SortSpec::ascending("url"), 10, 1);
    assert_eq!(page.empty_reason(), Some(EmptyReason::NoRecords));
    assert!(!page.filters_active);
    assert_eq!(page.total_pages, 1);

    let sites = websites(3);
    let filter = FilterSpec::new().with_search("no-such-host");
    let page = run(&sites, &filter, &SortSpec::ascending("url"), 10, 1);
    assert_eq!(page.empty_reason(), Some(EmptyReason::NoMatches));
    assert!(page.filters_active);
    assert_eq!(page.total, 3);
    assert_eq!(page.matching, 0);
    assert_eq!(page.total_pages, 1);

    let page = run(&sites, &FilterSpec::new(), &SortSpec::descending("url"), 2, 1);
    assert_eq!(page.empty_reason(), None);
    assert_eq!(ids(page.items), vec!["site-3", "site-2"]);
    assert_eq!(page.total_pages, 2);
}
