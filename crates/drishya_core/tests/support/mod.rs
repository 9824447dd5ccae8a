#![allow(dead_code)]

use std::sync::Once;

use drishya_core::{
    Issue, IssueSeverity, IssueStatus, IssueType, Project, ProjectStatus, Scan, ScanStatus,
    Website, WebsiteStatus,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(drishya_logging::initialize_for_tests);
}

pub fn issue(n: usize, severity: IssueSeverity, title: &str) -> Issue {
    Issue {
        id: format!("issue-{n}"),
        scan_id: "scan-1".to_string(),
        issue_type: IssueType::Accessibility,
        severity,
        status: IssueStatus::Open,
        title: title.to_string(),
        description: String::new(),
        location: String::new(),
        element: String::new(),
        url: "https://example.com".to_string(),
        code_snippet: None,
        recommendation: String::new(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

/// Twelve issues, three of them critical (ids 2, 5 and 9).
pub fn twelve_issues() -> Vec<Issue> {
    (1..=12)
        .map(|n| {
            let severity = match n {
                2 | 5 | 9 => IssueSeverity::Critical,
                n if n % 2 == 0 => IssueSeverity::High,
                n if n % 3 == 0 => IssueSeverity::Medium,
                _ => IssueSeverity::Low,
            };
            issue(n, severity, &format!("Issue {n:02}"))
        })
        .collect()
}

pub fn website(n: usize, url: &str, score: f64) -> Website {
    Website {
        id: format!("site-{n}"),
        project_id: "project-1".to_string(),
        url: url.to_string(),
        last_scan: None,
        status: WebsiteStatus::Inactive,
        accessibility_score: score,
        created_at: "2024-01-01T00:00:00Z".to_string(),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

/// Websites `site-01`..`site-NN` whose urls already sort in id order.
pub fn websites(count: usize) -> Vec<Website> {
    (1..=count)
        .map(|n| website(n, &format!("https://site-{n:02}.example.com"), 50.0))
        .collect()
}

pub fn scan(id: &str, website_id: &str, status: ScanStatus, started_at: &str) -> Scan {
    Scan {
        id: id.to_string(),
        website_id: website_id.to_string(),
        website_url: format!("https://{website_id}.example.com"),
        status,
        started_at: started_at.to_string(),
        completed_at: None,
        duration: None,
        error: None,
        issues: Vec::new(),
        created_at: started_at.to_string(),
        updated_at: started_at.to_string(),
    }
}

pub fn project(id: &str, name: &str, status: ProjectStatus) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        website_count: 0,
        last_scan: None,
        status,
    }
}

pub fn ids<'a, R: drishya_core::ListRecord + 'a>(records: impl IntoIterator<Item = &'a R>) -> Vec<String> {
    records
        .into_iter()
        .map(|record| record.record_id().to_string())
        .collect()
}
