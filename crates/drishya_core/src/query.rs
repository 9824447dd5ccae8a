use std::fmt;

use crate::records::{Issue, Project, Scan, TimeRange, Website};

/// The four list screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Issues,
    Scans,
    Websites,
    Projects,
}

impl ViewKind {
    pub fn plural(self) -> &'static str {
        match self {
            ViewKind::Issues => "issues",
            ViewKind::Scans => "scans",
            ViewKind::Websites => "websites",
            ViewKind::Projects => "projects",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            ViewKind::Issues => "issue",
            ViewKind::Scans => "scan",
            ViewKind::Websites => "website",
            ViewKind::Projects => "project",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}

/// Which records a view fetches when it mounts or refreshes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordQuery {
    Projects,
    Websites,
    Scans { time_range: Option<TimeRange> },
    WebsiteScans { website_id: String },
    ScanIssues { scan_id: String },
}

impl RecordQuery {
    pub fn view(&self) -> ViewKind {
        match self {
            RecordQuery::Projects => ViewKind::Projects,
            RecordQuery::Websites => ViewKind::Websites,
            RecordQuery::Scans { .. } | RecordQuery::WebsiteScans { .. } => ViewKind::Scans,
            RecordQuery::ScanIssues { .. } => ViewKind::Issues,
        }
    }
}

/// A fetched record collection, tagged by entity.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSet {
    Issues(Vec<Issue>),
    Scans(Vec<Scan>),
    Websites(Vec<Website>),
    Projects(Vec<Project>),
}

impl RecordSet {
    pub fn view(&self) -> ViewKind {
        match self {
            RecordSet::Issues(_) => ViewKind::Issues,
            RecordSet::Scans(_) => ViewKind::Scans,
            RecordSet::Websites(_) => ViewKind::Websites,
            RecordSet::Projects(_) => ViewKind::Projects,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordSet::Issues(records) => records.len(),
            RecordSet::Scans(records) => records.len(),
            RecordSet::Websites(records) => records.len(),
            RecordSet::Projects(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
