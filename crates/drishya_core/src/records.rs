//! Entities listed by the DrishyaScan views and their list accessors.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{ListRecord, SortKey};
use crate::sort::SortSpec;
use crate::status::{LiveStatus, StatusUpdateEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl IssueSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueSeverity::Critical => "critical",
            IssueSeverity::High => "high",
            IssueSeverity::Medium => "medium",
            IssueSeverity::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    InProgress,
    Resolved,
    FalsePositive,
    WontFix,
}

impl IssueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Resolved => "resolved",
            IssueStatus::FalsePositive => "false_positive",
            IssueStatus::WontFix => "wont_fix",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Security,
    Performance,
    Accessibility,
    Seo,
}

impl IssueType {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueType::Security => "security",
            IssueType::Performance => "performance",
            IssueType::Accessibility => "accessibility",
            IssueType::Seo => "seo",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    #[serde(default)]
    pub scan_id: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: IssueSeverity,
    pub status: IssueStatus,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub element: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl ListRecord for Issue {
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "description", "element"];

    fn record_id(&self) -> &str {
        &self.id
    }

    fn category(&self, field: &str) -> Option<&str> {
        match field {
            "severity" => Some(self.severity.as_str()),
            "status" => Some(self.status.as_str()),
            "type" => Some(self.issue_type.as_str()),
            "scanId" => Some(&self.scan_id),
            _ => None,
        }
    }

    fn search_text(&self, field: &str) -> Option<&str> {
        match field {
            "title" => Some(&self.title),
            "description" => Some(&self.description),
            "element" => Some(&self.element),
            "location" => Some(&self.location),
            "codeSnippet" => self.code_snippet.as_deref(),
            _ => None,
        }
    }

    fn sort_key(&self, field: &str) -> Option<SortKey<'_>> {
        match field {
            "severity" => Some(SortKey::text(self.severity.as_str())),
            "status" => Some(SortKey::text(self.status.as_str())),
            "type" => Some(SortKey::text(self.issue_type.as_str())),
            "title" => Some(SortKey::text(&self.title)),
            "createdAt" => Some(SortKey::date(&self.created_at)),
            "updatedAt" => Some(SortKey::date(&self.updated_at)),
            _ => None,
        }
    }

    fn default_sort() -> SortSpec {
        SortSpec::descending("severity")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Running => "running",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }
}

impl From<LiveStatus> for ScanStatus {
    fn from(status: LiveStatus) -> Self {
        match status {
            LiveStatus::Pending => ScanStatus::Pending,
            LiveStatus::Scanning => ScanStatus::Running,
            LiveStatus::Completed => ScanStatus::Completed,
            LiveStatus::Failed => ScanStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scan {
    pub id: String,
    #[serde(default)]
    pub website_id: String,
    #[serde(default)]
    pub website_url: String,
    pub status: ScanStatus,
    #[serde(default, alias = "startTime")]
    pub started_at: String,
    #[serde(default, alias = "endTime", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl ListRecord for Scan {
    const SEARCH_FIELDS: &'static [&'static str] = &["websiteUrl"];

    fn record_id(&self) -> &str {
        &self.id
    }

    fn category(&self, field: &str) -> Option<&str> {
        match field {
            "status" => Some(self.status.as_str()),
            "websiteId" => Some(&self.website_id),
            _ => None,
        }
    }

    fn search_text(&self, field: &str) -> Option<&str> {
        match field {
            "websiteUrl" => Some(&self.website_url),
            "error" => self.error.as_deref(),
            _ => None,
        }
    }

    fn sort_key(&self, field: &str) -> Option<SortKey<'_>> {
        match field {
            "startedAt" => Some(SortKey::date(&self.started_at)),
            "completedAt" => self.completed_at.as_deref().map(SortKey::date),
            "websiteUrl" => Some(SortKey::text(&self.website_url)),
            "status" => Some(SortKey::text(self.status.as_str())),
            "duration" => Some(SortKey::Number(self.duration.unwrap_or(0.0))),
            "issueCount" => Some(SortKey::Number(self.issues.len() as f64)),
            _ => None,
        }
    }

    fn default_sort() -> SortSpec {
        SortSpec::descending("startedAt")
    }

    /// Scan updates are keyed by scan id; bare updates fall back to the record id.
    fn matches_update(&self, event: &StatusUpdateEvent) -> bool {
        match event.scan_id.as_deref() {
            Some(scan_id) => scan_id == self.id,
            None => event.record_id == self.id,
        }
    }

    fn apply_status(&mut self, event: &StatusUpdateEvent, received_at: DateTime<Utc>) -> bool {
        let before = self.clone();
        self.status = event.new_status.into();
        match event.new_status {
            LiveStatus::Completed => {
                self.completed_at = Some(received_at.to_rfc3339());
                self.error = None;
            }
            LiveStatus::Failed => {
                self.error = event.error.clone();
            }
            LiveStatus::Pending | LiveStatus::Scanning => {
                self.completed_at = None;
                self.error = None;
            }
        }
        *self != before
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebsiteStatus {
    Active,
    Inactive,
}

impl WebsiteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WebsiteStatus::Active => "active",
            WebsiteStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastScan {
    pub id: String,
    pub status: ScanStatus,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    pub id: String,
    #[serde(default)]
    pub project_id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scan: Option<LastScan>,
    pub status: WebsiteStatus,
    #[serde(default)]
    pub accessibility_score: f64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl ListRecord for Website {
    const SEARCH_FIELDS: &'static [&'static str] = &["url"];

    fn record_id(&self) -> &str {
        &self.id
    }

    fn category(&self, field: &str) -> Option<&str> {
        match field {
            "status" => Some(self.status.as_str()),
            "projectId" => Some(&self.project_id),
            _ => None,
        }
    }

    fn search_text(&self, field: &str) -> Option<&str> {
        match field {
            "url" => Some(&self.url),
            _ => None,
        }
    }

    fn sort_key(&self, field: &str) -> Option<SortKey<'_>> {
        match field {
            "url" => Some(SortKey::text(&self.url)),
            "score" => Some(SortKey::Number(self.accessibility_score)),
            "lastScan" => Some(match &self.last_scan {
                Some(last) => SortKey::date(&last.start_time),
                None => SortKey::Number(0.0),
            }),
            "createdAt" => Some(SortKey::date(&self.created_at)),
            _ => None,
        }
    }

    fn default_sort() -> SortSpec {
        SortSpec::ascending("url")
    }

    fn apply_status(&mut self, event: &StatusUpdateEvent, received_at: DateTime<Utc>) -> bool {
        let before = self.clone();
        self.status = match event.new_status {
            LiveStatus::Scanning => WebsiteStatus::Active,
            _ => WebsiteStatus::Inactive,
        };
        if event.new_status == LiveStatus::Completed {
            let stamp = received_at.to_rfc3339();
            self.last_scan = Some(LastScan {
                id: event.scan_id.clone().unwrap_or_default(),
                status: ScanStatus::Completed,
                start_time: stamp.clone(),
                end_time: Some(stamp),
            });
            // A zero or missing progress keeps the previous score.
            if let Some(progress) = event.progress.filter(|progress| *progress != 0.0) {
                self.accessibility_score = progress;
            }
        }
        *self != before
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scan: Option<String>,
    pub status: ProjectStatus,
}

impl ListRecord for Project {
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "description"];

    fn record_id(&self) -> &str {
        &self.id
    }

    fn category(&self, field: &str) -> Option<&str> {
        match field {
            "status" => Some(self.status.as_str()),
            _ => None,
        }
    }

    fn search_text(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            "description" => Some(&self.description),
            _ => None,
        }
    }

    fn sort_key(&self, field: &str) -> Option<SortKey<'_>> {
        match field {
            "name" => Some(SortKey::text(&self.name)),
            "websiteCount" => Some(SortKey::Number(f64::from(self.website_count))),
            "lastScan" => Some(match self.last_scan.as_deref() {
                Some(raw) => SortKey::date(raw),
                None => SortKey::Number(0.0),
            }),
            _ => None,
        }
    }

    fn default_sort() -> SortSpec {
        SortSpec::ascending("name")
    }
}

/// Window accepted by the scan listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    Week,
    Month,
    Year,
}

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }
}
