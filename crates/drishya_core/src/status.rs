use serde::{Deserialize, Serialize};

/// Status carried by a live update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveStatus {
    Pending,
    #[serde(alias = "running")]
    Scanning,
    Completed,
    Failed,
}

impl LiveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LiveStatus::Pending => "pending",
            LiveStatus::Scanning => "scanning",
            LiveStatus::Completed => "completed",
            LiveStatus::Failed => "failed",
        }
    }
}

/// Server-pushed notification that a record's status changed.
///
/// Accepts the scan-update names the server sends (`websiteId`, `status`)
/// as well as the generic `recordId` / `newStatus`. When a payload carries
/// both, the generic name wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WireUpdate")]
pub struct StatusUpdateEvent {
    pub record_id: String,
    pub new_status: LiveStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUpdate {
    record_id: Option<String>,
    website_id: Option<String>,
    new_status: Option<LiveStatus>,
    status: Option<LiveStatus>,
    scan_id: Option<String>,
    progress: Option<f64>,
    error: Option<String>,
}

impl TryFrom<WireUpdate> for StatusUpdateEvent {
    type Error = String;

    fn try_from(wire: WireUpdate) -> Result<Self, Self::Error> {
        let record_id = wire
            .record_id
            .or(wire.website_id)
            .ok_or_else(|| "missing field `recordId`".to_string())?;
        let new_status = wire
            .new_status
            .or(wire.status)
            .ok_or_else(|| "missing field `newStatus`".to_string())?;
        Ok(Self {
            record_id,
            new_status,
            scan_id: wire.scan_id,
            progress: wire.progress,
            error: wire.error,
        })
    }
}

impl StatusUpdateEvent {
    pub fn new(record_id: impl Into<String>, new_status: LiveStatus) -> Self {
        Self {
            record_id: record_id.into(),
            new_status,
            scan_id: None,
            progress: None,
            error: None,
        }
    }

    pub fn with_scan(mut self, scan_id: impl Into<String>) -> Self {
        self.scan_id = Some(scan_id.into());
        self
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Error message of a failed update, if any.
    pub fn failure(&self) -> Option<&str> {
        match self.new_status {
            LiveStatus::Failed => self.error.as_deref(),
            _ => None,
        }
    }
}
