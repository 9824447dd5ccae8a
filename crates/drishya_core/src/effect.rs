use crate::query::{RecordQuery, ViewKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchRecords(RecordQuery),
    ConnectLive,
    DisconnectLive,
    Perform(CrudRequest),
}

/// A user-initiated write against the REST API. Each one is followed by a
/// full refetch of the active view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrudRequest {
    CreateProject {
        name: String,
        description: Option<String>,
    },
    UpdateProject {
        id: String,
        name: String,
        description: Option<String>,
    },
    DeleteProject {
        id: String,
    },
    CreateWebsite {
        url: String,
        project_id: String,
    },
    UpdateWebsite {
        id: String,
        url: String,
        project_id: String,
    },
    DeleteWebsite {
        id: String,
    },
    StartScan {
        website_id: String,
    },
}

impl CrudRequest {
    /// The view whose records this request changes.
    pub fn target(&self) -> ViewKind {
        match self {
            CrudRequest::CreateProject { .. }
            | CrudRequest::UpdateProject { .. }
            | CrudRequest::DeleteProject { .. } => ViewKind::Projects,
            CrudRequest::CreateWebsite { .. }
            | CrudRequest::UpdateWebsite { .. }
            | CrudRequest::DeleteWebsite { .. } => ViewKind::Websites,
            CrudRequest::StartScan { .. } => ViewKind::Scans,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            CrudRequest::CreateProject { name, .. } => format!("create project {name}"),
            CrudRequest::UpdateProject { id, .. } => format!("update project {id}"),
            CrudRequest::DeleteProject { id } => format!("delete project {id}"),
            CrudRequest::CreateWebsite { url, .. } => format!("create website {url}"),
            CrudRequest::UpdateWebsite { id, .. } => format!("update website {id}"),
            CrudRequest::DeleteWebsite { id } => format!("delete website {id}"),
            CrudRequest::StartScan { website_id } => format!("start scan for website {website_id}"),
        }
    }
}
