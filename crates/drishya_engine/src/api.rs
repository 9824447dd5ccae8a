use std::sync::Arc;

use async_trait::async_trait;
use drishya_core::{CrudRequest, Issue, Project, RecordQuery, RecordSet, Scan, TimeRange, Website};
use drishya_logging::{drishya_debug, drishya_info, drishya_warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::EngineConfig;
use crate::session::SessionProvider;
use crate::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ProjectBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WebsiteBody<'a> {
    url: &'a str,
    project_id: &'a str,
}

/// Where list records come from and where writes go.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self, query: &RecordQuery) -> Result<RecordSet, ApiError>;

    async fn perform(&self, request: &CrudRequest) -> Result<(), ApiError>;
}

/// JSON client for the DrishyaScan REST API.
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
    session: Arc<dyn SessionProvider>,
}

impl ApiClient {
    pub fn new(config: &EngineConfig, session: Arc<dyn SessionProvider>) -> Result<Self, ApiError> {
        let base =
            Url::parse(&config.api_url).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!("{base} cannot be a base url")));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self {
            base,
            client,
            session,
        })
    }

    pub fn session(&self) -> &Arc<dyn SessionProvider> {
        &self.session
    }

    /// Signs in and stores the returned token in the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let body = encode(&Credentials { email, password })?;
        let response: LoginResponse = self
            .request_json(Method::POST, &["auth", "login"], &[], Some(body))
            .await?;
        self.session.set_token(response.token);
        drishya_info!("Signed in as {}", response.user.email);
        Ok(response.user)
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.request_json(Method::GET, &["auth", "me"], &[], None).await
    }

    pub fn logout(&self) {
        self.session.clear();
    }

    pub async fn projects(&self) -> Result<Vec<Project>, ApiError> {
        self.request_json(Method::GET, &["projects"], &[], None).await
    }

    pub async fn create_project(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project, ApiError> {
        let body = encode(&ProjectBody { name, description })?;
        self.request_json(Method::POST, &["projects"], &[], Some(body))
            .await
    }

    pub async fn update_project(
        &self,
        id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project, ApiError> {
        let body = encode(&ProjectBody { name, description })?;
        self.request_json(Method::PUT, &["projects", id], &[], Some(body))
            .await
    }

    pub async fn delete_project(&self, id: &str) -> Result<(), ApiError> {
        self.request(Method::DELETE, &["projects", id], &[], None)
            .await
            .map(drop)
    }

    pub async fn websites(&self) -> Result<Vec<Website>, ApiError> {
        self.request_json(Method::GET, &["websites"], &[], None).await
    }

    pub async fn create_website(&self, url: &str, project_id: &str) -> Result<Website, ApiError> {
        let body = encode(&WebsiteBody { url, project_id })?;
        self.request_json(Method::POST, &["websites"], &[], Some(body))
            .await
    }

    pub async fn update_website(
        &self,
        id: &str,
        url: &str,
        project_id: &str,
    ) -> Result<Website, ApiError> {
        let body = encode(&WebsiteBody { url, project_id })?;
        self.request_json(Method::PUT, &["websites", id], &[], Some(body))
            .await
    }

    pub async fn delete_website(&self, id: &str) -> Result<(), ApiError> {
        self.request(Method::DELETE, &["websites", id], &[], None)
            .await
            .map(drop)
    }

    /// Starts a scan. The server answers with the new scan record, which is
    /// returned as-is.
    pub async fn start_scan(&self, website_id: &str) -> Result<Scan, ApiError> {
        self.request_json(Method::POST, &["websites", website_id, "scan"], &[], None)
            .await
    }

    pub async fn scans(&self, time_range: Option<TimeRange>) -> Result<Vec<Scan>, ApiError> {
        let query: Vec<(&str, &str)> = time_range
            .map(|range| ("timeRange", range.as_str()))
            .into_iter()
            .collect();
        self.request_json(Method::GET, &["scans"], &query, None).await
    }

    pub async fn website_scans(&self, website_id: &str) -> Result<Vec<Scan>, ApiError> {
        self.request_json(Method::GET, &["websites", website_id, "scans"], &[], None)
            .await
    }

    pub async fn scan_issues(&self, scan_id: &str) -> Result<Vec<Issue>, ApiError> {
        self.request_json(Method::GET, &["scans", scan_id, "issues"], &[], None)
            .await
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(format!("{} cannot be a base url", self.base)))?;
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<T, ApiError> {
        let text = self.request(method, segments, query, body).await?;
        serde_json::from_str(&text).map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn request(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<String, ApiError> {
        let url = self.endpoint(segments, query)?;
        drishya_debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            drishya_warn!("Request rejected as unauthorized; clearing session");
            self.session.clear();
            return Err(ApiError::Unauthorized);
        }

        let text = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl RecordSource for ApiClient {
    async fn fetch(&self, query: &RecordQuery) -> Result<RecordSet, ApiError> {
        match query {
            RecordQuery::Projects => self.projects().await.map(RecordSet::Projects),
            RecordQuery::Websites => self.websites().await.map(RecordSet::Websites),
            RecordQuery::Scans { time_range } => self.scans(*time_range).await.map(RecordSet::Scans),
            RecordQuery::WebsiteScans { website_id } => {
                self.website_scans(website_id).await.map(RecordSet::Scans)
            }
            RecordQuery::ScanIssues { scan_id } => {
                self.scan_issues(scan_id).await.map(RecordSet::Issues)
            }
        }
    }

    async fn perform(&self, request: &CrudRequest) -> Result<(), ApiError> {
        match request {
            CrudRequest::CreateProject { name, description } => self
                .create_project(name, description.as_deref())
                .await
                .map(drop),
            CrudRequest::UpdateProject {
                id,
                name,
                description,
            } => self
                .update_project(id, name, description.as_deref())
                .await
                .map(drop),
            CrudRequest::DeleteProject { id } => self.delete_project(id).await,
            CrudRequest::CreateWebsite { url, project_id } => {
                self.create_website(url, project_id).await.map(drop)
            }
            CrudRequest::UpdateWebsite {
                id,
                url,
                project_id,
            } => self.update_website(id, url, project_id).await.map(drop),
            CrudRequest::DeleteWebsite { id } => self.delete_website(id).await,
            CrudRequest::StartScan { website_id } => self.start_scan(website_id).await.map(drop),
        }
    }
}

fn encode<T: Serialize>(body: &T) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Prefers a `message` or `detail` field from a JSON error body, then the
/// raw body, then the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "detail", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
        });
    if let Some(message) = from_json {
        return message;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unknown status")
        .to_string()
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Network(err.to_string())
}
