use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;
use zeroize::Zeroizing;

use crate::domain::{
    CreatedIssue, Credentials, DomainError, IssueRequest, Project, RequiredFields, User,
};
use crate::ports::IssueTracker;

const MYSELF_PATH: &str = "rest/api/3/myself";
const RECENT_PROJECTS_PATH: &str = "rest/api/3/project/recent";
const CREATE_META_PATH: &str = "rest/api/2/issue/createmeta";
const CREATE_ISSUE_PATH: &str = "rest/api/2/issue";

/// Jira Cloud REST client.
///
/// Every call authenticates with basic auth (username + API token). Non-2xx
/// answers become `DomainError::RemoteApi` carrying the body untouched.
pub struct JiraClient {
    client: Client,
    base_url: Url,
    username: String,
    token: Zeroizing<String>,
}

impl JiraClient {
    pub fn new(credentials: Credentials) -> Result<Self, DomainError> {
        let base_url = normalize_base_url(&credentials.url)?;
        let client = Client::builder()
            .use_rustls_tls()
            .user_agent(format!("jh/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::HttpRequest(format!("Failed to create HTTP client: {}", e)))?;

        info!(base_url = %base_url, username = %credentials.username, "JiraClient initialized");

        Ok(Self {
            client,
            base_url,
            username: credentials.username,
            token: Zeroizing::new(credentials.token),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, DomainError> {
        self.base_url
            .join(path)
            .map_err(|e| DomainError::InvalidFormat(format!("bad endpoint {path}: {e}")))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.username, Some(self.token.as_str()))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, DomainError> {
        debug!(url = %url, "GET");
        let response = self.authorized(self.client.get(url)).send().await?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, DomainError> {
        debug!(url = %url, "POST");
        let response = self
            .authorized(self.client.post(url))
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DomainError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "Jira request failed");
            return Err(DomainError::RemoteApi {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Turn the configured site into a base URL ending in `/`.
/// A bare host such as `my-company.atlassian.net` is given `https://`.
pub fn normalize_base_url(raw: &str) -> Result<Url, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Config("jira url is not configured".to_string()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let mut url = Url::parse(&with_scheme)
        .map_err(|e| DomainError::Config(format!("invalid jira url {trimmed:?}: {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[derive(Deserialize)]
struct CreateMeta {
    #[serde(default)]
    projects: Vec<CreateMetaProject>,
}

#[derive(Deserialize)]
struct CreateMetaProject {
    #[serde(default)]
    issuetypes: Vec<CreateMetaIssueType>,
}

#[derive(Deserialize)]
struct CreateMetaIssueType {
    #[serde(default)]
    fields: HashMap<String, CreateMetaField>,
}

#[derive(Deserialize)]
struct CreateMetaField {
    #[serde(default)]
    required: serde_json::Value,
}

impl CreateMetaField {
    fn is_required(&self) -> bool {
        match &self.required {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::String(s) => s == "true",
            _ => false,
        }
    }
}

impl CreateMeta {
    /// Required fields of the first issue type of the first project.
    fn required_fields(self) -> RequiredFields {
        self.projects
            .into_iter()
            .next()
            .and_then(|p| p.issuetypes.into_iter().next())
            .map(|t| {
                t.fields
                    .into_iter()
                    .filter(|(_, f)| f.is_required())
                    .map(|(id, _)| id)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Serialize)]
struct CreateIssueBody<'a> {
    fields: CreateIssueFields<'a>,
}

#[derive(Serialize)]
struct CreateIssueFields<'a> {
    summary: &'a str,
    project: KeyRef<'a>,
    issuetype: NameRef<'a>,
    assignee: AccountRef<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reporter: Option<AccountRef<'a>>,
}

#[derive(Serialize)]
struct KeyRef<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct NameRef<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct AccountRef<'a> {
    #[serde(rename = "accountId")]
    account_id: &'a str,
}

impl<'a> From<&'a IssueRequest> for CreateIssueBody<'a> {
    fn from(request: &'a IssueRequest) -> Self {
        Self {
            fields: CreateIssueFields {
                summary: &request.summary,
                project: KeyRef {
                    key: &request.project_key,
                },
                issuetype: NameRef {
                    name: &request.issue_type_name,
                },
                assignee: AccountRef {
                    account_id: &request.assignee.account_id,
                },
                reporter: request.reporter.as_ref().map(|u| AccountRef {
                    account_id: &u.account_id,
                }),
            },
        }
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn current_user(&self) -> Result<User, DomainError> {
        self.get_json(self.endpoint(MYSELF_PATH)?).await
    }

    async fn recent_projects(&self) -> Result<Vec<Project>, DomainError> {
        let mut url = self.endpoint(RECENT_PROJECTS_PATH)?;
        url.query_pairs_mut().append_pair("expand", "issueTypes");
        self.get_json(url).await
    }

    async fn required_fields(&self, project_key: &str) -> Result<RequiredFields, DomainError> {
        let mut url = self.endpoint(CREATE_META_PATH)?;
        url.query_pairs_mut()
            .append_pair("projectKeys", project_key)
            .append_pair("expand", "projects.issuetypes.fields");
        let meta: CreateMeta = self.get_json(url).await?;
        Ok(meta.required_fields())
    }

    async fn create_issue(&self, request: &IssueRequest) -> Result<CreatedIssue, DomainError> {
        let body = CreateIssueBody::from(request);
        let created: CreatedIssue = self.post_json(self.endpoint(CREATE_ISSUE_PATH)?, &body).await?;
        info!(key = %created.key, project = %request.project_key, "Issue created");
        Ok(created)
    }

    fn browse_url(&self, issue_key: &str) -> String {
        format!("{}browse/{}", self.base_url, issue_key)
    }
}
