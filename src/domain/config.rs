use crate::domain::DomainError;

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "JH_CONFIG_DIR";

/// File name of the configuration document inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.yml";

pub const URL_KEY: &str = "url";
pub const USERNAME_KEY: &str = "username";
pub const TOKEN_KEY: &str = "token";

/// Path of the cached project key.
pub const PROJECT_KEY_PATH: [&str; 3] = ["configuration", "issue", "projectKey"];

/// Path of the cached issue type name.
pub const ISSUE_TYPE_PATH: [&str; 3] = ["configuration", "issue", "issueTypeName"];

/// Seed document used when no configuration file exists yet.
pub const DEFAULT_CONFIG: &str = "
# What jira url to use. Ex. my-company.atlassian.net
url:
# What username to use for auth. Ex. my-email@gmail.com
username:
# Jira API Token
token:
";

/// Credentials needed to talk to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub url: String,
    pub username: String,
    pub token: String,
}

/// Project and issue type remembered from the last successful interactive run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDefaults {
    pub project_key: String,
    pub issue_type_name: String,
}

impl IssueDefaults {
    /// Build defaults from the two cached values.
    ///
    /// Missing keys and blank values both mean "not configured"; any other
    /// error is passed through.
    pub fn from_lookups(
        project_key: Result<String, DomainError>,
        issue_type_name: Result<String, DomainError>,
    ) -> Result<Option<Self>, DomainError> {
        let project_key = match project_key {
            Ok(v) => v,
            Err(DomainError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let issue_type_name = match issue_type_name {
            Ok(v) => v,
            Err(DomainError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        if project_key.trim().is_empty() || issue_type_name.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(Self {
            project_key,
            issue_type_name,
        }))
    }
}
