use std::path::PathBuf;

use crate::domain::config::{
    ISSUE_TYPE_PATH, PROJECT_KEY_PATH, TOKEN_KEY, URL_KEY, USERNAME_KEY,
};
use crate::domain::{Credentials, DomainError, IssueDefaults};

/// Configuration store port for reading, mutating and persisting the
/// configuration document.
///
/// Implementations load lazily on first use and must be safe to share
/// between the foreground command and background fetch tasks.
pub trait ConfigStore: Send + Sync {
    /// Force the document to load. Later calls return the cached outcome.
    fn load(&self) -> Result<(), DomainError>;

    /// Scalar value stored under a top-level key.
    fn get(&self, key: &str) -> Result<String, DomainError>;

    /// Set a top-level scalar, appending the key if it is new.
    fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Scalar value stored at a nested path.
    fn get_nested(&self, path: &[&str]) -> Result<String, DomainError>;

    /// Set a scalar at a nested path, creating intermediate sections.
    fn set_nested(&self, path: &[&str], value: &str) -> Result<(), DomainError>;

    /// Serialize the whole document and replace the backing file.
    fn write(&self) -> Result<(), DomainError>;

    /// Get the path to the configuration file.
    fn config_path(&self) -> PathBuf;

    /// The stored API token.
    ///
    /// A blank token is returned as an empty string ("not authenticated
    /// yet"); a structurally missing key is `NotFound`.
    fn auth_token(&self) -> Result<String, DomainError> {
        self.get(TOKEN_KEY)
    }

    /// Url, username and token in one go.
    fn credentials(&self) -> Result<Credentials, DomainError> {
        Ok(Credentials {
            url: self.get(URL_KEY)?,
            username: self.get(USERNAME_KEY)?,
            token: self.auth_token()?,
        })
    }

    /// Project and issue type cached by a previous run, if both are present.
    fn issue_defaults(&self) -> Result<Option<IssueDefaults>, DomainError> {
        IssueDefaults::from_lookups(
            self.get_nested(&PROJECT_KEY_PATH),
            self.get_nested(&ISSUE_TYPE_PATH),
        )
    }

    /// Remember the selection for the next non-interactive run.
    fn set_issue_defaults(&self, defaults: &IssueDefaults) -> Result<(), DomainError> {
        self.set_nested(&PROJECT_KEY_PATH, &defaults.project_key)?;
        self.set_nested(&ISSUE_TYPE_PATH, &defaults.issue_type_name)
    }
}
