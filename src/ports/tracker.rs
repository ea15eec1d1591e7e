use async_trait::async_trait;

use crate::domain::{CreatedIssue, DomainError, IssueRequest, Project, RequiredFields, User};

/// Issue tracker port. All tracker traffic goes through this interface.
///
/// Errors for non-2xx responses carry the raw response body
/// (`DomainError::RemoteApi`) so callers can show it verbatim.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// The authenticated user.
    async fn current_user(&self) -> Result<User, DomainError>;

    /// Recently used projects, with their issue types expanded.
    async fn recent_projects(&self) -> Result<Vec<Project>, DomainError>;

    /// Field ids that are mandatory when creating an issue in `project_key`.
    async fn required_fields(&self, project_key: &str) -> Result<RequiredFields, DomainError>;

    /// Create an issue.
    async fn create_issue(&self, request: &IssueRequest) -> Result<CreatedIssue, DomainError>;

    /// Web URL for an issue key.
    fn browse_url(&self, issue_key: &str) -> String;
}
