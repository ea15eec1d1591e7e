use crate::domain::DomainError;

/// Port for local source-control operations.
pub trait GitClient: Send + Sync {
    /// Create `branch_name` at the current HEAD and switch to it.
    /// Local changes are preserved.
    fn create_branch_with_checkout(&self, branch_name: &str) -> Result<(), DomainError>;
}
