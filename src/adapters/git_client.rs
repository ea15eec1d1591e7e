use std::path::PathBuf;

use git2::{BranchType, ErrorCode, Repository};
use tracing::{debug, info};

use crate::domain::DomainError;
use crate::ports::GitClient;

/// libgit2-backed client for the repository containing `work_dir`.
pub struct Git2Client {
    work_dir: PathBuf,
}

impl Git2Client {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// Client for the repository around the process working directory.
    pub fn from_current_dir() -> Result<Self, DomainError> {
        Ok(Self::new(std::env::current_dir()?))
    }
}

impl GitClient for Git2Client {
    fn create_branch_with_checkout(&self, branch_name: &str) -> Result<(), DomainError> {
        debug!(branch = branch_name, work_dir = ?self.work_dir, "Creating branch");

        let repo = Repository::discover(&self.work_dir)?;

        match repo.find_branch(branch_name, BranchType::Local) {
            Ok(_) => {
                return Err(DomainError::Git(format!(
                    "a branch named '{branch_name}' already exists"
                )))
            }
            Err(e) if e.code() == ErrorCode::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let head_commit = repo.head().and_then(|head| head.peel_to_commit())?;
        repo.branch(branch_name, &head_commit, false)?;

        // The new branch points at HEAD, so the working tree and index stay as they are.
        repo.set_head(&format!("refs/heads/{branch_name}"))?;

        info!(branch = branch_name, "Switched to new branch");
        Ok(())
    }
}
