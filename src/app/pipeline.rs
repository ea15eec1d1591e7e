//! Issue creation pipeline.
//!
//! Remote lookups run as background tasks while the user answers prompts;
//! the orchestration below awaits each one at the point its result is
//! first needed.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::tracker::{projects_by_key, sorted_keys};
use crate::domain::{DomainError, IssueDefaults, IssueRequest, RequiredFields, User};
use crate::ports::{ConfigStore, IssueTracker, Prompter};

pub const SUMMARY_LABEL: &str = "Issue Summary";
pub const PROJECT_LABEL: &str = "Pick a project";
pub const ISSUE_TYPE_LABEL: &str = "Pick issue type";

/// Where the project and issue type come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSource {
    /// Reuse the selection remembered from a previous run.
    Cached(IssueDefaults),
    /// Ask the user.
    Interactive,
}

/// Result of a successful run.
#[derive(Debug)]
pub struct CreatedIssueReport {
    pub key: String,
    pub browse_url: String,
    /// Set when the issue exists but the selection could not be saved.
    pub persist_warning: Option<DomainError>,
}

/// A remote lookup running in the background. Joined at most once; dropping
/// it detaches the task and discards its result.
struct Fetch<T> {
    label: &'static str,
    handle: JoinHandle<Result<T, DomainError>>,
}

impl<T: Send + 'static> Fetch<T> {
    fn spawn<F>(label: &'static str, future: F) -> Self
    where
        F: Future<Output = Result<T, DomainError>> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let result = future.await;
            debug!(
                fetch = label,
                elapsed_ms = started.elapsed().as_millis() as u64,
                ok = result.is_ok(),
                "Fetch finished"
            );
            result
        });
        Self { label, handle }
    }

    async fn join(self) -> Result<T, DomainError> {
        let result = self.handle.await?;
        if let Err(e) = &result {
            warn!(fetch = self.label, error = %e, "Fetch failed");
        }
        result
    }
}

pub struct IssuePipeline {
    tracker: Arc<dyn IssueTracker>,
    prompter: Arc<dyn Prompter>,
    config: Arc<dyn ConfigStore>,
}

impl IssuePipeline {
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        prompter: Arc<dyn Prompter>,
        config: Arc<dyn ConfigStore>,
    ) -> Self {
        Self {
            tracker,
            prompter,
            config,
        }
    }

    /// Decide between the cached selection and the prompt-driven path.
    pub fn resolve_source(&self, force_interactive: bool) -> Result<SelectionSource, DomainError> {
        if force_interactive {
            return Ok(SelectionSource::Interactive);
        }
        Ok(match self.config.issue_defaults()? {
            Some(defaults) => SelectionSource::Cached(defaults),
            None => SelectionSource::Interactive,
        })
    }

    pub async fn run(&self, source: SelectionSource) -> Result<CreatedIssueReport, DomainError> {
        let tracker = Arc::clone(&self.tracker);
        let current_user = Fetch::spawn("current_user", async move { tracker.current_user().await });

        match source {
            SelectionSource::Cached(defaults) => {
                info!(
                    project = %defaults.project_key,
                    issue_type = %defaults.issue_type_name,
                    "Using cached selection"
                );
                let required_fields = self.spawn_required_fields(defaults.project_key.clone());

                let summary = self.prompt_summary().await?;
                let required = required_fields.join().await?;
                let user = current_user.join().await?;

                self.submit(summary, defaults, user, &required).await
            }
            SelectionSource::Interactive => {
                let tracker = Arc::clone(&self.tracker);
                let recent_projects =
                    Fetch::spawn("recent_projects", async move { tracker.recent_projects().await });

                let summary = self.prompt_summary().await?;

                let projects = projects_by_key(recent_projects.join().await?);
                let project_key = self.select(PROJECT_LABEL, sorted_keys(&projects)).await?;
                let project = projects
                    .get(&project_key)
                    .ok_or_else(|| DomainError::NotFound(project_key.clone()))?;

                let required_fields = self.spawn_required_fields(project_key.clone());

                let issue_types = sorted_keys(&project.selectable_issue_types());
                let issue_type_name = self.select(ISSUE_TYPE_LABEL, issue_types).await?;

                let required = required_fields.join().await?;
                let user = current_user.join().await?;

                let defaults = IssueDefaults {
                    project_key,
                    issue_type_name,
                };
                self.submit(summary, defaults, user, &required).await
            }
        }
    }

    fn spawn_required_fields(&self, project_key: String) -> Fetch<RequiredFields> {
        let tracker = Arc::clone(&self.tracker);
        Fetch::spawn("required_fields", async move {
            tracker.required_fields(&project_key).await
        })
    }

    async fn prompt_summary(&self) -> Result<String, DomainError> {
        let prompter = Arc::clone(&self.prompter);
        tokio::task::spawn_blocking(move || prompter.input(SUMMARY_LABEL, "")).await?
    }

    async fn select(&self, label: &'static str, options: Vec<String>) -> Result<String, DomainError> {
        if options.is_empty() {
            return Err(DomainError::NothingToSelect(label.to_string()));
        }
        let prompter = Arc::clone(&self.prompter);
        tokio::task::spawn_blocking(move || prompter.select(label, &options)).await?
    }

    async fn submit(
        &self,
        summary: String,
        defaults: IssueDefaults,
        user: User,
        required: &RequiredFields,
    ) -> Result<CreatedIssueReport, DomainError> {
        let request = IssueRequest::new(
            summary,
            defaults.project_key.clone(),
            defaults.issue_type_name.clone(),
            user,
            required,
        );
        let created = self.tracker.create_issue(&request).await?;

        let persist_warning = match self.persist_selection(&defaults) {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "Issue created but the selection was not saved");
                Some(e)
            }
        };

        Ok(CreatedIssueReport {
            browse_url: self.tracker.browse_url(&created.key),
            key: created.key,
            persist_warning,
        })
    }

    fn persist_selection(&self, defaults: &IssueDefaults) -> Result<(), DomainError> {
        self.config.set_issue_defaults(defaults)?;
        self.config.write()
    }
}
