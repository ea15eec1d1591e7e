use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use crate::adapters::{DialoguerPrompter, Git2Client, JiraClient, YamlConfigStore};
use crate::commands::CreateContext;
use crate::domain::{Credentials, DomainError};
use crate::infrastructure::{init_logging, level_from_verbosity, LOG_DIR_ENV};
use crate::ports::{ConfigStore, IssueTracker, Prompter};

/// Context root: builds the configuration store once and hands it, with the
/// other adapters, to whichever command runs.
pub struct AppController {
    config_store: Arc<YamlConfigStore>,
    prompter: Arc<DialoguerPrompter>,
    _log_guard: Option<WorkerGuard>,
}

impl AppController {
    /// Set up logging and the configuration store.
    pub fn new(verbosity: u8) -> Result<Self, DomainError> {
        let logs_dir = std::env::var_os(LOG_DIR_ENV)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);
        let log_guard = init_logging(level_from_verbosity(verbosity), logs_dir.as_deref())?;

        let config_store = Arc::new(YamlConfigStore::new()?);

        info!(
            version = env!("CARGO_PKG_VERSION"),
            config_path = ?config_store.config_path(),
            "AppController initialized"
        );

        Ok(Self {
            config_store,
            prompter: Arc::new(DialoguerPrompter::new()),
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> Arc<dyn ConfigStore> {
        self.config_store.clone()
    }

    pub fn prompter(&self) -> Arc<dyn Prompter> {
        self.prompter.clone()
    }

    /// Fail with `NotAuthenticated` unless a token is stored.
    pub fn require_auth(&self) -> Result<(), DomainError> {
        match self.config_store.auth_token() {
            Ok(token) if !token.trim().is_empty() => Ok(()),
            Ok(_) | Err(DomainError::NotFound(_)) => Err(DomainError::NotAuthenticated),
            Err(e) => Err(e),
        }
    }

    /// Tracker for arbitrary credentials.
    pub fn connect(credentials: Credentials) -> Result<Arc<dyn IssueTracker>, DomainError> {
        Ok(Arc::new(JiraClient::new(credentials)?))
    }

    /// Collaborators for `jh create`, using the stored credentials and the
    /// repository around the working directory.
    pub fn create_context(&self) -> Result<CreateContext, DomainError> {
        Ok(CreateContext {
            config: self.config(),
            tracker: Self::connect(self.config_store.credentials()?)?,
            prompter: self.prompter(),
            git: Arc::new(Git2Client::from_current_dir()?),
        })
    }
}
