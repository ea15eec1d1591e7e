use thiserror::Error;

/// Domain-level errors for jh.
///
/// Payloads are plain strings so a cached load failure can be handed out
/// again to every later caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("could not find key {0:?}")]
    NotFound(String),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("invalid yaml: {0}")]
    InvalidSyntax(String),

    #[error("jira responded with status {status}:\n{body}")]
    RemoteApi { status: u16, body: String },

    #[error("prompt cancelled")]
    PromptCancelled,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    HttpRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("jh create branch failed: {0}")]
    Git(String),

    #[error("background task failed: {0}")]
    Task(String),

    #[error("nothing to pick from: {0}")]
    NothingToSelect(String),

    #[error("To get started with jh, please run: jh auth")]
    NotAuthenticated,
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for DomainError {
    fn from(err: serde_yaml::Error) -> Self {
        DomainError::InvalidSyntax(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        DomainError::HttpRequest(err.to_string())
    }
}

impl From<git2::Error> for DomainError {
    fn from(err: git2::Error) -> Self {
        DomainError::Git(err.message().to_string())
    }
}

impl From<tokio::task::JoinError> for DomainError {
    fn from(err: tokio::task::JoinError) -> Self {
        DomainError::Task(err.to_string())
    }
}

impl From<dialoguer::Error> for DomainError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                DomainError::PromptCancelled
            }
            dialoguer::Error::IO(e) => DomainError::Io(e.to_string()),
        }
    }
}
