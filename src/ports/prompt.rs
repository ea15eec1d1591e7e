use crate::domain::DomainError;

/// Port for interactive terminal prompts.
///
/// Every method blocks the calling thread until the user answers. A user
/// interrupt is reported as `DomainError::PromptCancelled`.
pub trait Prompter: Send + Sync {
    /// Free-text input. `default` is offered when non-empty.
    fn input(&self, label: &str, default: &str) -> Result<String, DomainError>;

    /// Pick one of `options`; returns the chosen option.
    fn select(&self, label: &str, options: &[String]) -> Result<String, DomainError>;

    /// Yes/no question.
    fn confirm(&self, label: &str) -> Result<bool, DomainError>;
}
