pub mod config;
pub mod git;
pub mod prompt;
pub mod tracker;

pub use config::ConfigStore;
pub use git::GitClient;
pub use prompt::Prompter;
pub use tracker::IssueTracker;
