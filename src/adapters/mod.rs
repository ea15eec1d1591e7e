pub mod config_store;
pub mod git_client;
pub mod jira_client;
pub mod prompter;

pub use config_store::YamlConfigStore;
pub use git_client::Git2Client;
pub use jira_client::JiraClient;
pub use prompter::DialoguerPrompter;
