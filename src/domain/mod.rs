pub mod branch;
pub mod config;
pub mod document;
pub mod error;
pub mod tracker;

pub use config::{Credentials, IssueDefaults};
pub use document::{Document, Mapping, Node};
pub use error::DomainError;
pub use tracker::{CreatedIssue, IssueRequest, IssueType, Project, RequiredFields, User};
