//! Read-only projections of Jira API responses and the issue request.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Field id Jira uses for the issue reporter.
pub const REPORTER_FIELD: &str = "reporter";

/// The authenticated Jira user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub account_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueType {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subtask: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub issue_types: Vec<IssueType>,
}

impl Project {
    /// Issue types that can be created without a parent issue, keyed by name.
    pub fn selectable_issue_types(&self) -> HashMap<String, &IssueType> {
        self.issue_types
            .iter()
            .filter(|t| !t.subtask)
            .map(|t| (t.name.clone(), t))
            .collect()
    }
}

/// Index projects by key for selection.
pub fn projects_by_key(projects: Vec<Project>) -> HashMap<String, Project> {
    projects.into_iter().map(|p| (p.key.clone(), p)).collect()
}

/// Keys of a string-keyed map in lexicographic order.
pub fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}

/// Field ids that must be provided when creating an issue in a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredFields(HashSet<String>);

impl RequiredFields {
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    pub fn requires_reporter(&self) -> bool {
        self.contains(REPORTER_FIELD)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for RequiredFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Everything needed for a single issue-creation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    pub summary: String,
    pub project_key: String,
    pub issue_type_name: String,
    pub assignee: User,
    pub reporter: Option<User>,
}

impl IssueRequest {
    /// Combine the pipeline's inputs; the reporter is only set when the
    /// project requires one.
    pub fn new(
        summary: String,
        project_key: String,
        issue_type_name: String,
        current_user: User,
        required: &RequiredFields,
    ) -> Self {
        let reporter = required.requires_reporter().then(|| current_user.clone());
        Self {
            summary,
            project_key,
            issue_type_name,
            assignee: current_user,
            reporter,
        }
    }
}

/// The issue Jira created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    #[serde(default)]
    pub id: String,
    pub key: String,
    #[serde(rename = "self", default)]
    pub self_url: String,
}
