use std::io::Write;
use std::sync::Arc;

use tracing::info;

use crate::app::{IssuePipeline, SelectionSource};
use crate::cli::CreateArgs;
use crate::domain::branch::normalize_branch_name;
use crate::domain::DomainError;
use crate::ports::{ConfigStore, GitClient, IssueTracker, Prompter};

pub const FALLBACK_NOTICE: &str =
    "Seems like non-interactive mode was not configured. Running interactively...";

/// Collaborators of `jh create`.
pub struct CreateContext {
    pub config: Arc<dyn ConfigStore>,
    pub tracker: Arc<dyn IssueTracker>,
    pub prompter: Arc<dyn Prompter>,
    pub git: Arc<dyn GitClient>,
}

/// Create an issue, then optionally branch off it.
pub async fn execute<W: Write>(
    args: &CreateArgs,
    ctx: CreateContext,
    out: &mut W,
) -> Result<(), DomainError> {
    let pipeline = IssuePipeline::new(ctx.tracker, ctx.prompter, Arc::clone(&ctx.config));

    let source = pipeline.resolve_source(args.interactive)?;
    if source == SelectionSource::Interactive && !args.interactive {
        writeln!(out, "{FALLBACK_NOTICE}")?;
    }

    let report = pipeline.run(source).await?;
    if let Some(warning) = &report.persist_warning {
        writeln!(
            out,
            "warning: issue created but {} was not updated: {warning}",
            ctx.config.config_path().display()
        )?;
    }
    writeln!(out, "\ncreated issue: {}", report.browse_url)?;

    if let Some(template) = &args.branch {
        let branch_name = normalize_branch_name(template, &report.key);
        ctx.git.create_branch_with_checkout(&branch_name)?;
        info!(branch = %branch_name, issue = %report.key, "Branch created for issue");
        writeln!(out, "switched to branch: '{branch_name}'")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::YamlConfigStore;
    use crate::app::pipeline::tests::{Events, FakeTracker, ScriptedPrompter};
    use crate::domain::config::CONFIG_FILE_NAME;
    use parking_lot::Mutex;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingGit {
        branches: Mutex<Vec<String>>,
        fail: bool,
    }

    impl GitClient for RecordingGit {
        fn create_branch_with_checkout(&self, branch_name: &str) -> Result<(), DomainError> {
            if self.fail {
                return Err(DomainError::Git("not a git repository".to_string()));
            }
            self.branches.lock().push(branch_name.to_string());
            Ok(())
        }
    }

    struct Fixture {
        _dir: TempDir,
        config: Arc<YamlConfigStore>,
        tracker: Arc<FakeTracker>,
        git: Arc<RecordingGit>,
        events: Events,
    }

    impl Fixture {
        fn new(config_content: &str) -> Self {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join(CONFIG_FILE_NAME);
            fs::write(&path, config_content).unwrap();
            let events = Events::default();
            Self {
                config: Arc::new(YamlConfigStore::at(path)),
                tracker: Arc::new(FakeTracker::new(events.clone())),
                git: Arc::new(RecordingGit::default()),
                events,
                _dir: dir,
            }
        }

        fn context(&self, answers: &[&str]) -> CreateContext {
            CreateContext {
                config: self.config.clone(),
                tracker: self.tracker.clone(),
                prompter: Arc::new(ScriptedPrompter::new(answers, self.events.clone())),
                git: self.git.clone(),
            }
        }
    }

    #[tokio::test]
    async fn test_interactive_fallback_output() {
        let fixture = Fixture::new("url: url\nusername: username\ntoken: token\n");
        let mut out = Vec::new();

        execute(
            &CreateArgs::default(),
            fixture.context(&["Fix login", "PROJ", "Task"]),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("{FALLBACK_NOTICE}\n\ncreated issue: https://jira-url/browse/PROJ-1\n")
        );
        assert_eq!(
            fs::read_to_string(fixture.config.config_path()).unwrap(),
            "url: url\nusername: username\ntoken: token\nconfiguration:\n    issue:\n        projectKey: PROJ\n        issueTypeName: Task\n"
        );
    }

    #[tokio::test]
    async fn test_forced_interactive_prints_no_notice() {
        let fixture = Fixture::new("token: token\n");
        let mut out = Vec::new();
        let args = CreateArgs {
            interactive: true,
            ..CreateArgs::default()
        };

        execute(&args, fixture.context(&["Fix", "PROJ", "Task"]), &mut out)
            .await
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(!printed.contains(FALLBACK_NOTICE));
        assert!(printed.contains("created issue: https://jira-url/browse/PROJ-1"));
    }

    #[tokio::test]
    async fn test_branch_uses_lowercased_key() {
        let fixture = Fixture::new(
            "token: token\nconfiguration:\n    issue:\n        projectKey: PROJ\n        issueTypeName: Task\n",
        );
        let mut out = Vec::new();
        let args = CreateArgs {
            branch: Some("@/feature/test/@".to_string()),
            interactive: false,
        };

        execute(&args, fixture.context(&["Fix"]), &mut out).await.unwrap();

        assert_eq!(*fixture.git.branches.lock(), vec!["proj-1/feature/test/@".to_string()]);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.ends_with("switched to branch: 'proj-1/feature/test/@'\n"));
        assert!(!printed.contains(FALLBACK_NOTICE));
    }

    #[tokio::test]
    async fn test_branch_failure_after_create() {
        let mut fixture = Fixture::new("token: token\n");
        fixture.git = Arc::new(RecordingGit {
            fail: true,
            ..RecordingGit::default()
        });
        let mut out = Vec::new();
        let args = CreateArgs {
            branch: Some("@".to_string()),
            interactive: true,
        };

        let err = execute(&args, fixture.context(&["Fix", "PROJ", "Task"]), &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "jh create branch failed: not a git repository");
        // The issue exists regardless.
        assert!(String::from_utf8(out).unwrap().contains("created issue:"));
    }

    #[tokio::test]
    async fn test_remote_error_skips_output_and_branch() {
        let mut fixture = Fixture::new("token: token\n");
        let mut tracker = FakeTracker::new(fixture.events.clone());
        tracker.create_result = Err(DomainError::RemoteApi {
            status: 400,
            body: r#"{"errors":{"summary":"required"}}"#.to_string(),
        });
        fixture.tracker = Arc::new(tracker);
        let mut out = Vec::new();
        let args = CreateArgs {
            branch: Some("@".to_string()),
            interactive: true,
        };

        let err = execute(&args, fixture.context(&["Fix", "PROJ", "Task"]), &mut out)
            .await
            .unwrap_err();

        assert!(err.to_string().contains(r#"{"errors":{"summary":"required"}}"#));
        assert!(out.is_empty());
        assert!(fixture.git.branches.lock().is_empty());
    }
}
