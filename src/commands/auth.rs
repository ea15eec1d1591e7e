use std::io::Write;
use std::sync::Arc;

use tracing::info;

use crate::domain::config::{TOKEN_KEY, URL_KEY, USERNAME_KEY};
use crate::domain::{Credentials, DomainError};
use crate::ports::{ConfigStore, IssueTracker, Prompter};

pub const REAUTH_PROMPT: &str =
    "You have already been authenticated with jira. Do you want to reauthenticate?";

/// Ask for credentials, check them against Jira and store them.
///
/// `connect` builds a tracker for the entered credentials; nothing is
/// written unless the tracker accepts them.
pub async fn execute<W, F>(
    config: Arc<dyn ConfigStore>,
    prompter: Arc<dyn Prompter>,
    connect: F,
    out: &mut W,
) -> Result<(), DomainError>
where
    W: Write,
    F: FnOnce(Credentials) -> Result<Arc<dyn IssueTracker>, DomainError>,
{
    let token = match config.auth_token() {
        Ok(token) => token,
        Err(DomainError::NotFound(_)) => String::new(),
        Err(e) => return Err(e),
    };

    let credentials = tokio::task::spawn_blocking(move || -> Result<Option<Credentials>, DomainError> {
        if !token.trim().is_empty() && !prompter.confirm(REAUTH_PROMPT)? {
            return Ok(None);
        }
        Ok(Some(Credentials {
            url: prompter.input(URL_KEY, "")?,
            username: prompter.input(USERNAME_KEY, "")?,
            token: prompter.input(TOKEN_KEY, "")?,
        }))
    })
    .await??;

    let Some(credentials) = credentials else {
        return Ok(());
    };

    let me = connect(credentials.clone())?.current_user().await?;
    info!(account_id = %me.account_id, "Credentials verified");

    config.set(URL_KEY, &credentials.url)?;
    config.set(USERNAME_KEY, &credentials.username)?;
    config.set(TOKEN_KEY, &credentials.token)?;
    config.write()?;

    writeln!(out, "Successfully authenticated")?;
    Ok(())
}
