#![forbid(unsafe_code)]

pub mod adapters;
pub mod app;
pub mod cli;
pub mod commands;
pub mod domain;
mod infrastructure;
pub mod ports;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::error;

use app::AppController;
use cli::{Cli, Commands};
use domain::DomainError;

/// Exit status after the user interrupts a prompt.
const EXIT_CANCELLED: u8 = 130;

/// Parse the command line, run the command and map the outcome to an exit code.
pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<DomainError>() {
            Some(DomainError::PromptCancelled) => {
                // Leave the shell prompt on a fresh line.
                println!();
                ExitCode::from(EXIT_CANCELLED)
            }
            Some(DomainError::NotAuthenticated) => {
                eprintln!("{}", DomainError::NotAuthenticated);
                ExitCode::FAILURE
            }
            _ => {
                error!(error = ?err, "Command failed");
                eprintln!("error occurred: {err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let controller = AppController::new(cli.verbose).context("failed to initialize jh")?;
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Auth => {
            commands::auth::execute(
                controller.config(),
                controller.prompter(),
                AppController::connect,
                &mut stdout,
            )
            .await?;
        }
        Commands::Create(args) => {
            controller.require_auth()?;
            let ctx = controller.create_context()?;
            commands::create::execute(&args, ctx, &mut stdout).await?;
        }
    }

    stdout.flush()?;
    Ok(())
}
