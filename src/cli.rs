use clap::{ArgAction, Args, Parser, Subcommand};

/// jh: create Jira issues from the terminal.
#[derive(Parser, Debug)]
#[command(name = "jh", author, version, about)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new issue
    #[command(visible_alias = "cr")]
    Create(CreateArgs),

    /// Store the Jira url, username and API token
    Auth,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CreateArgs {
    /// Create and switch to a branch named after the issue; `@` is replaced
    /// with the lowercased issue key
    #[arg(short, long, value_name = "TEMPLATE")]
    pub branch: Option<String>,

    /// Pick project and issue type even when a previous choice is saved
    #[arg(short, long)]
    pub interactive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_create_alias_and_flags() {
        let cli = Cli::try_parse_from(["jh", "cr", "-b", "@/feature", "-i"]).unwrap();
        match cli.command {
            Commands::Create(args) => {
                assert_eq!(args.branch.as_deref(), Some("@/feature"));
                assert!(args.interactive);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["jh", "-vv", "auth"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Auth));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["jh"]).is_err());
    }
}
