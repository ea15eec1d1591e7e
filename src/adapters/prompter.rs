use dialoguer::console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::domain::DomainError;
use crate::ports::Prompter;

/// Rows shown at once in a selection list.
const SELECT_PAGE_SIZE: usize = 10;

/// Terminal prompts rendered with dialoguer.
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

fn require_value(input: &String) -> Result<(), &'static str> {
    if input.trim().is_empty() {
        Err("a value is required")
    } else {
        Ok(())
    }
}

/// Convert a dialoguer result. `Select` and `Confirm` hide the cursor and
/// return early on Ctrl-C, so it is shown again before reporting the cancel.
fn interaction<T>(result: Result<T, dialoguer::Error>) -> Result<T, DomainError> {
    result.map_err(|err| {
        let err = DomainError::from(err);
        if err == DomainError::PromptCancelled {
            let _ = Term::stderr().show_cursor();
        }
        err
    })
}

impl Prompter for DialoguerPrompter {
    fn input(&self, label: &str, default: &str) -> Result<String, DomainError> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(label)
            .validate_with(require_value);
        if !default.is_empty() {
            input = input.default(default.to_string());
        }
        interaction(input.interact_text())
    }

    fn select(&self, label: &str, options: &[String]) -> Result<String, DomainError> {
        if options.is_empty() {
            return Err(DomainError::NothingToSelect(label.to_string()));
        }

        let index = interaction(
            Select::with_theme(&self.theme)
                .with_prompt(label)
                .items(options)
                .default(0)
                .max_length(SELECT_PAGE_SIZE)
                .interact(),
        )?;

        options
            .get(index)
            .cloned()
            .ok_or_else(|| DomainError::NothingToSelect(label.to_string()))
    }

    fn confirm(&self, label: &str) -> Result<bool, DomainError> {
        interaction(
            Confirm::with_theme(&self.theme)
                .with_prompt(label)
                .default(false)
                .interact(),
        )
    }
}
