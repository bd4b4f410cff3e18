//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - `scripted` - Prompter replaying canned answers, for tests
//! - This module - The `Prompter` seam and its console implementations

use std::io::{self, BufRead, Write};

use console::{style, Term};

use crate::error::{ReleaseError, Result};

pub mod formatter;
pub mod scripted;

pub use formatter::{
    display_boundary_warning, display_error, display_formats, display_intro, display_plan, display_profiles,
    display_result, display_status, display_success,
};
pub use scripted::ScriptedPrompter;

/// Operator interaction used by the release workflow.
pub trait Prompter {
    /// Ask for free text. An empty answer selects `default` when there is one.
    fn input(&self, message: &str, default: Option<&str>) -> Result<String>;

    /// Ask a yes/no question. An empty answer selects `default`.
    fn confirm(&self, message: &str, default: bool) -> Result<bool>;
}

/// Prompts on the terminal and reads answers from stdin.
pub struct ConsolePrompter {
    term: Term,
}

impl ConsolePrompter {
    pub fn new() -> Self {
        ConsolePrompter {
            term: Term::stdout(),
        }
    }

    fn read_answer(&self) -> Result<Option<String>> {
        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim().to_string()))
    }
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for ConsolePrompter {
    fn input(&self, message: &str, default: Option<&str>) -> Result<String> {
        let prompt = match default {
            Some(default) => format!("\n{} [{}]: ", message, style(default).cyan()),
            None => format!("\n{}: ", message),
        };
        self.term.write_str(&prompt)?;
        io::stdout().flush()?;

        match (self.read_answer()?, default) {
            (Some(answer), Some(default)) if answer.is_empty() => Ok(default.to_string()),
            (Some(answer), _) => Ok(answer),
            (None, Some(default)) => Ok(default.to_string()),
            (None, None) => Err(ReleaseError::aborted("no input available")),
        }
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        self.term.write_str(&format!("\n{} ({}): ", message, hint))?;
        io::stdout().flush()?;

        let response = match self.read_answer()? {
            Some(answer) => answer.to_lowercase(),
            None => return Ok(default),
        };
        Ok(match response.as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        })
    }
}

/// Non-interactive prompter taking every default.
///
/// With `assume_yes` every confirmation is answered with yes, otherwise with
/// its default.
pub struct DefaultsPrompter {
    pub assume_yes: bool,
}

impl Prompter for DefaultsPrompter {
    fn input(&self, message: &str, default: Option<&str>) -> Result<String> {
        match default {
            Some(default) => {
                tracing::info!(prompt = message, answer = default, "using default answer");
                Ok(default.to_string())
            }
            None => Err(ReleaseError::aborted(format!(
                "'{}' needs an answer but prompts are disabled",
                message
            ))),
        }
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        let answer = self.assume_yes || default;
        tracing::info!(prompt = message, answer, "answering confirmation");
        Ok(answer)
    }
}
