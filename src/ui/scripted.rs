use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::{ReleaseError, Result};
use crate::ui::Prompter;

/// Prompter replaying canned answers, recording every question asked.
///
/// An empty answer selects the prompt's default, like on the console. Running
/// out of answers aborts instead of blocking.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<String>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompter {
            answers: RefCell::new(answers.into_iter().map(Into::into).collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Questions asked so far, in order
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next_answer(&self, message: &str) -> Result<String> {
        self.asked.borrow_mut().push(message.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ReleaseError::aborted(format!("no scripted answer for '{}'", message)))
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&self, message: &str, default: Option<&str>) -> Result<String> {
        let answer = self.next_answer(message)?;
        match default {
            Some(default) if answer.is_empty() => Ok(default.to_string()),
            _ => Ok(answer),
        }
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        let answer = self.next_answer(message)?.to_lowercase();
        Ok(match answer.as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        })
    }
}
