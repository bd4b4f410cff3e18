use std::cell::RefCell;
use std::collections::HashMap;

use crate::command::{CommandOutput, CommandRunner, CommandSpec};
use crate::error::Result;

/// Mock runner for testing without spawning processes.
///
/// Records every command and answers with the output registered for its
/// program, or an empty success.
#[derive(Default)]
pub struct RecordingRunner {
    responses: RefCell<HashMap<String, CommandOutput>>,
    calls: RefCell<Vec<CommandSpec>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output returned for every run of `program`
    pub fn respond(&self, program: impl Into<String>, output: CommandOutput) {
        self.responses.borrow_mut().insert(program.into(), output);
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Recorded commands rendered as command lines
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(ToString::to_string).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(spec.clone());
        Ok(self
            .responses
            .borrow()
            .get(&spec.program)
            .cloned()
            .unwrap_or_default())
    }
}
