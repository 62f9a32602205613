//! Mock command runner.

use crate::core::processor::CommandRunner;
use crate::types::{InsarError, InsarResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A command invocation seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

/// Records invocations instead of spawning processes.
///
/// Every program succeeds unless scripted with [`MockRunner::fail_on`].
#[derive(Debug, Default)]
pub struct MockRunner {
    commands: RefCell<Vec<RecordedCommand>>,
    exit_codes: RefCell<HashMap<String, i32>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every invocation of `program` exit with `code`.
    pub fn fail_on(&self, program: &str, code: i32) {
        self.exit_codes.borrow_mut().insert(program.to_string(), code);
    }

    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.commands.borrow().clone()
    }

    /// Invocations of `program`, in order.
    pub fn invocations_of(&self, program: &str) -> Vec<RecordedCommand> {
        self.commands
            .borrow()
            .iter()
            .filter(|c| c.program == program)
            .cloned()
            .collect()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> InsarResult<()> {
        self.commands.borrow_mut().push(RecordedCommand {
            program: program.to_string(),
            args: args.to_vec(),
            cwd: cwd.to_path_buf(),
        });

        match self.exit_codes.borrow().get(program) {
            Some(&code) if code != 0 => Err(InsarError::Subprocess {
                program: program.to_string(),
                code,
            }),
            _ => Ok(()),
        }
    }
}
