//! Fake host and command runner shared by the unit tests.

use crate::probe::HostProbe;
use crate::runner::{CommandOutput, CommandRunner};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// In-memory host: only what the test declares exists
#[derive(Debug, Default)]
pub struct FakeProbe {
    root: bool,
    paths: HashSet<String>,
    files: HashMap<String, String>,
    commands: HashSet<String>,
    outputs: HashMap<String, String>,
    user: Option<String>,
    pub probed_commands: RefCell<Vec<String>>,
    pub probed_paths: RefCell<Vec<String>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_root(mut self) -> Self {
        self.root = true;
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.paths.insert(path.to_string());
        self
    }

    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.paths.insert(path.to_string());
        self.files.insert(path.to_string(), contents.to_string());
        self
    }

    pub fn with_command(mut self, name: &str) -> Self {
        self.commands.insert(name.to_string());
        self
    }

    /// Stdout returned for `program args...`
    pub fn with_output(mut self, command_line: &str, stdout: &str) -> Self {
        self.outputs
            .insert(command_line.to_string(), stdout.to_string());
        self
    }

    pub fn with_user(mut self, user: &str) -> Self {
        self.user = Some(user.to_string());
        self
    }
}

impl HostProbe for FakeProbe {
    fn is_root(&self) -> bool {
        self.root
    }

    fn path_exists(&self, path: &str) -> bool {
        self.probed_paths.borrow_mut().push(path.to_string());
        self.paths.contains(path)
    }

    fn read_file(&self, path: &str) -> Option<String> {
        self.files.get(path).cloned()
    }

    fn command_exists(&self, name: &str) -> bool {
        self.probed_commands.borrow_mut().push(name.to_string());
        self.commands.contains(name)
    }

    fn command_output(&self, program: &str, args: &[&str]) -> Option<String> {
        let mut line = vec![program];
        line.extend_from_slice(args);
        self.outputs.get(&line.join(" ")).cloned()
    }

    fn invoking_user(&self) -> Option<String> {
        self.user.clone()
    }
}

/// Runner that records every argv and fails those matching a pattern
#[derive(Debug, Default)]
pub struct RecordingRunner {
    pub invocations: RefCell<Vec<String>>,
    pub stdin_payloads: RefCell<Vec<String>>,
    failing: Vec<(String, i32)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any command line containing `pattern` exits with `code`
    pub fn failing_on(mut self, pattern: &str, code: i32) -> Self {
        self.failing.push((pattern.to_string(), code));
        self
    }

    pub fn ran(&self, pattern: &str) -> bool {
        self.invocations
            .borrow()
            .iter()
            .any(|line| line.contains(pattern))
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, argv: &[String], stdin: Option<&str>) -> std::io::Result<CommandOutput> {
        let line = argv.join(" ");
        self.invocations.borrow_mut().push(line.clone());
        if let Some(input) = stdin {
            self.stdin_payloads.borrow_mut().push(input.to_string());
        }

        let exit_code = self
            .failing
            .iter()
            .find(|(pattern, _)| line.contains(pattern.as_str()))
            .map(|(_, code)| *code)
            .unwrap_or(0);

        Ok(CommandOutput {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: if exit_code == 0 {
                String::new()
            } else {
                format!("E: {} failed", line)
            },
        })
    }
}
