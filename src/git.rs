use crate::errors::{GlError, Result};
#[cfg(test)]
use std::collections::HashMap;
use std::process::Command;

/// Runs an external program and hands back its trimmed standard output.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String>;
}

#[derive(Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let command = render_command(program, args);
        log::debug!("Running: {}", command);

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| GlError::Command {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.trim() {
                "" => format!("exited with {}", output.status),
                stderr => stderr.to_string(),
            };
            return Err(GlError::Command { command, reason });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}

fn render_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Git metadata the tool needs, read by shelling out to `git`.
pub struct Git<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> Git<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn remote_url(&self, remote: &str) -> Result<String> {
        let key = format!("remote.{}.url", remote);
        self.runner.run("git", &["config", "--get", &key])
    }

    pub fn current_branch(&self) -> Result<String> {
        self.runner.run("git", &["rev-parse", "--abbrev-ref", "HEAD"])
    }

    #[cfg(test)]
    pub fn runner(&self) -> &R {
        &self.runner
    }
}

/// Canned answers keyed by the full command line.
#[cfg(test)]
#[derive(Default)]
pub struct MockCommandRunner {
    pub responses: HashMap<String, String>,
    pub calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, command: &str, output: &str) -> Self {
        self.responses.insert(command.to_string(), output.to_string());
        self
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl CommandRunner for MockCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let command = render_command(program, args);
        self.calls.lock().unwrap().push(command.clone());

        match self.responses.get(&command) {
            Some(output) => Ok(output.trim_end().to_string()),
            None => Err(GlError::Command {
                command,
                reason: "exit status: 1".to_string(),
            }),
        }
    }
}
