//! Shell command execution for the `shell` action.

use std::io;
use std::process::Command;

/// Captured result of a finished shell command.
#[derive(Debug)]
pub struct ExecResult {
    /// Exit code, when the process exited normally.
    pub code: Option<i32>,
    /// Captured standard output, trailing whitespace trimmed.
    pub stdout: String,
    /// Captured standard error, trailing whitespace trimmed.
    pub stderr: String,
}

impl ExecResult {
    /// `true` when the command exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Run `command` through the platform shell and capture its output.
///
/// # Errors
///
/// Returns an error when the shell itself cannot be spawned. A non-zero
/// exit from the command is reported through [`ExecResult::code`], not as
/// an error.
pub fn run_shell(command: &str) -> io::Result<ExecResult> {
    let output = if cfg!(windows) {
        Command::new("cmd").args(["/C", command]).output()?
    } else {
        Command::new("sh").args(["-c", command]).output()?
    };
    Ok(ExecResult {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
    })
}
