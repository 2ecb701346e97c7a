//! External tool invocation.

use std::fs::File;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::MergeError;

/// A single external command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// File fed to the command's standard input.
    pub stdin: Option<PathBuf>,
}

/// What an external command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Convert a non-zero exit into [`MergeError::ExternalToolFailure`].
    pub fn check(self, tool: &str) -> Result<Self, MergeError> {
        if self.success() {
            Ok(self)
        } else {
            Err(MergeError::ExternalToolFailure {
                tool: tool.to_string(),
                exit_code: self.exit_code,
                stderr: self.stderr.trim_end().to_string(),
            })
        }
    }
}

/// Runs external tools to completion.
pub trait ToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, MergeError>;
}

/// Runs tools as child processes of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, MergeError> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        match &invocation.stdin {
            Some(path) => {
                command.stdin(File::open(path)?);
            }
            None => {
                command.stdin(Stdio::null());
            }
        }

        tracing::debug!(
            program = %invocation.program,
            args = ?invocation.args,
            "running external tool"
        );
        let output = command.output().map_err(|source| MergeError::Spawn {
            tool: invocation.program.clone(),
            source,
        })?;

        Ok(ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
