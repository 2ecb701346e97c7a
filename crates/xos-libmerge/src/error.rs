//! Archive merge errors.

use std::path::PathBuf;

use thiserror::Error;
use xos_targets::TargetError;

/// Errors that can occur while merging archives.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("no source archives given")]
    NoSources,

    #[error("source and target are the same file: {}", path.display())]
    SameFile { path: PathBuf },

    #[error("failed to invoke {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed ({}): {stderr}", describe_exit(.exit_code))]
    ExternalToolFailure {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl MergeError {
    /// Whether this error reports an unsupported architecture tag.
    pub fn is_unsupported_architecture(&self) -> bool {
        matches!(
            self,
            MergeError::Target(TargetError::UnsupportedArchitecture { .. })
        )
    }
}
