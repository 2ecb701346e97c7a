//! Script generation errors.

use std::path::PathBuf;

use thiserror::Error;
use xos_targets::TargetError;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScriptError {
    /// Whether this error reports an unsupported architecture tag.
    pub fn is_unsupported_architecture(&self) -> bool {
        matches!(
            self,
            ScriptError::Target(TargetError::UnsupportedArchitecture { .. })
        )
    }
}
