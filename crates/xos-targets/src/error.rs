//! Error types for architecture and toolchain resolution.

use std::path::PathBuf;

/// Errors that can occur while resolving an architecture or its tools.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// The architecture tag is not one of the supported targets.
    #[error("unsupported architecture: '{arch}' (supported: x86, aarch32)")]
    UnsupportedArchitecture {
        /// The tag that was supplied.
        arch: String,
    },

    /// A configuration value required by this architecture is not set.
    #[error("missing required config field: {field}")]
    MissingConfig {
        /// Name of the missing field.
        field: &'static str,
    },

    /// TOML deserialization error.
    #[error("TOML parse error in {}: {source}", path.display())]
    Toml {
        /// The file being parsed.
        path: PathBuf,
        /// Underlying parser error.
        source: toml::de::Error,
    },

    /// I/O error reading configuration files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for target operations.
pub type Result<T> = std::result::Result<T, TargetError>;
