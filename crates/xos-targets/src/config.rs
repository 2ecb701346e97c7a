//! Toolchain configuration.
//!
//! Host-specific locations (the cross toolchain install, the emulator binary)
//! are never baked into the tools. They come from an `xos-build.toml` file,
//! from environment variables, or from command-line flags, with later
//! sources overriding earlier ones.
//!
//! ```toml
//! [toolchain]
//! root = "/opt/cross/arm-none-eabi"
//! runtime-lib = "lib/gcc/arm-none-eabi/9.2.1/libgcc.a"
//!
//! [emulator]
//! path = "/opt/qemu/bin/qemu-system-arm"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, TargetError};

/// Environment variable overriding [`ToolchainConfig::toolchain_root`].
pub const ENV_TOOLCHAIN_ROOT: &str = "XOS_TOOLCHAIN_ROOT";

/// Environment variable overriding [`ToolchainConfig::emulator_path`].
pub const ENV_EMULATOR_PATH: &str = "XOS_EMULATOR_PATH";

/// Runtime support library location, relative to the toolchain root.
pub const DEFAULT_RUNTIME_LIB: &str = "lib/gcc/arm-none-eabi/9.2.1/libgcc.a";

/// Resolved configuration consumed by the merger and the script generator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainConfig {
    /// Root of the cross toolchain install.
    pub toolchain_root: Option<PathBuf>,
    /// Runtime support library, relative to `toolchain_root` unless absolute.
    pub runtime_lib: Option<PathBuf>,
    /// Emulator binary replacing the per-architecture default.
    pub emulator_path: Option<PathBuf>,
}

/// On-disk shape of `xos-build.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigFile {
    #[serde(default)]
    pub toolchain: ToolchainSection,
    #[serde(default)]
    pub emulator: EmulatorSection,
}

/// `[toolchain]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToolchainSection {
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub runtime_lib: Option<PathBuf>,
}

/// `[emulator]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EmulatorSection {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl From<ConfigFile> for ToolchainConfig {
    fn from(file: ConfigFile) -> Self {
        Self {
            toolchain_root: file.toolchain.root,
            runtime_lib: file.toolchain.runtime_lib,
            emulator_path: file.emulator.path,
        }
    }
}

impl ToolchainConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&content).map_err(|source| TargetError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded toolchain config");
        Ok(file.into())
    }

    /// Apply environment overrides using the given lookup.
    ///
    /// Empty values are treated as unset.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(root) = non_empty(ENV_TOOLCHAIN_ROOT) {
            self.toolchain_root = Some(PathBuf::from(root));
        }
        if let Some(emulator) = non_empty(ENV_EMULATOR_PATH) {
            self.emulator_path = Some(PathBuf::from(emulator));
        }
        self
    }

    /// Apply overrides from the process environment.
    pub fn with_process_env(self) -> Self {
        self.with_env(|key| std::env::var(key).ok())
    }

    /// Full path of the runtime support library.
    pub fn runtime_lib_path(&self) -> Result<PathBuf> {
        let root = self
            .toolchain_root
            .as_deref()
            .ok_or(TargetError::MissingConfig {
                field: "toolchain_root",
            })?;
        let lib = self
            .runtime_lib
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_RUNTIME_LIB));
        Ok(root.join(lib))
    }
}
