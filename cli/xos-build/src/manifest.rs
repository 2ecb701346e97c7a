//! `xos-build.toml` discovery and configuration layering.
//!
//! Precedence, lowest to highest: manifest file, environment, flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use xos_targets::ToolchainConfig;

/// File name searched for from the current directory upward.
pub const MANIFEST_NAME: &str = "xos-build.toml";

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub toolchain_root: Option<PathBuf>,
    pub emulator: Option<PathBuf>,
}

/// The effective configuration and the manifest it started from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: ToolchainConfig,
    pub manifest: Option<PathBuf>,
}

/// Search upward from `start_dir` for `xos-build.toml`.
pub fn find_manifest(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Layer manifest, environment (through `env`) and flag values.
pub fn resolve_config<F>(
    start_dir: &Path,
    overrides: &ConfigOverrides,
    env: F,
) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let manifest = find_manifest(start_dir);
    let base = match &manifest {
        Some(path) => ToolchainConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ToolchainConfig::default(),
    };

    let mut config = base.with_env(env);
    if let Some(root) = &overrides.toolchain_root {
        config.toolchain_root = Some(root.clone());
    }
    if let Some(emulator) = &overrides.emulator {
        config.emulator_path = Some(emulator.clone());
    }

    tracing::debug!(?manifest, ?config, "resolved toolchain config");
    Ok(ResolvedConfig { config, manifest })
}

/// [`resolve_config`] against the process environment.
pub fn resolve_from_process(
    start_dir: &Path,
    overrides: &ConfigOverrides,
) -> Result<ResolvedConfig> {
    resolve_config(start_dir, overrides, |key| std::env::var(key).ok())
}
