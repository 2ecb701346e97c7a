//! `xos-build merge-libs` — combine static archives into one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use xos_libmerge::MergeOutcome;
use xos_targets::ToolchainConfig;

/// Merge `sources` into `target`. Quiet on success so it can run from ninja.
pub fn run(arch: &str, target: &Path, sources: &[PathBuf], config: &ToolchainConfig) -> Result<()> {
    let outcome = xos_libmerge::merge(arch, target, sources, config).with_context(|| {
        format!("merging {} archive(s) into {}", sources.len(), target.display())
    })?;

    match outcome {
        MergeOutcome::Copied { bytes } => {
            tracing::debug!(bytes, "single source copied");
        }
        MergeOutcome::Archived { tool, inputs } => {
            tracing::debug!(%tool, inputs, "archiver finished");
        }
    }
    Ok(())
}
