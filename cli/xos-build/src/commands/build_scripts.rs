//! `xos-build build-scripts` — write the helper scripts into an output tree.

use std::path::Path;

use anyhow::{Context, Result};
use xos_targets::ToolchainConfig;

/// Generate the script set; with `executable`, also `chmod 0755` the scripts.
pub fn run(
    arch: &str,
    base_dir: &str,
    out_dir: &str,
    executable: bool,
    config: &ToolchainConfig,
) -> Result<()> {
    let written = xos_scripts::generate(arch, base_dir, out_dir, config)
        .with_context(|| format!("generating scripts in {out_dir}"))?;

    if executable {
        mark_executable(Path::new(out_dir))?;
    }

    println!("Generated {} files in {out_dir}", written.len());
    Ok(())
}

#[cfg(unix)]
fn mark_executable(out_dir: &Path) -> Result<()> {
    xos_scripts::make_executable(out_dir)?;
    Ok(())
}

#[cfg(not(unix))]
fn mark_executable(_out_dir: &Path) -> Result<()> {
    tracing::warn!("--executable has no effect on this platform");
    Ok(())
}
