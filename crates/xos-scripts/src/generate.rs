//! The helper script set for an output tree.
//!
//! `sync.sh` copies the base tree and the freshly built tree into the disk
//! image, `build.sh` runs ninja, `run.sh`/`debug.sh` boot the image, and
//! `all.sh`/`dll.sh` chain them. `.gdbinit` points gdb at the kernel and the
//! emulator's stub.

use std::fs;
use std::path::{Path, PathBuf};

use xos_targets::emulator::{disk_image_path, kernel_path};
use xos_targets::{Arch, EmulatorCommand, ToolchainConfig, DEBUG_PORT};

use crate::error::ScriptError;
use crate::script::ShellScript;

/// Shell scripts written by [`generate`], in write order.
pub const SCRIPT_NAMES: [&str; 6] = [
    "sync.sh", "build.sh", "run.sh", "debug.sh", "all.sh", "dll.sh",
];

/// Debugger init file written next to the scripts.
pub const GDBINIT_NAME: &str = ".gdbinit";

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: &'static str,
    pub contents: String,
}

/// Strip one trailing `/`, if present.
pub fn normalize_dir(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// Render every file for `arch` without touching the filesystem.
///
/// `base_dir` and `out_dir` are normalized with [`normalize_dir`] first.
pub fn render_all(
    arch: Arch,
    base_dir: &str,
    out_dir: &str,
    config: &ToolchainConfig,
) -> Vec<GeneratedFile> {
    let base = normalize_dir(base_dir);
    let out = normalize_dir(out_dir);
    let emulator = EmulatorCommand::for_arch(arch, out, config);
    let debug_emulator = emulator.clone().with_debug_stub();

    vec![
        GeneratedFile {
            name: "sync.sh",
            contents: sync_script(base, out).render(),
        },
        GeneratedFile {
            name: "build.sh",
            contents: build_script(arch).render(),
        },
        GeneratedFile {
            name: "run.sh",
            contents: ShellScript::new()
                .run_checked(emulator.argv(), "Run command failed")
                .render(),
        },
        GeneratedFile {
            name: "debug.sh",
            contents: ShellScript::new()
                .run_checked(debug_emulator.argv(), "Debug Run command failed")
                .render(),
        },
        GeneratedFile {
            name: "all.sh",
            contents: chain_script("./run.sh", "All command failed").render(),
        },
        GeneratedFile {
            name: "dll.sh",
            contents: chain_script("./debug.sh", "Debug All command failed").render(),
        },
        GeneratedFile {
            name: GDBINIT_NAME,
            contents: format!("file {}\ntarget remote :{DEBUG_PORT}\n", kernel_path(out)),
        },
    ]
}

fn sync_script(base: &str, out: &str) -> ShellScript {
    let mountpoint = format!("{base}/mountpoint");
    ShellScript::new()
        .elevated()
        .mkdir(format!("{base}/base/dev"))
        .mkdir(format!("{base}/base/proc"))
        .blank()
        .mkdir(mountpoint.as_str())
        .mount(disk_image_path(out), mountpoint.as_str())
        .check_exit_or_abort(format!("Can't mount one.img to {mountpoint}"))
        .mkdir(format!("{mountpoint}/boot"))
        .mkdir(format!("{mountpoint}/proc"))
        .copy_tree(format!("{base}/base"), mountpoint.as_str())
        .check_exit_or_unmount(
            mountpoint.as_str(),
            format!("Can't copy {base}/base to {mountpoint}"),
        )
        // Copied second so the output tree wins on conflicts.
        .copy_tree(format!("{out}/base"), mountpoint.as_str())
        .check_exit_or_unmount(
            mountpoint.as_str(),
            format!("Can't copy {out}/base to {mountpoint}"),
        )
        .unmount(mountpoint.as_str())
        .check_exit_or_abort(format!("Can't umount {mountpoint}"))
        .report_success("Sync")
}

fn build_script(arch: Arch) -> ShellScript {
    ShellScript::new()
        .run_checked(["ninja"], format!("Can't build for arch: {arch}"))
        .report_success(format!("Build for arch: {arch}"))
}

/// build, sync, then `last`, stopping at the first failure.
fn chain_script(last: &str, message: &str) -> ShellScript {
    ShellScript::new()
        .run_checked(["./build.sh"], message)
        .run_checked(["./sync.sh"], message)
        .run_checked([last], message)
}

/// Write the script set for the architecture tagged `arch` into `output_dir`.
///
/// Existing files are truncated and rewritten. Permissions are left alone;
/// see [`make_executable`].
pub fn generate(
    arch: &str,
    base_dir: &str,
    output_dir: &str,
    config: &ToolchainConfig,
) -> Result<Vec<PathBuf>, ScriptError> {
    let arch: Arch = arch.parse()?;
    let dir = Path::new(output_dir);

    let mut written = Vec::new();
    for file in render_all(arch, base_dir, output_dir, config) {
        let path = dir.join(file.name);
        fs::write(&path, file.contents.as_bytes()).map_err(|source| ScriptError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "wrote script");
        written.push(path);
    }

    tracing::info!(%arch, dir = %dir.display(), files = written.len(), "generated scripts");
    Ok(written)
}

/// Mark the generated shell scripts in `output_dir` as executable (`0755`).
#[cfg(unix)]
pub fn make_executable(output_dir: &Path) -> Result<Vec<PathBuf>, ScriptError> {
    use std::os::unix::fs::PermissionsExt;

    let mut changed = Vec::new();
    for name in SCRIPT_NAMES {
        let path = output_dir.join(name);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).map_err(|source| {
            ScriptError::Write {
                path: path.clone(),
                source,
            }
        })?;
        changed.push(path);
    }
    Ok(changed)
}
