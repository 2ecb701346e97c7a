//! Helper script generation for xOS output trees.
//!
//! Given an architecture, the source tree and the build output directory,
//! [`generate`] writes the scripts a developer uses day to day: build with
//! ninja, sync the filesystem image, boot under QEMU (optionally waiting for
//! gdb), and a `.gdbinit` that attaches to it.

pub mod error;
pub mod generate;
pub mod script;

pub use error::ScriptError;
#[cfg(unix)]
pub use generate::make_executable;
pub use generate::{generate, normalize_dir, render_all, GeneratedFile, GDBINIT_NAME, SCRIPT_NAMES};
pub use script::{shell_word, ShellScript, Step};
