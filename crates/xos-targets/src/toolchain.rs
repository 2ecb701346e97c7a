//! Archiver selection per architecture.

use std::path::PathBuf;

use crate::arch::Arch;
use crate::config::ToolchainConfig;
use crate::error::Result;

/// The static-archive tool for an architecture, plus any runtime archives
/// that must be folded into every merged library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archiver {
    /// Binary name or path of the archiver.
    pub program: String,
    /// Archives appended after the caller's sources.
    pub runtime_libs: Vec<PathBuf>,
}

/// Binary name of the archiver for `arch`.
pub fn archiver_program(arch: Arch) -> &'static str {
    match arch {
        Arch::X86 => "i686-elf-ar",
        Arch::Aarch32 => "arm-none-eabi-ar",
    }
}

impl Archiver {
    /// Resolve the archiver for `arch`.
    ///
    /// `aarch32` links against the toolchain's `libgcc.a`, so it requires a
    /// configured toolchain root.
    pub fn for_arch(arch: Arch, config: &ToolchainConfig) -> Result<Self> {
        let runtime_libs = match arch {
            Arch::X86 => Vec::new(),
            Arch::Aarch32 => vec![config.runtime_lib_path()?],
        };
        Ok(Self {
            program: archiver_program(arch).to_string(),
            runtime_libs,
        })
    }
}
