//! Architecture tags.
//!
//! Every tool in this workspace is parameterized by the CPU architecture the
//! OS image is built for. Tags arrive as plain strings from the build graph,
//! so resolution is an explicit step that either yields a supported
//! [`Arch`] or names the tag that was rejected.

use std::fmt;
use std::str::FromStr;

use crate::error::TargetError;

/// A supported target architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 32-bit x86 (i686), booted from a floppy image with an IDE disk.
    X86,
    /// 32-bit ARM (Cortex-A15 on the vexpress-a15 board).
    Aarch32,
}

/// Outcome of resolving an architecture tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchSupport {
    Supported(Arch),
    Unsupported(String),
}

impl Arch {
    /// All supported architectures, in display order.
    pub const ALL: [Arch; 2] = [Arch::X86, Arch::Aarch32];

    /// Resolve a tag such as `"x86"` or `"aarch32"`.
    pub fn resolve(tag: &str) -> ArchSupport {
        match tag {
            "x86" => ArchSupport::Supported(Arch::X86),
            "aarch32" => ArchSupport::Supported(Arch::Aarch32),
            other => ArchSupport::Unsupported(other.to_string()),
        }
    }

    /// The canonical tag, as used on the command line and in the build graph.
    pub fn tag(self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::Aarch32 => "aarch32",
        }
    }
}

impl ArchSupport {
    /// Turn the tagged result into a `Result`, naming the rejected tag.
    pub fn require(self) -> Result<Arch, TargetError> {
        match self {
            ArchSupport::Supported(arch) => Ok(arch),
            ArchSupport::Unsupported(arch) => Err(TargetError::UnsupportedArchitecture { arch }),
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, ArchSupport::Supported(_))
    }
}

impl FromStr for Arch {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Arch::resolve(s).require()
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
