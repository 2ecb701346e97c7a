//! Architecture and toolchain model for the xOS build tools.
//!
//! - **Arch:** the supported target tags and their resolution
//! - **Toolchain:** which archiver to run and which runtime archives to fold in
//! - **Emulator:** the QEMU machine profile used to boot the image
//! - **Config:** host-specific paths supplied by file, environment or flags

pub mod arch;
pub mod config;
pub mod emulator;
pub mod error;
pub mod toolchain;

pub use arch::{Arch, ArchSupport};
pub use config::{ToolchainConfig, ENV_EMULATOR_PATH, ENV_TOOLCHAIN_ROOT};
pub use emulator::{EmulatorCommand, DEBUG_PORT};
pub use error::{Result, TargetError};
pub use toolchain::Archiver;
