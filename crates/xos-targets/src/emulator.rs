//! Emulator invocation profiles.
//!
//! Each architecture boots under a fixed QEMU machine: memory size, the disk
//! image attachment, console routing and (on ARM) the kernel location are
//! all part of the profile. Only the emulator binary is configurable.

use crate::arch::Arch;
use crate::config::ToolchainConfig;

/// TCP port the emulator's gdb stub listens on (`-s`).
pub const DEBUG_PORT: u16 = 1234;

/// Default emulator binary for `arch`.
pub fn default_emulator(arch: Arch) -> &'static str {
    match arch {
        Arch::X86 => "qemu-system-i386",
        Arch::Aarch32 => "qemu-system-arm",
    }
}

/// Kernel image inside the output tree.
pub fn kernel_path(out_dir: &str) -> String {
    format!("{out_dir}/base/boot/kernel.bin")
}

/// Disk image holding the root filesystem.
pub fn disk_image_path(out_dir: &str) -> String {
    format!("{out_dir}/one.img")
}

/// A fully resolved emulator command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EmulatorCommand {
    /// Build the boot command for `arch` against the output tree `out_dir`.
    ///
    /// `out_dir` is used verbatim; callers strip trailing separators first.
    pub fn for_arch(arch: Arch, out_dir: &str, config: &ToolchainConfig) -> Self {
        let program = config
            .emulator_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| default_emulator(arch).to_string());

        let args: Vec<String> = match arch {
            Arch::X86 => vec![
                "-m".into(),
                "256M".into(),
                "-fda".into(),
                format!("{out_dir}/os-image.bin"),
                "-device".into(),
                "piix3-ide,id=ide".into(),
                "-drive".into(),
                format!("id=disk,file={},if=none", disk_image_path(out_dir)),
                "-device".into(),
                "ide-drive,drive=disk,bus=ide.0".into(),
                "-serial".into(),
                "mon:stdio".into(),
                "-rtc".into(),
                "base=utc".into(),
                "-vga".into(),
                "std".into(),
            ],
            Arch::Aarch32 => vec![
                "-M".into(),
                "vexpress-a15".into(),
                "-cpu".into(),
                "cortex-a15".into(),
                "-kernel".into(),
                kernel_path(out_dir),
                "-serial".into(),
                "mon:stdio".into(),
                "-vga".into(),
                "std".into(),
                "-sd".into(),
                disk_image_path(out_dir),
            ],
        };

        Self { program, args }
    }

    /// The same command with the gdb stub enabled and the CPU halted at start.
    pub fn with_debug_stub(mut self) -> Self {
        self.args.push("-s".into());
        self.args.push("-S".into());
        self
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }
}
