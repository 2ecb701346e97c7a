//! `xos-build arch` — supported architectures and their tools.

use anyhow::Result;
use xos_targets::emulator::{default_emulator, kernel_path};
use xos_targets::toolchain::archiver_program;
use xos_targets::{Arch, Archiver, EmulatorCommand, ToolchainConfig, DEBUG_PORT};

/// List all supported architectures.
pub fn list() -> Result<()> {
    println!("Supported architectures:");
    println!();
    for arch in Arch::ALL {
        println!(
            "  {:<10} archiver: {:<18} emulator: {}",
            arch.tag(),
            archiver_program(arch),
            default_emulator(arch)
        );
    }
    println!();
    println!("Use 'xos-build arch describe <arch>' for details.");
    Ok(())
}

/// Describe the resolved tools for one architecture.
pub fn describe(tag: &str, config: &ToolchainConfig) -> Result<()> {
    let arch: Arch = tag.parse()?;

    println!("=== Architecture: {arch} ===");
    println!();

    println!("--- Archiver ---");
    match Archiver::for_arch(arch, config) {
        Ok(archiver) => {
            println!("  Program: {}", archiver.program);
            if archiver.runtime_libs.is_empty() {
                println!("  Runtime libraries: (none)");
            } else {
                println!("  Runtime libraries:");
                for lib in &archiver.runtime_libs {
                    println!("    {}", lib.display());
                }
            }
        }
        Err(e) => {
            println!("  Program: {}", archiver_program(arch));
            println!("  Runtime libraries: unresolved ({e})");
        }
    }
    println!();

    println!("--- Emulator ---");
    let command = EmulatorCommand::for_arch(arch, "<out>", config);
    println!("  Run:    {}", command.argv().collect::<Vec<_>>().join(" "));
    println!("  Debug:  adds -s -S, gdb stub on :{DEBUG_PORT}");
    println!("  Kernel: {}", kernel_path("<out>"));

    Ok(())
}
