//! `xos-build doctor` — host tool diagnostics.

use std::process::Command;

use anyhow::Result;
use xos_targets::toolchain::archiver_program;
use xos_targets::{Arch, EmulatorCommand, ToolchainConfig};

use crate::manifest::ResolvedConfig;

/// Report configuration and whether the external tools can be found.
pub fn run(resolved: &ResolvedConfig, arch: Option<&str>) -> Result<()> {
    let arches: Vec<Arch> = match arch {
        Some(tag) => vec![tag.parse()?],
        None => Arch::ALL.to_vec(),
    };

    println!("=== xos-build doctor ===");
    println!();
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("--- Configuration ---");
    match &resolved.manifest {
        Some(path) => println!("  Manifest:       {}", path.display()),
        None => println!("  Manifest:       not found"),
    }
    print_config(&resolved.config);
    println!();

    for arch in arches {
        println!("--- {arch} ---");
        print_tool_status(archiver_program(arch), &["--version"]);
        let emulator = EmulatorCommand::for_arch(arch, ".", &resolved.config);
        print_tool_status(&emulator.program, &["--version"]);
        println!();
    }

    println!("--- Host Tools ---");
    print_tool_status("ninja", &["--version"]);
    print_tool_status("fuse-ext2", &["--version"]);
    print_tool_status("gdb", &["--version"]);

    Ok(())
}

fn print_config(config: &ToolchainConfig) {
    let show = |value: Option<&std::path::Path>| {
        value.map_or_else(|| "(unset)".to_string(), |p| p.display().to_string())
    };
    println!("  Toolchain root: {}", show(config.toolchain_root.as_deref()));
    println!("  Runtime lib:    {}", show(config.runtime_lib.as_deref()));
    println!("  Emulator:       {}", show(config.emulator_path.as_deref()));
}

fn print_tool_status(name: &str, args: &[&str]) {
    match Command::new(name).args(args).output() {
        Ok(output) => {
            let version = String::from_utf8_lossy(&output.stdout);
            let first_line = version.lines().next().unwrap_or("(unknown version)");
            println!("  {name}: {first_line}");
        }
        Err(_) => {
            println!("  {name}: not found");
        }
    }
}
