//! xos-build — host-side build helpers for xOS.

mod commands;
mod manifest;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use manifest::ConfigOverrides;

#[derive(Parser)]
#[command(name = "xos-build", version, about = "Build helpers for the xOS image")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Cross toolchain root (overrides XOS_TOOLCHAIN_ROOT and xos-build.toml)
    #[arg(long, global = true)]
    toolchain_root: Option<PathBuf>,
    /// Emulator binary (overrides XOS_EMULATOR_PATH and xos-build.toml)
    #[arg(long, global = true)]
    emulator: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge static archives into one
    MergeLibs {
        /// Target architecture (x86, aarch32)
        arch: String,
        /// Archive to create
        target: PathBuf,
        /// Archives to merge, in link order
        #[arg(required = true)]
        sources: Vec<PathBuf>,
    },
    /// Generate build/sync/run/debug scripts and .gdbinit
    BuildScripts {
        /// Target architecture (x86, aarch32)
        arch: String,
        /// Source tree containing base/
        base_dir: String,
        /// Build output directory the scripts are written to
        out_dir: String,
        /// Mark the generated scripts executable
        #[arg(long)]
        executable: bool,
    },
    /// Inspect supported architectures
    Arch {
        #[command(subcommand)]
        action: ArchAction,
    },
    /// Check host tools and configuration
    Doctor {
        /// Check a single architecture
        #[arg(long)]
        arch: Option<String>,
    },
}

#[derive(Subcommand)]
enum ArchAction {
    /// List supported architectures
    List,
    /// Show the resolved archiver and emulator for an architecture
    Describe {
        /// Architecture tag
        arch: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let overrides = ConfigOverrides {
        toolchain_root: cli.toolchain_root,
        emulator: cli.emulator,
    };

    match cli.command {
        Commands::MergeLibs {
            arch,
            target,
            sources,
        } => {
            let resolved = manifest::resolve_from_process(&cwd, &overrides)?;
            commands::merge_libs::run(&arch, &target, &sources, &resolved.config)
        }

        Commands::BuildScripts {
            arch,
            base_dir,
            out_dir,
            executable,
        } => {
            let resolved = manifest::resolve_from_process(&cwd, &overrides)?;
            commands::build_scripts::run(&arch, &base_dir, &out_dir, executable, &resolved.config)
        }

        Commands::Arch { action } => match action {
            ArchAction::List => commands::arch::list(),
            ArchAction::Describe { arch } => {
                let resolved = manifest::resolve_from_process(&cwd, &overrides)?;
                commands::arch::describe(&arch, &resolved.config)
            }
        },

        Commands::Doctor { arch } => {
            let resolved = manifest::resolve_from_process(&cwd, &overrides)?;
            commands::doctor::run(&resolved, arch.as_deref())
        }
    }
}
