//! The merge procedure.
//!
//! A single source is copied byte-for-byte to the target. Two or more
//! sources are combined by the architecture's archiver, driven by an MRI
//! directive on standard input.

use std::path::{Path, PathBuf};

use xos_targets::{Arch, Archiver, ToolchainConfig};

use crate::directive::{DirectiveFile, MriDirective};
use crate::error::MergeError;
use crate::runner::{SystemRunner, ToolInvocation, ToolRunner};

/// How the target archive was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The only source was copied to the target.
    Copied { bytes: u64 },
    /// The archiver combined `inputs` archives (runtime libraries included).
    Archived { tool: String, inputs: usize },
}

/// Merges static archives for one toolchain configuration.
#[derive(Debug, Clone)]
pub struct LibMerger<R = SystemRunner> {
    config: ToolchainConfig,
    runner: R,
    work_dir: PathBuf,
}

impl LibMerger<SystemRunner> {
    /// A merger that runs real processes and writes directives to the
    /// current directory.
    pub fn new(config: ToolchainConfig) -> Result<Self, MergeError> {
        Ok(Self {
            config,
            runner: SystemRunner,
            work_dir: std::env::current_dir()?,
        })
    }
}

impl<R: ToolRunner> LibMerger<R> {
    pub fn with_runner(config: ToolchainConfig, runner: R, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            runner,
            work_dir: work_dir.into(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Merge `sources` into `target` for the architecture tagged `arch`.
    pub fn merge<P: AsRef<Path>>(
        &self,
        arch: &str,
        target: &Path,
        sources: &[P],
    ) -> Result<MergeOutcome, MergeError> {
        let arch: Arch = arch.parse()?;

        match sources {
            [] => Err(MergeError::NoSources),
            [only] => {
                let source = only.as_ref();
                if same_file(source, target)? {
                    return Err(MergeError::SameFile {
                        path: target.to_path_buf(),
                    });
                }
                let bytes = std::fs::copy(source, target)?;
                tracing::info!(
                    %arch,
                    source = %source.display(),
                    target = %target.display(),
                    bytes,
                    "copied single archive"
                );
                Ok(MergeOutcome::Copied { bytes })
            }
            _ => self.archive(arch, target, sources),
        }
    }

    fn archive<P: AsRef<Path>>(
        &self,
        arch: Arch,
        target: &Path,
        sources: &[P],
    ) -> Result<MergeOutcome, MergeError> {
        let archiver = Archiver::for_arch(arch, &self.config)?;

        let mut inputs: Vec<PathBuf> = sources.iter().map(|s| s.as_ref().to_path_buf()).collect();
        inputs.extend(archiver.runtime_libs.iter().cloned());

        let directive = MriDirective::merge(target, &inputs);
        // Removed on every return path below.
        let directive_file = DirectiveFile::create_in(&self.work_dir, &directive)?;

        let invocation = ToolInvocation {
            program: archiver.program.clone(),
            args: vec!["-M".to_string()],
            stdin: Some(directive_file.path().to_path_buf()),
        };
        let output = self.runner.run(&invocation)?.check(&archiver.program)?;
        if !output.stdout.is_empty() {
            tracing::trace!(
                tool = %archiver.program,
                stdout = %output.stdout.trim_end(),
                "archiver output"
            );
        }

        tracing::info!(
            %arch,
            tool = %archiver.program,
            inputs = inputs.len(),
            target = %target.display(),
            "merged archives"
        );
        Ok(MergeOutcome::Archived {
            tool: archiver.program,
            inputs: inputs.len(),
        })
    }
}

/// Whether `target` already exists and names the same file as `source`.
///
/// Copying a file onto itself truncates it before anything is read.
fn same_file(source: &Path, target: &Path) -> Result<bool, MergeError> {
    if !target.exists() {
        return Ok(false);
    }
    Ok(std::fs::canonicalize(source)? == std::fs::canonicalize(target)?)
}

/// Merge with a real archiver, using the current directory for the directive.
pub fn merge<P: AsRef<Path>>(
    arch: &str,
    target: &Path,
    sources: &[P],
    config: &ToolchainConfig,
) -> Result<MergeOutcome, MergeError> {
    LibMerger::new(config.clone())?.merge(arch, target, sources)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;

    use super::*;
    use crate::runner::ToolOutput;

    /// Records every invocation together with the directive it was fed.
    struct RecordingRunner {
        exit_code: i32,
        calls: RefCell<Vec<(ToolInvocation, String)>>,
    }

    impl RecordingRunner {
        fn exiting(exit_code: i32) -> Self {
            Self {
                exit_code,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ToolRunner for RecordingRunner {
        fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, MergeError> {
            let directive = match &invocation.stdin {
                Some(path) => fs::read_to_string(path)?,
                None => String::new(),
            };
            self.calls
                .borrow_mut()
                .push((invocation.clone(), directive));
            Ok(ToolOutput {
                exit_code: Some(self.exit_code),
                stdout: String::new(),
                stderr: if self.exit_code == 0 {
                    String::new()
                } else {
                    "ar: a.o: No such file or directory\n".into()
                },
            })
        }
    }

    fn arm_config() -> ToolchainConfig {
        ToolchainConfig {
            toolchain_root: Some("/opt/arm".into()),
            runtime_lib: Some("lib/libgcc.a".into()),
            emulator_path: None,
        }
    }

    fn leftover_directives(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "mri"))
            .collect()
    }

    #[test]
    fn single_source_is_copied_for_every_arch() {
        for arch in Arch::ALL {
            let dir = tempfile::tempdir().unwrap();
            let source = dir.path().join("a.o");
            let target = dir.path().join("out.a");
            fs::write(&source, b"!<arch>\nmember-bytes").unwrap();

            let merger =
                LibMerger::with_runner(arm_config(), RecordingRunner::exiting(0), dir.path());
            let outcome = merger.merge(arch.tag(), &target, &[&source]).unwrap();

            assert_eq!(outcome, MergeOutcome::Copied { bytes: 20 });
            assert_eq!(fs::read(&target).unwrap(), fs::read(&source).unwrap());
            assert!(merger.runner().calls.borrow().is_empty());
        }
    }

    #[test]
    fn single_source_onto_itself_keeps_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("libk.a");
        fs::write(&source, b"!<arch>\nkernel").unwrap();
        let merger = LibMerger::with_runner(
            ToolchainConfig::default(),
            RecordingRunner::exiting(0),
            dir.path(),
        );

        let spellings = [source.clone(), dir.path().join(".").join("libk.a")];
        for target in &spellings {
            let err = merger.merge("x86", target, &[&source]).unwrap_err();
            assert!(matches!(err, MergeError::SameFile { .. }), "{err}");
        }
        assert_eq!(fs::read(&source).unwrap(), b"!<arch>\nkernel");
    }

    #[test]
    fn single_source_aarch32_needs_no_toolchain_root() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.o");
        fs::write(&source, b"x").unwrap();
        let merger = LibMerger::with_runner(
            ToolchainConfig::default(),
            RecordingRunner::exiting(0),
            dir.path(),
        );
        let target = dir.path().join("out.a");
        assert!(merger.merge("aarch32", &target, &[&source]).is_ok());
    }

    #[test]
    fn two_sources_run_archiver_once_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let merger = LibMerger::with_runner(
            ToolchainConfig::default(),
            RecordingRunner::exiting(0),
            dir.path(),
        );

        let outcome = merger
            .merge("x86", Path::new("out.a"), &["a.o", "b.o"])
            .unwrap();
        assert_eq!(
            outcome,
            MergeOutcome::Archived {
                tool: "i686-elf-ar".into(),
                inputs: 2
            }
        );

        let calls = merger.runner().calls.borrow();
        assert_eq!(calls.len(), 1);
        let (invocation, directive) = &calls[0];
        assert_eq!(invocation.program, "i686-elf-ar");
        assert_eq!(invocation.args, vec!["-M"]);
        assert_eq!(directive, "CREATE out.a\nADDLIB a.o\nADDLIB b.o\nSAVE\nEND\n");
        assert!(leftover_directives(dir.path()).is_empty());
    }

    #[test]
    fn aarch32_appends_runtime_library_last() {
        let dir = tempfile::tempdir().unwrap();
        let merger = LibMerger::with_runner(arm_config(), RecordingRunner::exiting(0), dir.path());

        merger
            .merge("aarch32", Path::new("libc.a"), &["x.a", "y.a", "z.a"])
            .unwrap();

        let calls = merger.runner().calls.borrow();
        let (invocation, directive) = &calls[0];
        assert_eq!(invocation.program, "arm-none-eabi-ar");
        let lines: Vec<&str> = directive.lines().collect();
        assert_eq!(
            lines,
            vec![
                "CREATE libc.a",
                "ADDLIB x.a",
                "ADDLIB y.a",
                "ADDLIB z.a",
                "ADDLIB /opt/arm/lib/libgcc.a",
                "SAVE",
                "END",
            ]
        );
    }

    #[test]
    fn aarch32_merge_without_toolchain_root_fails_before_running() {
        let dir = tempfile::tempdir().unwrap();
        let merger = LibMerger::with_runner(
            ToolchainConfig::default(),
            RecordingRunner::exiting(0),
            dir.path(),
        );
        let err = merger
            .merge("aarch32", Path::new("out.a"), &["a.o", "b.o"])
            .unwrap_err();
        assert!(matches!(
            err,
            MergeError::Target(xos_targets::TargetError::MissingConfig { .. })
        ));
        assert!(merger.runner().calls.borrow().is_empty());
    }

    #[test]
    fn archiver_failure_is_reported_and_directive_removed() {
        let dir = tempfile::tempdir().unwrap();
        let merger = LibMerger::with_runner(
            ToolchainConfig::default(),
            RecordingRunner::exiting(1),
            dir.path(),
        );

        let err = merger
            .merge("x86", Path::new("out.a"), &["a.o", "b.o"])
            .unwrap_err();
        match err {
            MergeError::ExternalToolFailure {
                tool, exit_code, ..
            } => {
                assert_eq!(tool, "i686-elf-ar");
                assert_eq!(exit_code, Some(1));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(merger.runner().calls.borrow().len(), 1);
        assert!(leftover_directives(dir.path()).is_empty());
    }

    #[test]
    fn unsupported_arch_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let merger = LibMerger::with_runner(
            ToolchainConfig::default(),
            RecordingRunner::exiting(0),
            dir.path(),
        );
        for sources in [vec!["a.o"], vec!["a.o", "b.o"]] {
            let err = merger
                .merge("mips", Path::new("out.a"), sources.as_slice())
                .unwrap_err();
            assert!(err.is_unsupported_architecture());
        }
        assert!(merger.runner().calls.borrow().is_empty());
    }

    #[test]
    fn empty_source_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let merger = LibMerger::with_runner(
            ToolchainConfig::default(),
            RecordingRunner::exiting(0),
            dir.path(),
        );
        let none: [&str; 0] = [];
        let err = merger.merge("x86", Path::new("out.a"), &none).unwrap_err();
        assert!(matches!(err, MergeError::NoSources));
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_feeds_directive_to_archiver_on_path() {
        use std::os::unix::fs::PermissionsExt;

        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let captured = work.path().join("captured.txt");

        // Stands in for the cross archiver: insists on -M and keeps its stdin.
        let fake_ar = bin.path().join("i686-elf-ar");
        fs::write(
            &fake_ar,
            format!(
                "#!/bin/sh\n[ \"$1\" = \"-M\" ] || exit 9\ncat > '{}'\n",
                captured.display()
            ),
        )
        .unwrap();
        fs::set_permissions(&fake_ar, fs::Permissions::from_mode(0o755)).unwrap();

        let old_path = std::env::var_os("PATH").unwrap_or_default();
        let mut dirs = vec![bin.path().to_path_buf()];
        dirs.extend(std::env::split_paths(&old_path));
        std::env::set_var("PATH", std::env::join_paths(dirs).unwrap());

        let merger = LibMerger::with_runner(ToolchainConfig::default(), SystemRunner, work.path());
        let result = merger.merge("x86", Path::new("out.a"), &["a.a", "b.a"]);
        std::env::set_var("PATH", &old_path);

        assert_eq!(
            result.unwrap(),
            MergeOutcome::Archived {
                tool: "i686-elf-ar".into(),
                inputs: 2
            }
        );
        assert_eq!(
            fs::read_to_string(&captured).unwrap(),
            "CREATE out.a\nADDLIB a.a\nADDLIB b.a\nSAVE\nEND\n"
        );
        assert!(leftover_directives(work.path()).is_empty());
    }

    #[test]
    fn missing_single_source_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let merger = LibMerger::with_runner(
            ToolchainConfig::default(),
            RecordingRunner::exiting(0),
            dir.path(),
        );
        let err = merger
            .merge("x86", &dir.path().join("out.a"), &[dir.path().join("gone.o")])
            .unwrap_err();
        assert!(matches!(err, MergeError::Io(_)));
    }
}
