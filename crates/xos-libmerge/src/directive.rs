//! MRI directives for `ar -M`.
//!
//! A directive creates the target archive, pulls in every member of each
//! source archive in order, then saves. Member order follows source order,
//! which is what the linker sees when it resolves symbols.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// One line of an MRI script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MriCommand {
    Create(PathBuf),
    AddLib(PathBuf),
    Save,
    End,
}

/// An ordered MRI script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MriDirective {
    commands: Vec<MriCommand>,
}

impl MriDirective {
    /// Build the directive that merges `sources` into `target`.
    pub fn merge<P: AsRef<Path>>(target: &Path, sources: &[P]) -> Self {
        let mut commands = Vec::with_capacity(sources.len() + 3);
        commands.push(MriCommand::Create(target.to_path_buf()));
        commands.extend(
            sources
                .iter()
                .map(|s| MriCommand::AddLib(s.as_ref().to_path_buf())),
        );
        commands.push(MriCommand::Save);
        commands.push(MriCommand::End);
        Self { commands }
    }

    pub fn commands(&self) -> &[MriCommand] {
        &self.commands
    }

    /// Render as newline-terminated MRI text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for command in &self.commands {
            let line = match command {
                MriCommand::Create(path) => format!("CREATE {}", path.display()),
                MriCommand::AddLib(path) => format!("ADDLIB {}", path.display()),
                MriCommand::Save => "SAVE".to_string(),
                MriCommand::End => "END".to_string(),
            };
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

/// A directive written to a uniquely named file in a working directory.
///
/// The file name is `libmerger<random>.mri`, created with exclusive-create
/// semantics, so concurrent merges sharing a directory never collide. The
/// file is removed when this value is dropped.
#[derive(Debug)]
pub struct DirectiveFile {
    file: NamedTempFile,
}

impl DirectiveFile {
    /// Write `directive` into a fresh file under `dir`.
    pub fn create_in(dir: &Path, directive: &MriDirective) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("libmerger")
            .suffix(".mri")
            .tempfile_in(dir)?;
        file.write_all(directive.render().as_bytes())?;
        file.flush()?;
        tracing::debug!(path = %file.path().display(), "wrote MRI directive");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
