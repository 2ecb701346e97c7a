//! Typed bash script builder.
//!
//! Scripts are assembled from [`Step`]s and rendered in one place, so every
//! generated file shares the same prelude, the same failure check and the
//! same quoting rules.

/// Colour variables shared by every generated script.
const PRELUDE: &str = r#"#!/bin/bash
GREEN='\033[0;32m'
RED='\033[0;31m'
NC='\033[0m'
ERROR="${RED}[ERROR]${NC}"
SUCCESS="${GREEN}[SUCCESS]${NC}"
"#;

/// One line (or group of lines) of a generated script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// An empty separator line.
    Blank,
    /// A command, one entry per shell word.
    RunCommand(Vec<String>),
    /// Abort with a red error message if the previous command failed.
    CheckExitOrAbort(String),
    /// Like [`Step::CheckExitOrAbort`], but unmount `mountpoint` first.
    CheckExitOrUnmount { mountpoint: String, message: String },
    /// `mkdir -p`.
    MakeDir(String),
    /// Mount an ext2 disk image read-write with `fuse-ext2`.
    Mount { image: String, mountpoint: String },
    /// Recursively copy the contents of one directory into another.
    CopyTree { from: String, to: String },
    Unmount(String),
    /// Print a green success message.
    ReportSuccess(String),
}

/// A bash script under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellScript {
    elevated: bool,
    steps: Vec<Step>,
}

impl ShellScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run filesystem steps (mkdir, mount, copy, unmount) under `sudo`.
    pub fn elevated(mut self) -> Self {
        self.elevated = true;
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn blank(self) -> Self {
        self.step(Step::Blank)
    }

    pub fn run_command<I, S>(self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.step(Step::RunCommand(words.into_iter().map(Into::into).collect()))
    }

    pub fn check_exit_or_abort(self, message: impl Into<String>) -> Self {
        self.step(Step::CheckExitOrAbort(message.into()))
    }

    /// Abort with `message` if the previous step failed, releasing the
    /// mounted `mountpoint` on the way out.
    pub fn check_exit_or_unmount(
        self,
        mountpoint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.step(Step::CheckExitOrUnmount {
            mountpoint: mountpoint.into(),
            message: message.into(),
        })
    }

    /// Run a command and abort with `message` if it fails.
    pub fn run_checked<I, S>(self, words: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_command(words).check_exit_or_abort(message)
    }

    pub fn mkdir(self, path: impl Into<String>) -> Self {
        self.step(Step::MakeDir(path.into()))
    }

    pub fn mount(self, image: impl Into<String>, mountpoint: impl Into<String>) -> Self {
        self.step(Step::Mount {
            image: image.into(),
            mountpoint: mountpoint.into(),
        })
    }

    pub fn copy_tree(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.step(Step::CopyTree {
            from: from.into(),
            to: to.into(),
        })
    }

    pub fn unmount(self, mountpoint: impl Into<String>) -> Self {
        self.step(Step::Unmount(mountpoint.into()))
    }

    pub fn report_success(self, message: impl Into<String>) -> Self {
        self.step(Step::ReportSuccess(message.into()))
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Render to bash source. Every line, including the last, ends in `\n`.
    pub fn render(&self) -> String {
        let mut out = String::from(PRELUDE);
        out.push('\n');
        for step in &self.steps {
            out.push_str(&self.render_step(step));
            out.push('\n');
        }
        out
    }

    fn render_step(&self, step: &Step) -> String {
        let sudo = if self.elevated { "sudo " } else { "" };
        match step {
            Step::Blank => String::new(),
            Step::RunCommand(words) => words
                .iter()
                .map(|w| shell_word(w))
                .collect::<Vec<_>>()
                .join(" "),
            Step::CheckExitOrAbort(message) => format!(
                "if [ $? -ne 0 ]; then echo -e \"${{ERROR}} {}\" && exit 1; fi",
                escape_double_quoted(message)
            ),
            Step::CheckExitOrUnmount {
                mountpoint,
                message,
            } => format!(
                "if [ $? -ne 0 ]; then {sudo}umount {}; echo -e \"${{ERROR}} {}\" && exit 1; fi",
                shell_word(mountpoint),
                escape_double_quoted(message)
            ),
            Step::MakeDir(path) => format!("{sudo}mkdir -p {}", shell_word(path)),
            Step::Mount { image, mountpoint } => format!(
                "{sudo}fuse-ext2 {} {} -o rw+",
                shell_word(image),
                shell_word(mountpoint)
            ),
            // The glob must stay outside the quotes to expand.
            Step::CopyTree { from, to } => {
                format!("{sudo}cp -r {}/* {}/", shell_word(from), shell_word(to))
            }
            Step::Unmount(mountpoint) => format!("{sudo}umount {}", shell_word(mountpoint)),
            Step::ReportSuccess(message) => {
                format!("echo -e \"${{SUCCESS}} {}\"", escape_double_quoted(message))
            }
        }
    }
}

/// Quote `word` for bash if it contains anything but plain path characters.
pub fn shell_word(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:,=+@%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Escape text for use inside a double-quoted bash string.
fn escape_double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '"' | '$' | '`' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_script_is_prelude_only() {
        let text = ShellScript::new().render();
        assert!(text.starts_with("#!/bin/bash\n"));
        assert!(text.contains("ERROR=\"${RED}[ERROR]${NC}\"\n"));
        assert!(text.contains("SUCCESS=\"${GREEN}[SUCCESS]${NC}\"\n"));
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn checked_command_renders_abort_line() {
        let text = ShellScript::new()
            .run_checked(["ninja"], "Can't build for arch: x86")
            .render();
        assert!(text.ends_with(concat!(
            "ninja\n",
            "if [ $? -ne 0 ]; then echo -e \"${ERROR} Can't build for arch: x86\" && exit 1; fi\n"
        )));
    }

    #[test]
    fn failed_copy_unmounts_before_aborting() {
        let text = ShellScript::new()
            .elevated()
            .copy_tree("/b/base", "/b/mountpoint")
            .check_exit_or_unmount("/b/mountpoint", "Can't copy /b/base to /b/mountpoint")
            .render();
        assert!(text.ends_with(concat!(
            "sudo cp -r /b/base/* /b/mountpoint/\n",
            "if [ $? -ne 0 ]; then sudo umount /b/mountpoint; ",
            "echo -e \"${ERROR} Can't copy /b/base to /b/mountpoint\" && exit 1; fi\n"
        )));
    }

    #[test]
    fn unmount_check_quotes_the_mountpoint() {
        let text = ShellScript::new()
            .check_exit_or_unmount("/my disk/mnt", "Can't copy")
            .render();
        assert!(text.contains("then umount '/my disk/mnt'; echo -e"));
    }

    #[test]
    fn elevated_filesystem_steps_use_sudo() {
        let text = ShellScript::new()
            .elevated()
            .mkdir("/b/mountpoint")
            .mount("/o/one.img", "/b/mountpoint")
            .copy_tree("/b/base", "/b/mountpoint")
            .unmount("/b/mountpoint")
            .run_command(["true"])
            .render();
        assert!(text.contains("sudo mkdir -p /b/mountpoint\n"));
        assert!(text.contains("sudo fuse-ext2 /o/one.img /b/mountpoint -o rw+\n"));
        assert!(text.contains("sudo cp -r /b/base/* /b/mountpoint/\n"));
        assert!(text.contains("sudo umount /b/mountpoint\n"));
        // Plain commands are not elevated.
        assert!(text.contains("\ntrue\n"));
    }

    #[test]
    fn unelevated_steps_have_no_sudo() {
        let text = ShellScript::new().mkdir("/tmp/x").render();
        assert!(text.contains("\nmkdir -p /tmp/x\n"));
        assert!(!text.contains("sudo"));
    }

    #[test]
    fn shell_word_quotes_only_when_needed() {
        assert_eq!(shell_word("/o/base/boot/kernel.bin"), "/o/base/boot/kernel.bin");
        assert_eq!(
            shell_word("id=disk,file=/o/one.img,if=none"),
            "id=disk,file=/o/one.img,if=none"
        );
        assert_eq!(shell_word("mon:stdio"), "mon:stdio");
        assert_eq!(shell_word("/my disk/one.img"), "'/my disk/one.img'");
        assert_eq!(shell_word("it's"), r"'it'\''s'");
        assert_eq!(shell_word(""), "''");
    }

    #[test]
    fn copy_tree_keeps_glob_outside_quotes() {
        let text = ShellScript::new().copy_tree("/a b", "/c").render();
        assert!(text.contains("cp -r '/a b'/* /c/\n"));
    }

    #[test]
    fn messages_are_escaped() {
        let text = ShellScript::new().report_success("cost $5 \"now\"").render();
        assert!(text.contains(r#"echo -e "${SUCCESS} cost \$5 \"now\"""#));
    }
}
