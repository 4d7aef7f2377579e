use std::{
    path::{Path, PathBuf},
    process::Command,
};

use log::info;

use crate::config::BurnConfig;

/// Runs the external burner once and waits for it to exit.
pub trait Burner {
    /// Returns the exit code, `None` if the process was killed by a signal.
    fn invoke(&self, working_dir: &Path, files: &[PathBuf]) -> std::io::Result<Option<i32>>;
}

/// Invokes the configured burn executable with one `-file:"name"` flag per
/// track.
pub struct BurnExecutable {
    executable: PathBuf,
    args: Vec<String>,
}

impl BurnExecutable {
    pub fn new(config: &BurnConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            args: config.args.clone(),
        }
    }

    fn command(&self, working_dir: &Path, files: &[PathBuf]) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.current_dir(working_dir).args(&self.args);
        for file in files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            push_file_flag(&mut cmd, &file_flag(&name));
        }
        cmd
    }
}

pub fn file_flag(name: &str) -> String {
    format!("-file:\"{name}\"")
}

// the flag carries its own quotes, so it must reach the burner verbatim
#[cfg(windows)]
fn push_file_flag(cmd: &mut Command, flag: &str) {
    use std::os::windows::process::CommandExt;
    cmd.raw_arg(flag);
}

#[cfg(not(windows))]
fn push_file_flag(cmd: &mut Command, flag: &str) {
    cmd.arg(flag);
}

impl Burner for BurnExecutable {
    fn invoke(&self, working_dir: &Path, files: &[PathBuf]) -> std::io::Result<Option<i32>> {
        info!(
            "running {} with {} tracks in {}",
            self.executable.display(),
            files.len(),
            working_dir.display()
        );
        let status = self.command(working_dir, files).status()?;
        Ok(status.code())
    }
}
