//! Subprocess invocation for the delegated toolchain commands.
//!
//! Everything the tool cannot do itself (installing a versioned binary,
//! downloading an SDK, asking the toolchain for its version) goes through
//! [`Runner`], so tests can substitute a recording double.

use crate::error::{GoverError, Result};
use async_trait::async_trait;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

#[async_trait]
pub trait Runner: Send + Sync {
    /// Run a command, streaming its output through to the user.
    async fn run(&self, name: &str, args: &[&str]) -> Result<()>;

    /// Run a command and capture its stdout, with the given directories
    /// excluded from the child's search path. The exclusion is what forces
    /// the pristine toolchain binary to respond instead of the active
    /// symlink.
    async fn run_captured(&self, name: &str, args: &[&str], exclude: &[PathBuf]) -> Result<String>;
}

/// Remove the given directories from a `$PATH`-like string, preserving the
/// relative order of the remaining entries.
pub fn cut_from_path(path: &OsStr, exclude: &[PathBuf]) -> OsString {
    let kept = env::split_paths(path).filter(|p| !exclude.iter().any(|e| e == p));
    env::join_paths(kept).unwrap_or_else(|_| path.to_os_string())
}

/// The production [`Runner`] backed by [`tokio::process`].
///
/// Every child is spawned with `$GOBIN` pointing at the managed binary
/// directory, so `go install` drops versioned binaries where this tool
/// scans for them.
pub struct SystemRunner {
    gobin_dir: PathBuf,
}

impl SystemRunner {
    pub fn new(gobin_dir: PathBuf) -> Self {
        Self { gobin_dir }
    }

    fn command(&self, name: &str, args: &[&str]) -> Command {
        let mut cmd = Command::new(name);
        cmd.args(args)
            .env("GOBIN", &self.gobin_dir)
            .kill_on_drop(true);
        cmd
    }
}

fn display(name: &str, args: &[&str]) -> String {
    let mut command = name.to_string();
    for arg in args {
        command.push(' ');
        command.push_str(arg);
    }
    command
}

fn check_status(name: &str, args: &[&str], status: std::process::ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    Err(GoverError::CommandFailed {
        command: display(name, args),
        code: status.code().unwrap_or(1),
    })
}

#[async_trait]
impl Runner for SystemRunner {
    async fn run(&self, name: &str, args: &[&str]) -> Result<()> {
        let rendered = display(name, args);
        debug!("running `{rendered}`");
        let status = self
            .command(name, args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;
        check_status(name, args, status)
    }

    async fn run_captured(&self, name: &str, args: &[&str], exclude: &[PathBuf]) -> Result<String> {
        let rendered = display(name, args);
        debug!("running `{rendered}` with {exclude:?} off the path");
        let path = env::var_os("PATH").unwrap_or_default();
        let output = self
            .command(name, args)
            .env("PATH", cut_from_path(&path, exclude))
            .stderr(Stdio::inherit())
            .output()
            .await?;
        check_status(name, args, output.status)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn join(values: &[&str]) -> OsString {
        env::join_paths(values.iter().map(Path::new)).unwrap()
    }

    #[test]
    fn test_cut_from_path() {
        let path = join(&["/usr/bin", "/home/user/go/bin", "/usr/local/bin"]);
        let cut = cut_from_path(&path, &[PathBuf::from("/home/user/go/bin")]);
        assert_eq!(cut, join(&["/usr/bin", "/usr/local/bin"]));
    }

    #[test]
    fn test_cut_from_path_absent_value() {
        let path = join(&["/usr/bin", "/usr/local/bin"]);
        let cut = cut_from_path(&path, &[PathBuf::from("/nowhere")]);
        assert_eq!(cut, path);
    }

    #[test]
    fn test_cut_from_path_multiple_values() {
        let path = join(&["/a", "/b", "/c", "/d"]);
        let cut = cut_from_path(&path, &[PathBuf::from("/b"), PathBuf::from("/d")]);
        assert_eq!(cut, join(&["/a", "/c"]));
    }
}
