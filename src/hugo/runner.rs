use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use snafu::ResultExt;

use crate::common::{CommandSnafu, HugoSnafu, Result};

/// Invokes the hugo executable.
#[derive(Debug, Clone)]
pub struct Hugo {
    binary: String,
    fail_on_error: bool,
    path_prefix: Vec<PathBuf>,
    working_dir: Option<PathBuf>,
}

impl Hugo {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            fail_on_error: false,
            path_prefix: Vec::new(),
            working_dir: None,
        }
    }

    pub fn fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.fail_on_error = fail_on_error;
        self
    }

    /// Directories searched before the inherited PATH of the hugo process.
    pub fn with_path_prefix(mut self, dir: impl Into<PathBuf>) -> Self {
        self.path_prefix.push(dir.into());
        self
    }

    /// Run hugo inside `dir`. Relative arguments resolve against it.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// A relative binary path like `bin/hugo` names a file below the current
    /// directory, not below the working dir of the child.
    fn program(&self) -> PathBuf {
        let binary = Path::new(&self.binary);
        if self.working_dir.is_none() || binary.is_absolute() || binary.components().count() < 2 {
            return binary.to_path_buf();
        }
        std::path::absolute(binary).unwrap_or_else(|_| binary.to_path_buf())
    }

    fn search_path(&self) -> Option<OsString> {
        if self.path_prefix.is_empty() {
            return None;
        }
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let dirs = self
            .path_prefix
            .iter()
            .cloned()
            .chain(std::env::split_paths(&inherited));
        match std::env::join_paths(dirs) {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!(error = %err, "Cannot extend PATH for hugo");
                None
            }
        }
    }

    /// Run hugo with the given arguments, failing on a non-zero exit.
    pub fn run(&self, args: &[&str]) -> Result<()> {
        let joined = args.join(" ");
        tracing::info!(binary = self.binary, args = joined, "Running hugo");

        let mut command = Command::new(self.program());
        command.args(args);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        if let Some(path) = self.search_path() {
            command.env("PATH", path);
        }

        let output = command.output().context(CommandSnafu {
            command: format!("{} {joined}", self.binary),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::debug!(args = joined, "{}", stdout.trim());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return HugoSnafu {
                args: joined,
                message: format!("{}: {}", output.status, stderr.trim()),
            }
            .fail();
        }
        Ok(())
    }

    /// Run hugo, only propagating failures when configured to fail on error.
    pub fn run_step(&self, args: &[&str]) -> Result<()> {
        match self.run(args) {
            Err(err) if !self.fail_on_error => {
                tracing::error!(error = %err, "Ignoring hugo failure");
                Ok(())
            }
            result => result,
        }
    }
}
