use std::path::{Path, PathBuf};
use std::process::Command;

use snafu::ResultExt;

use crate::common::{CloneSnafu, CommandSnafu, IoSnafu, Result};

use super::Origin;

const FETCHER_NAME: &str = "git";

/// Materializes the content of an origin in a local directory.
pub trait Fetcher {
    /// Populate `dest`, which does not exist yet, with the origin's files.
    fn fetch(&self, origin: &Origin, dest: &Path) -> Result<()>;
}

/// Shallow, single branch clones through the git executable.
pub struct GitFetcher {
    binary: String,
}

impl GitFetcher {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn redact(&self, origin: &Origin, message: &str) -> String {
        match origin.credentials() {
            Some(credentials) if !credentials.password.is_empty() => {
                message.replace(&credentials.password, "***")
            }
            _ => message.to_string(),
        }
    }
}

impl Default for GitFetcher {
    fn default() -> Self {
        Self::new("git")
    }
}

impl Fetcher for GitFetcher {
    fn fetch(&self, origin: &Origin, dest: &Path) -> Result<()> {
        tracing::info!(
            fetcher = FETCHER_NAME,
            url = origin.display_url(),
            branch = origin.branch,
            "Cloning origin"
        );

        let output = Command::new(&self.binary)
            .args(["clone", "--quiet", "--depth", "1", "--single-branch", "--branch"])
            .arg(&origin.branch)
            .arg("--")
            .arg(origin.clone_url()?)
            .arg(dest)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .context(CommandSnafu {
                command: format!("{} clone", self.binary),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return CloneSnafu {
                url: origin.display_url(),
                branch: origin.branch.clone(),
                message: self.redact(origin, stderr.trim()),
            }
            .fail();
        }

        tracing::debug!(
            fetcher = FETCHER_NAME,
            url = origin.display_url(),
            dest = %dest.display(),
            "Clone completed"
        );
        Ok(())
    }
}

/// A fetched snapshot of an origin on the local disk. The directory is
/// removed when the checkout is dropped.
#[derive(Debug)]
pub struct Checkout<'a> {
    origin: &'a Origin,
    root: PathBuf,
}

impl<'a> Checkout<'a> {
    /// Fetch `origin` into a fresh directory below `scratch_dir`.
    pub fn create(
        fetcher: &dyn Fetcher,
        origin: &'a Origin,
        scratch_dir: &Path,
    ) -> Result<Self> {
        std::fs::create_dir_all(scratch_dir).context(IoSnafu {
            message: "Failed to create checkout directory",
            path: scratch_dir,
        })?;
        let root = scratch_dir.join(uuid::Uuid::new_v4().to_string());
        // Owning the directory before fetching guarantees clean-up on failure.
        let checkout = Self { origin, root };
        fetcher.fetch(origin, &checkout.root)?;
        Ok(checkout)
    }

    pub fn origin(&self) -> &'a Origin {
        self.origin
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for Checkout<'_> {
    fn drop(&mut self) {
        if !self.root.exists() {
            return;
        }
        if let Err(err) = std::fs::remove_dir_all(&self.root) {
            tracing::warn!(
                path = %self.root.display(),
                error = %err,
                "Failed to remove checkout"
            );
        }
    }
}
