use std::path::{Component, Path, PathBuf};

use snafu::ResultExt;
use walkdir::WalkDir;

use crate::common::{is_whitelisted, ConfigSnafu, Format, IoSnafu, Result, WalkSnafu};
use crate::markup;

use super::models::leaves_root;
use super::{Checkout, OriginFile};

const GIT_DIR: &str = ".git";

/// Drop `.` components so joined paths stay comparable.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Named components of a configured subdirectory. Roots and `..` are
/// dropped so the result never climbs out of the directory it is joined to.
fn relative(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

/// Destination of a remote file: the configured source dir is stripped from
/// the remote path and the remainder is joined below `compose_dir/target_dir`.
pub fn local_file_path(
    compose_dir: &Path,
    source_dir: &str,
    target_dir: &str,
    remote_path: &Path,
) -> PathBuf {
    let source = relative(Path::new(source_dir));
    let remote = relative(remote_path);
    let remainder = remote.strip_prefix(&source).unwrap_or(&remote);

    normalize(&compose_dir.join(relative(Path::new(target_dir))).join(remainder))
}

impl Checkout<'_> {
    /// Recursively list the whitelisted files below the origin's source dir.
    pub fn whitelisted_files(&self, compose_dir: &Path) -> Result<Vec<OriginFile<'_>>> {
        let origin = self.origin();
        if leaves_root(&origin.source_dir) {
            return ConfigSnafu {
                message: format!("Doc dir {} leaves the repository", origin.source_dir),
                prefix: format!("origins.{}", origin.display_url()),
            }
            .fail();
        }
        let start = self.root().join(relative(Path::new(&origin.source_dir)));

        if !start.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no directory '{}' on branch '{}'", origin.source_dir, origin.branch),
            ))
            .context(IoSnafu {
                message: "Failed to read source directory",
                path: start,
            });
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&start)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != GIT_DIR);

        for entry in walker {
            let entry = entry.context(WalkSnafu { path: &start })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if !is_whitelisted(&entry.file_name().to_string_lossy(), &origin.whitelist) {
                tracing::trace!(path = %entry.path().display(), "Skipping file");
                continue;
            }

            // The path as stored in the repository.
            let remote_path = entry
                .path()
                .strip_prefix(self.root())
                .unwrap_or(entry.path())
                .to_path_buf();
            let local_path = local_file_path(
                compose_dir,
                &origin.source_dir,
                &origin.target_dir,
                &remote_path,
            );

            files.push(OriginFile {
                remote_path,
                local_path,
                checkout: self,
            });
        }

        Ok(files)
    }

    /// Copy all whitelisted files of the origin below `compose_dir`.
    /// Returns the number of files written.
    pub fn compose(&self, compose_dir: &Path) -> Result<usize> {
        let origin = self.origin();
        let files = self.whitelisted_files(compose_dir)?;

        if files.is_empty() {
            tracing::warn!(
                url = origin.display_url(),
                branch = origin.branch,
                source_dir = origin.source_dir,
                "Found no matching files"
            );
        }

        for file in &files {
            file.compose()?;
        }

        tracing::info!(
            url = origin.display_url(),
            files = files.len(),
            target_dir = origin.target_dir,
            "Origin composed"
        );
        Ok(files.len())
    }
}

impl OriginFile<'_> {
    /// Write the file to its local path, postprocessing markup.
    pub fn compose(&self) -> Result<()> {
        self.create_parent_dir()?;

        match Format::detect(&self.remote_path) {
            format @ (Format::Markdown | Format::Asciidoc) => self.copy_markup_file(format)?,
            Format::Other => self.copy_regular_file()?,
        }

        tracing::info!(
            "{} -> {}",
            self.remote_path.display(),
            self.local_path.display()
        );
        Ok(())
    }

    fn create_parent_dir(&self) -> Result<()> {
        let Some(parent) = self.local_path.parent() else {
            return Ok(());
        };
        tracing::debug!(path = %parent.display(), "Creating local folder");
        std::fs::create_dir_all(parent).context(IoSnafu {
            message: "Failed to create directory",
            path: parent,
        })
    }

    fn copy_regular_file(&self) -> Result<()> {
        let source = self.source_path();
        std::fs::copy(&source, &self.local_path).context(IoSnafu {
            message: format!("Failed to copy {} to", source.display()),
            path: &self.local_path,
        })?;
        Ok(())
    }

    fn copy_markup_file(&self, format: Format) -> Result<()> {
        let source = self.source_path();
        let dirty = std::fs::read(&source).context(IoSnafu {
            message: "Failed to read markup file",
            path: &source,
        })?;

        let content = match String::from_utf8(dirty) {
            Ok(text) => markup::postprocess(format, &text).into_bytes(),
            Err(err) => {
                tracing::warn!(
                    path = %self.remote_path.display(),
                    "Markup file is not valid UTF-8, copying unchanged"
                );
                err.into_bytes()
            }
        };

        std::fs::write(&self.local_path, content).context(IoSnafu {
            message: "Failed to write file",
            path: &self.local_path,
        })
    }
}
