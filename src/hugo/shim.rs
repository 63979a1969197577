//! Wrapper around asciidoctor that renders diagrams.
//!
//! Hugo calls `asciidoctor` from its search path with fixed arguments. The
//! wrapper installed here takes its place, loads `asciidoctor-diagram` and
//! moves the generated images to where the built site serves them.

use std::path::{Path, PathBuf};

use snafu::ResultExt;

use crate::common::{IoSnafu, Result, UrlSnafu};

pub const SHIM_NAME: &str = "asciidoctor";
const DIAGRAM_DIR: &str = "diagram";

/// Path of the base URL in the form used inside the generated `img src`,
/// without a trailing slash and with `/` escaped for sed.
pub fn escaped_base_path(base_url: &str) -> Result<String> {
    let url = url::Url::parse(base_url).context(UrlSnafu { url: base_url })?;
    let path = url.path().trim_end_matches('/');
    Ok(path.replace('/', "\\/"))
}

pub fn render_script(base_url: &str, site_dir: &Path) -> Result<String> {
    let escaped = escaped_base_path(base_url)?;
    let public_diagrams = site_dir.join("public").join(DIAGRAM_DIR);
    let public_diagrams = public_diagrams.display();

    Ok(format!(
        r#"#!/bin/bash
if [ -f /usr/local/bin/asciidoctor ]; then
  ad="/usr/local/bin/asciidoctor"
else
  ad="/usr/bin/asciidoctor"
fi

# An empty stylesheet keeps asciidoctor from embedding its default one
echo "" > empty.css

$ad -B . \
  -r asciidoctor-diagram \
  -a nofooter \
  -a stylesheet=empty.css \
  --safe \
  --trace \
  - | sed -E -e "s/img src=\"([^/]+)\"/img src=\"{escaped}\/{DIAGRAM_DIR}\/\1\"/"

mkdir -p "{public_diagrams}"

if ls *.svg >/dev/null 2>&1; then
  mv -f *.svg "{public_diagrams}"
fi

if ls *.png >/dev/null 2>&1; then
  mv -f *.png "{public_diagrams}"
fi
"#
    ))
}

/// Write the wrapper to `bin_dir` and return the directory to put in front
/// of hugo's search path. `None` where the wrapper is unsupported.
#[cfg(unix)]
pub fn install(base_url: &str, site_dir: &Path, bin_dir: &Path) -> Result<Option<PathBuf>> {
    use std::os::unix::fs::PermissionsExt;

    let site_dir = std::path::absolute(site_dir).context(IoSnafu {
        message: "Failed to resolve site directory",
        path: site_dir,
    })?;
    let script = render_script(base_url, &site_dir)?;

    std::fs::create_dir_all(bin_dir).context(IoSnafu {
        message: "Failed to create shim directory",
        path: bin_dir,
    })?;
    let shim = bin_dir.join(SHIM_NAME);
    std::fs::write(&shim, script).context(IoSnafu {
        message: "Failed to write asciidoctor shim",
        path: &shim,
    })?;
    std::fs::set_permissions(&shim, std::fs::Permissions::from_mode(0o700)).context(
        IoSnafu {
            message: "Failed to make asciidoctor shim executable",
            path: &shim,
        },
    )?;

    tracing::debug!(path = %shim.display(), "Installed asciidoctor shim");
    Ok(Some(bin_dir.to_path_buf()))
}

#[cfg(not(unix))]
pub fn install(_base_url: &str, _site_dir: &Path, _bin_dir: &Path) -> Result<Option<PathBuf>> {
    tracing::info!("Can't apply asciidoc diagram workaround on this platform");
    Ok(None)
}
