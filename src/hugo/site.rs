use std::path::Path;

use snafu::ResultExt;

use crate::common::{IoSnafu, Result, SerializeSnafu};

pub const SITE_CONFIG_FILE: &str = "config.json";
const SCAFFOLDED_CONFIG_FILES: &[&str] = &["hugo.toml", "config.toml"];
const MENU_BUNDLE: &str = "menu";
const MENU_FRONT_MATTER: &str = "---\nheadless: true\n---\n\n";

/// Site-wide settings written into the hugo configuration.
#[derive(Debug, Clone)]
pub struct Site<'a> {
    pub base_url: &'a str,
    pub title: &'a str,
    pub theme: Option<&'a str>,
}

impl Site<'_> {
    fn to_json(&self, has_menu: bool) -> serde_json::Value {
        let mut value = serde_json::json!({
            "baseURL": self.base_url,
            "title": self.title,
            "markup": {
                "goldmark": { "renderer": { "unsafe": true } },
                "asciidocExt": { "workingFolderCurrent": true },
            },
        });
        if let Some(theme) = self.theme {
            value["theme"] = theme.into();
        }
        if has_menu {
            value["params"] = serde_json::json!({ "BookMenuBundle": format!("/{MENU_BUNDLE}") });
        }
        value
    }

    /// Write the hugo configuration to the site root, replacing whatever
    /// `hugo new site` scaffolded.
    pub fn write_config(&self, site_dir: &Path, has_menu: bool) -> Result<()> {
        std::fs::create_dir_all(site_dir).context(IoSnafu {
            message: "Failed to create site directory",
            path: site_dir,
        })?;

        for name in SCAFFOLDED_CONFIG_FILES {
            let path = site_dir.join(name);
            if path.exists() {
                std::fs::remove_file(&path).context(IoSnafu {
                    message: "Failed to remove scaffolded config",
                    path: &path,
                })?;
            }
        }

        let content = serde_json::to_string_pretty(&self.to_json(has_menu)).context(
            SerializeSnafu {
                message: "Failed to serialize site config",
            },
        )?;
        let path = site_dir.join(SITE_CONFIG_FILE);
        std::fs::write(&path, content).context(IoSnafu {
            message: "Failed to write site config",
            path: &path,
        })?;

        tracing::debug!(path = %path.display(), "Site config written");
        Ok(())
    }
}

/// Copy the menu file into a headless bundle of the content dir.
/// Returns false when there is no menu file.
pub fn write_menu(menu_file: &Path, content_dir: &Path) -> Result<bool> {
    if !menu_file.is_file() {
        tracing::warn!(path = %menu_file.display(), "Menu file not found, site has no menu");
        return Ok(false);
    }

    let menu = std::fs::read_to_string(menu_file).context(IoSnafu {
        message: "Failed to read menu file",
        path: menu_file,
    })?;

    let bundle = content_dir.join(MENU_BUNDLE);
    std::fs::create_dir_all(&bundle).context(IoSnafu {
        message: "Failed to create menu bundle",
        path: &bundle,
    })?;

    let target = bundle.join("index.md");
    std::fs::write(&target, format!("{MENU_FRONT_MATTER}{menu}")).context(IoSnafu {
        message: "Failed to write menu",
        path: &target,
    })?;

    tracing::info!("{} -> {}", menu_file.display(), target.display());
    Ok(true)
}
