use std::path::{Path, PathBuf};

use snafu::ResultExt;

use crate::common::{ConfigSnafu, LoadSnafu, Result, UrlSnafu, DEFAULT_WHITELIST};
use crate::origin::Origin;

pub const ENV_PREFIX: &str = "MONAKO";
pub const COMPOSE_DIR: &str = "compose";
pub const CONTENT_DIR: &str = "content";
pub const SCRATCH_DIR: &str = ".monako";

fn default_title() -> String {
    "Monako".to_string()
}

fn default_target_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    #[serde(rename = "baseURL", alias = "baseurl", alias = "base_url")]
    pub base_url: String,

    #[serde(default = "default_title")]
    pub title: String,

    /// Default whitelist for origins without their own.
    pub whitelist: Option<Vec<String>>,

    pub theme: Option<String>,

    #[serde(default)]
    pub hugo: crate::hugo::Config,

    #[serde(default)]
    pub origins: Vec<crate::origin::Config>,

    #[serde(skip, default = "default_target_dir")]
    target_dir: PathBuf,
}

/// Everything the command line can change about a run.
#[derive(Clone, Debug, Default)]
pub struct Settings {
    pub config_file: PathBuf,
    pub menu_file: PathBuf,
    pub target_dir: PathBuf,
    pub base_url: Option<String>,
    pub hugo_binary: Option<String>,
    pub fail_on_error: bool,
}

impl Config {
    /// Read and validate the YAML file at `path`, including `MONAKO__*`
    /// environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::read(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Read the YAML file at `path`, then apply `MONAKO__*` environment
    /// overrides. Nothing is validated yet.
    fn read(path: &Path) -> Result<Self> {
        let config: Config = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Yaml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .context(LoadSnafu { path })?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url).context(UrlSnafu {
            url: self.base_url.as_str(),
        })?;
        if self.origins.is_empty() {
            tracing::warn!("No origins configured");
        }
        self.origins()?;
        Ok(())
    }

    /// Apply command line overrides. An empty base URL keeps the configured one.
    pub fn apply(&mut self, settings: &Settings) {
        if let Some(base_url) = settings.base_url.as_deref().filter(|u| !u.is_empty()) {
            self.base_url = base_url.to_string();
        }
        if let Some(binary) = &settings.hugo_binary {
            self.hugo.binary = binary.clone();
        }
        self.set_target_dir(&settings.target_dir);
    }

    pub fn set_target_dir(&mut self, dir: impl Into<PathBuf>) {
        self.target_dir = dir.into();
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Root of the hugo site the origins are composed into.
    pub fn compose_dir(&self) -> PathBuf {
        self.target_dir.join(COMPOSE_DIR)
    }

    pub fn content_dir(&self) -> PathBuf {
        self.compose_dir().join(CONTENT_DIR)
    }

    /// Holds clones and helper binaries, never published.
    pub fn scratch_dir(&self) -> PathBuf {
        self.target_dir.join(SCRATCH_DIR)
    }

    pub fn default_whitelist(&self) -> Vec<String> {
        match &self.whitelist {
            Some(whitelist) => whitelist.clone(),
            None => DEFAULT_WHITELIST.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn origins(&self) -> Result<Vec<Origin>> {
        let whitelist = self.default_whitelist();
        self.origins
            .iter()
            .cloned()
            .map(|cfg| Origin::from_config(cfg, &whitelist))
            .collect()
    }

    /// Remove the compose dir of a previous run.
    pub fn clean_up(&self) -> Result<()> {
        let dir = self.compose_dir();
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => {
                tracing::debug!(path = %dir.display(), "Removed previous composition");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).context(crate::common::IoSnafu {
                message: "Failed to clean up",
                path: dir,
            }),
        }
    }
}

impl Settings {
    pub fn new(config_file: impl Into<PathBuf>) -> Self {
        Self {
            config_file: config_file.into(),
            menu_file: PathBuf::from("config.menu.md"),
            target_dir: default_target_dir(),
            ..Default::default()
        }
    }

    pub fn load_config(&self) -> Result<Config> {
        if !self.config_file.is_file() {
            return ConfigSnafu {
                message: format!("{} does not exist", self.config_file.display()),
                prefix: "config",
            }
            .fail();
        }
        let mut config = Config::read(&self.config_file)?;
        config.apply(self);
        config.validate()?;
        Ok(config)
    }
}
