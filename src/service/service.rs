use std::path::PathBuf;

use snafu::ResultExt;

use crate::common::{IoSnafu, Result};
use crate::hugo::{self, Hugo, Site};
use crate::origin::{Checkout, Fetcher, GitFetcher};
use crate::{Config, Settings, COMPOSE_DIR};

const CHECKOUTS_DIR: &str = "checkouts";
const SHIM_DIR: &str = "bin";

/// One documentation build: compose all origins into a hugo site and let
/// hugo render it.
pub struct Monako {
    config: Config,
    menu_file: PathBuf,
    fetcher: Box<dyn Fetcher>,
    hugo: Hugo,
}

impl Monako {
    /// Hugo always runs inside the target dir of the configuration.
    pub fn new(config: Config, menu_file: PathBuf, fetcher: Box<dyn Fetcher>, hugo: Hugo) -> Self {
        let hugo = hugo.in_dir(config.target_dir());
        Self {
            config,
            menu_file,
            fetcher,
            hugo,
        }
    }

    /// Load the configuration named in the settings and prepare the hugo
    /// invocation, including the asciidoctor shim.
    pub fn init(settings: &Settings) -> Result<Self> {
        let config = settings.load_config()?;

        let mut hugo = Hugo::new(config.hugo.binary.clone()).fail_on_error(settings.fail_on_error);
        if let Some(dir) = hugo::shim::install(
            &config.base_url,
            &config.compose_dir(),
            &config.scratch_dir().join(SHIM_DIR),
        )? {
            hugo = hugo.with_path_prefix(dir);
        }

        Ok(Self::new(
            config,
            settings.menu_file.clone(),
            Box::new(GitFetcher::default()),
            hugo,
        ))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Clone every origin in turn and copy its whitelisted files into the
    /// content dir. Returns the number of files composed.
    pub fn compose(&self) -> Result<usize> {
        let content_dir = self.config.content_dir();
        let checkouts = self.config.scratch_dir().join(CHECKOUTS_DIR);
        let mut total = 0;

        for origin in self.config.origins()? {
            let checkout = Checkout::create(self.fetcher.as_ref(), &origin, &checkouts)?;
            total += checkout.compose(&content_dir)?;
        }

        tracing::info!(
            origins = self.config.origins.len(),
            files = total,
            "Composition completed"
        );
        Ok(total)
    }

    fn write_site(&self) -> Result<()> {
        let has_menu = hugo::write_menu(&self.menu_file, &self.config.content_dir())?;
        Site {
            base_url: &self.config.base_url,
            title: &self.config.title,
            theme: self.config.theme.as_deref(),
        }
        .write_config(&self.config.compose_dir(), has_menu)
    }

    /// Full run: clean up, scaffold, compose, build.
    pub fn run(&self) -> Result<()> {
        let target_dir = self.config.target_dir();
        std::fs::create_dir_all(target_dir).context(IoSnafu {
            message: "Failed to create target directory",
            path: target_dir,
        })?;

        self.config.clean_up()?;
        self.hugo.run_step(&["--quiet", "new", "site", COMPOSE_DIR])?;
        self.write_site()?;
        self.compose()?;
        self.hugo.run_step(&["--source", COMPOSE_DIR])?;

        tracing::info!(site = %self.config.compose_dir().display(), "Site generated");
        Ok(())
    }
}
