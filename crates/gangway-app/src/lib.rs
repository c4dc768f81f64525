mod navigator;
pub mod platform;
pub mod router;

pub use navigator::EXIT_PATH;

use anyhow::{Context, Result};
use gangway_core::config::{GangwayConfig, load_config_or_default, resolve_config_path};
use gangway_core::progress::Progress;

pub struct App {
    config: GangwayConfig,
    progress: Progress,
}

impl App {
    pub fn new(config: GangwayConfig, progress: Progress) -> Self {
        Self { config, progress }
    }

    /// Loads the user config (defaults when absent) and opens the
    /// persisted progress store. Only a present-but-invalid config file
    /// is an error; everything else degrades.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path().context("failed to resolve config path")?;
        let config = load_config_or_default(&config_path).map_err(|error| {
            anyhow::anyhow!(
                "invalid config at {}: {error}\nFix the config and retry, or delete it to use defaults.",
                config_path.display()
            )
        })?;

        Ok(Self::new(config, Progress::open_default()))
    }

    pub fn config(&self) -> &GangwayConfig {
        &self.config
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut Progress {
        &mut self.progress
    }
}
