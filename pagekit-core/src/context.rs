//! Shared state threaded through every task invocation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::server::{NoReload, Reloader};
use crate::stage::StageFactory;

/// Everything a task needs: the resolved config, where the project lives,
/// how to build stages and where to send reload notifications.
pub struct BuildContext {
    config: Arc<Config>,
    root: PathBuf,
    stages: Arc<dyn StageFactory>,
    reloader: Arc<dyn Reloader>,
}

impl BuildContext {
    pub fn new(
        config: Config,
        root: impl Into<PathBuf>,
        stages: Arc<dyn StageFactory>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            root: root.into(),
            stages,
            reloader: Arc::new(NoReload),
        }
    }

    pub fn with_reloader(mut self, reloader: Arc<dyn Reloader>) -> Self {
        self.reloader = reloader;
        self
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A handle on the config that can move onto another thread.
    #[inline]
    pub fn shared_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn stages(&self) -> &dyn StageFactory {
        self.stages.as_ref()
    }

    #[inline]
    pub fn reloader(&self) -> &dyn Reloader {
        self.reloader.as_ref()
    }

    /// Resolves a configured path against the project root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}
