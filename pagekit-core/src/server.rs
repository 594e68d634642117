//! Dev server seam: the reload signal and the controller lifecycle.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::config::Config;
use crate::error::Result;

/// What changed, as far as connected browsers are concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadScope {
    /// Refresh the whole page.
    Page,
    /// Freshly written assets, as URL paths. Stylesheets can be swapped in
    /// place; anything else falls back to a page refresh.
    Assets(Vec<String>),
}

/// Receiver of reload notifications.
///
/// Implementations must not block: callers never wait for delivery.
pub trait Reloader: Send + Sync {
    fn reload(&self, scope: ReloadScope);
}

/// Reloader used outside development mode.
pub struct NoReload;

impl Reloader for NoReload {
    fn reload(&self, _scope: ReloadScope) {}
}

/// Options handed to [`DevServer::init`].
#[derive(Debug, Clone, PartialEq)]
pub struct ServerOptions {
    /// Directories searched in order; the first hit wins.
    pub static_roots: Vec<PathBuf>,
    /// Request prefix to directory overrides, consulted before the roots.
    pub routes: IndexMap<String, PathBuf>,
    pub port: u16,
    pub open: bool,
    pub notify: bool,
}

impl ServerOptions {
    /// Serves `temp`, `dist` and `public` in that order, plus the configured routes.
    pub fn from_config(config: &Config, root: &Path) -> Self {
        let build = &config.build;
        Self {
            static_roots: vec![
                root.join(&build.temp),
                root.join(&build.dist),
                root.join(&build.public),
            ],
            routes: config
                .server
                .routes
                .iter()
                .map(|(prefix, dir)| (prefix.clone(), root.join(dir)))
                .collect(),
            port: config.server.port,
            open: config.server.open,
            notify: config.server.notify,
        }
    }
}

/// A static file server with live reload.
#[async_trait]
pub trait DevServer: Reloader {
    /// Starts serving and returns the bound address.
    async fn init(&self, options: ServerOptions) -> Result<SocketAddr>;

    /// Stops serving. A no-op when the server never started.
    async fn shutdown(&self);
}
