//! The `serve` step of `develop`: start watching, then start the dev server.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::context::BuildContext;
use crate::error::Result;
use crate::server::{DevServer, ServerOptions};
use crate::task::Task;
use crate::watcher::{FileWatcher, WatchBinding};

/// Completes as soon as the server is up. The watch loop keeps running in
/// the background for the life of the runtime.
pub struct Serve {
    server: Arc<dyn DevServer>,
    bindings: Vec<Arc<WatchBinding>>,
}

impl Serve {
    pub fn new(server: Arc<dyn DevServer>, bindings: Vec<Arc<WatchBinding>>) -> Self {
        Self { server, bindings }
    }
}

#[async_trait]
impl Task for Serve {
    fn name(&self) -> &str {
        "serve"
    }

    async fn run(&self, ctx: &Arc<BuildContext>) -> Result<()> {
        let watcher = FileWatcher::new(ctx.root(), self.bindings.clone())?;
        for binding in watcher.bindings() {
            info!("Watching '{}' in {}", binding.name(), binding.base());
        }
        watcher.spawn(Arc::clone(ctx));

        let options = ServerOptions::from_config(ctx.config(), ctx.root());
        let addr = self.server.init(options).await?;
        info!("Serving at http://{}", addr);
        Ok(())
    }
}
