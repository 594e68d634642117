//! The dev server controller: lifecycle plus reload fan-out.

use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pagekit_core::{DevServer, Error, ReloadScope, Reloader, Result, ServerOptions};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::browser;
use crate::message::ReloadMessage;
use crate::server::{create_router, AppState};

const EVENT_BUFFER: usize = 64;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

struct Running {
    addr: SocketAddr,
    closing: watch::Sender<bool>,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Static file server that pushes reload messages to connected browsers.
///
/// Reloads sent before [`DevServer::init`] or with no browser connected are
/// dropped.
pub struct LiveServer {
    events: broadcast::Sender<ReloadMessage>,
    running: Mutex<Option<Running>>,
}

impl Default for LiveServer {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveServer {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            events,
            running: Mutex::new(None),
        }
    }

    /// Receives every message sent to browsers from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.events.subscribe()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lock_running().as_ref().map(|r| r.addr)
    }

    fn lock_running(&self) -> std::sync::MutexGuard<'_, Option<Running>> {
        self.running
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_running(&self) -> Option<Running> {
        self.lock_running().take()
    }
}

impl Reloader for LiveServer {
    fn reload(&self, scope: ReloadScope) {
        let message = ReloadMessage::from(scope);
        match self.events.send(message.clone()) {
            Ok(clients) => debug!("Sent {:?} to {} client(s)", message, clients),
            Err(_) => debug!("No browser connected, dropped {:?}", message),
        }
    }
}

#[async_trait]
impl DevServer for LiveServer {
    async fn init(&self, options: ServerOptions) -> Result<SocketAddr> {
        if let Some(addr) = self.local_addr() {
            return Err(Error::Server(format!("already serving at {}", addr)));
        }

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], options.port)))
            .await
            .map_err(|e| Error::Server(format!("cannot bind port {}: {}", options.port, e)))?;
        let addr = listener.local_addr()?;

        let open = options.open;
        let (closing, closing_rx) = watch::channel(false);
        let (stop, stop_rx) = oneshot::channel::<()>();
        let app = create_router(AppState::new(options, self.events.clone(), closing_rx));

        let handle = tokio::spawn(async move {
            let shutdown = async {
                let _ = stop_rx.await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("Dev server stopped unexpectedly: {}", e);
            }
        });

        *self.lock_running() = Some(Running {
            addr,
            closing,
            stop,
            handle,
        });

        if open {
            browser::open(&format!("http://localhost:{}", addr.port()));
        }
        Ok(addr)
    }

    async fn shutdown(&self) {
        let Some(running) = self.take_running() else {
            return;
        };

        let _ = running.closing.send(true);
        let _ = running.stop.send(());
        if tokio::time::timeout(SHUTDOWN_GRACE, running.handle)
            .await
            .is_err()
        {
            warn!("Dev server did not stop within {:?}", SHUTDOWN_GRACE);
        }
        info!("Dev server at {} stopped", running.addr);
    }
}
