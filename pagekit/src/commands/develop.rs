use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use pagekit_core::{invoke, DevServer, TaskRegistry};
use pagekit_server::LiveServer;
use tokio::signal;
use tracing::{info, warn};

use crate::formatting::{print_command_header, print_error, print_key_value, print_success};

use super::{build_context, load_project};

/// `develop`: compile into temp, then serve with live reload until interrupted.
pub async fn cmd_develop(cwd: &Path, port: Option<u16>, no_open: bool) -> Result<()> {
    let (root, mut config) = load_project(cwd)?;
    if let Some(port) = port {
        config.server.port = port;
    }
    if no_open {
        config.server.open = false;
    }
    print_command_header("develop", &root);

    let server = Arc::new(LiveServer::new());
    let registry = TaskRegistry::new(&config);
    let ctx = Arc::new(build_context(root, config).with_reloader(server.clone()));
    let develop = registry.develop(server.clone())?;

    if let Err(e) = invoke(develop.as_ref(), &ctx).await {
        server.shutdown().await;
        print_error(&format!("develop failed: {}", e));
        std::process::exit(1);
    }

    if let Some(addr) = server.local_addr() {
        println!();
        print_key_value("Local", &format!("http://localhost:{}", addr.port()));
        println!("  Press Ctrl+C to stop");
        println!();
    }

    shutdown_signal().await;
    server.shutdown().await;
    print_success("Stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
