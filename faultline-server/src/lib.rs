pub mod app_module;
pub mod config;
pub mod error_response;
pub mod health;

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::info;

use app_module::AppModule;
use config::ServerConfig;

/// Handle returned when the server is started programmatically.
pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
}

impl ServerHandle {
    pub fn shutdown(self) {
        let _ = self.shutdown.send(());
    }
}

/// Binds the configured address and reports the port actually taken.
pub async fn bind_listener(config: &ServerConfig) -> anyhow::Result<(TcpListener, SocketAddr)> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .context("invalid server bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind server listener")?;
    let actual_addr = listener
        .local_addr()
        .context("failed to read socket address")?;
    Ok((listener, actual_addr))
}

pub async fn start_server(config: ServerConfig) -> anyhow::Result<ServerHandle> {
    let app = AppModule::new(&config).context("failed to build application module")?;
    let (listener, actual_addr) = bind_listener(&config).await?;
    info!(%actual_addr, "starting faultline-server");

    let (tx, rx) = oneshot::channel();
    let router = app.router;

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await
            .ok();
    });

    Ok(ServerHandle {
        addr: actual_addr,
        shutdown: tx,
    })
}
