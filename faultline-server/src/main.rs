use anyhow::Context;
use tracing::{error, info};

use faultline_server::app_module::AppModule;
use faultline_server::bind_listener;
use faultline_server::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    if let Err(err) = faultline_core::logging::init_tracing(None) {
        eprintln!("failed to initialise tracing: {}", err.detailed_message());
    }

    let config = ServerConfig::from_env().context("failed to load server configuration")?;
    let app = AppModule::new(&config).context("failed to build application module")?;
    let (listener, actual_addr) = bind_listener(&config).await?;
    info!(
        %actual_addr,
        service = %config.core().service_name,
        environment = config.core().environment.as_str(),
        "starting faultline-server"
    );

    if let Err(err) = axum::serve(listener, app.router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(?err, "server terminated with error");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sigterm) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
