use std::process::ExitCode;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use relevo_core::{RelayConfig, RelayService, ReqwestHttpClient};
use relevo_web::{router, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RelayConfig::from_env();
    let http = Arc::new(ReqwestHttpClient::from_config(&config));
    let port = config.port;
    let state = AppState {
        relay: Arc::new(RelayService::new(http, config)),
    };

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "relevo listening");
    axum::serve(listener, router(state)).await?;

    Ok(())
}
