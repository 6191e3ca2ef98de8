use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use delights::config::Config;
use delights::recorder::Recorder;
use delights::recorder::sheet::CsvSheet;
use delights::recorder::slack::{Notifier, SlackNotifier};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!("Starting Delights intake");

    let recorder = match &config.recorder {
        Some(recorder_config) => {
            let sheet = CsvSheet::open(&recorder_config.sheet_path).await?;
            tracing::info!("Recorder enabled, writing to {}", sheet.path().display());

            let notifier: Option<Arc<dyn Notifier>> = match &recorder_config.slack_webhook_url {
                Some(url) => Some(Arc::new(SlackNotifier::new(url.clone())?)),
                None => {
                    tracing::info!("DELIGHTS_SLACK_WEBHOOK_URL not set; recorder will not notify");
                    None
                }
            };

            Some(Recorder::new(Arc::new(sheet), notifier))
        }
        None => None,
    };

    let addr = SocketAddr::new(config.host, config.port);
    let app = delights::build_app(config, recorder)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
