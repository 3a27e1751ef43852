use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocr_api::api::{create_router, AppState};
use ocr_api::config::Config;
use ocr_api::ocr::TesseractFactory;

#[derive(Parser)]
#[command(name = "ocr-api")]
#[command(about = "Multi-language OCR over HTTP")]
struct Args {
    /// Address to bind (overrides OCR_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Skip loading the default language model at startup
    #[arg(long)]
    no_preload: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ocr_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.no_preload {
        config.ocr.preload = false;
    }

    tracing::info!(
        "Initializing OCR service (default language: {}, fallback: {})...",
        config.ocr.default_language,
        config.ocr.fallback_to_default
    );
    let state = AppState::new(config.clone(), Arc::new(TesseractFactory))?;

    if config.ocr.preload {
        state.ocr.preload().await.map_err(|e| {
            anyhow::anyhow!(
                "Failed to load model for default language '{}': {e}",
                config.ocr.default_language
            )
        })?;
        tracing::info!("Default model loaded");
    } else {
        tracing::info!("Preload disabled - models load on first request");
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("OCR API starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  Languages:    http://{}/languages", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
