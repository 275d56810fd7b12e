use anyhow::{Context, Result};
use clap::Parser;
use speech_coach::{create_router, AppState, Config};
use tracing::info;

#[derive(Parser)]
#[command(name = "speech-coach", about = "Speech practice feedback relay service")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config/speech-coach")]
    config: String,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Credential and config problems are fatal here, before serving.
    let cfg = Config::load(&cli.config)?;

    let port = cli.port.unwrap_or(cfg.service.http.port);
    let addr = format!("{}:{}", cfg.service.http.bind, port);

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Upstream base URL: {}", cfg.openai.base_url);
    info!("HTTP server binding to {}", addr);

    let state = AppState::from_config(&cfg)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app).await.context("HTTP server error")?;

    Ok(())
}
