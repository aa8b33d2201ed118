mod config;
mod derive;
mod digest;
mod error;
mod model;
mod pipeline;
mod server;
mod validate;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use pipeline::{Pipeline, Stores};
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting survey-intake server");

    // 1. Load config from environment
    let config = Config::from_env()?;
    info!(
        data_dir = %config.data_dir.display(),
        listen_addr = %config.listen_addr,
        digest = %config.digest_path().display(),
        "configuration loaded"
    );

    // 2. Open the stores and make sure every file exists before the first request
    let stores = Stores::from_config(&config);
    stores.ensure()?;
    let pipeline = Arc::new(Pipeline::new(stores));
    let existing = pipeline.stores().responses.len()?;
    info!(responses = existing, "stores ready");

    // 3. Render the digest once so it reflects testimonials already on disk
    let testimonials = pipeline.rebuild_digest()?;
    info!(testimonials, "quote digest rendered");

    // 4. Serve HTTP
    let app = server::router(AppState::new(pipeline));
    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %config.listen_addr, "survey-intake ready, serving on TCP");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        })?;

    info!("survey-intake shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
