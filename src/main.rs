mod config;
mod handlers;
mod models;
mod server;
mod services;

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use handlers::{AnalysisHandler, AnalysisSettings};
use server::create_router;
use services::{InferenceService, OpenAiClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before the logger reads RUST_LOG
    dotenv().ok();

    // Initialize logger
    env_logger::init();

    log::info!("🚀 Starting Nutrition Lens...");

    let config = Config::from_env();

    // One client for the whole process, shared read-only by every request
    let inference: Arc<dyn InferenceService> = Arc::new(OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    ));
    log::info!(
        "✅ Inference client initialized with model: {} (max {} tokens, JPEG quality {})",
        config.openai_model,
        config.max_completion_tokens,
        config.jpeg_quality
    );

    let analysis_handler = Arc::new(AnalysisHandler::new(
        inference,
        AnalysisSettings::from(&config),
    ));
    let app = create_router(analysis_handler, config.max_upload_bytes);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    log::info!("🌐 Listening on http://{}", addr);
    log::info!("🎉 Ready: POST a photo to /analyze");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("🛑 Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("❌ Failed to listen for Ctrl+C: {}", e);
        // Without a signal handler, keep serving until the process is killed
        std::future::pending::<()>().await;
    }
    log::info!("🛑 Shutting down...");
}
