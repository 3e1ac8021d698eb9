//! HTTP surface for the recursive executor.

pub mod api;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::RexecConfig;
use crate::generate::OpenAiGenerator;
use crate::pipeline::PipelineRunner;

use api::{AppState, SharedState};

/// Runtime options for the server process.
pub struct ServeOptions {
    pub port: u16,
    /// Bind 0.0.0.0 and allow any origin; for local frontend development.
    pub dev_mode: bool,
}

/// Build the application router.
pub fn build_router(state: SharedState) -> Router {
    api::api_router().with_state(state)
}

/// Start the HTTP server and block until shutdown.
pub async fn start_server(config: RexecConfig, options: ServeOptions) -> Result<()> {
    let generator = OpenAiGenerator::from_env(config.generation.clone())
        .context("Cannot start server without a provider API key")?;
    let pipeline = PipelineRunner::new(
        Arc::new(generator),
        config.pipeline.clone(),
        config.sandbox.clone(),
    );
    let state = Arc::new(AppState { pipeline });

    let mut app = build_router(state);
    if options.dev_mode {
        app = app.layer(CorsLayer::permissive());
    }

    let host = if options.dev_mode { "0.0.0.0" } else { "127.0.0.1" };
    let addr = format!("{}:{}", host, options.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "rexec listening");
    println!("rexec running at http://{}", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    println!("Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    println!("\nShutting down...");
}
