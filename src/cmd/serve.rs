use anyhow::Result;
use tracing_subscriber::EnvFilter;

use rexec::config::RexecConfig;
use rexec::server::{ServeOptions, start_server};

/// Start the HTTP server.
pub async fn cmd_serve(port: Option<u16>, dev_mode: bool, verbose: bool) -> Result<()> {
    let default_filter = if verbose { "rexec=debug" } else { "rexec=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let config = RexecConfig::load(&std::env::current_dir()?)?;
    let port = port.unwrap_or(config.server.port);

    start_server(config, ServeOptions { port, dev_mode }).await
}
