//! Standalone web host binary.
//!
//! ## Purpose
//! Runs the PHQ-9 web host on its own, without loading a `.env` file.
//!
//! ## Intended use
//! Useful in containers where configuration arrives purely through the environment. The
//! workspace's main `phq9-run` binary also loads `.env` before serving the same router.

use api_rest::{config_from_env, router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the PHQ-9 web host.
///
/// # Environment Variables
/// - `SMART_CLIENT_ID`, `SMART_REDIRECT_URI`: required SMART client registration
/// - `SMART_ISS`, `SMART_CLIENT_SECRET`, `SMART_SCOPES`: optional
/// - `PHQ9_ADDR`: server address (default: "0.0.0.0:3000")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the SMART configuration is missing or invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("phq9_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (config, addr) = config_from_env()?;

    tracing::info!("-- Starting PHQ-9 web host on {}", addr);

    let app = router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
