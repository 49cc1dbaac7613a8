use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, config_from_env, router};
use api_shared::HealthService;

/// Main entry point for the PHQ-9 application
///
/// Loads `.env` if present, validates the SMART client configuration and serves the web host:
/// the SMART launch endpoints, the questionnaire pages and the JSON API with Swagger UI.
///
/// # Environment Variables
/// - `SMART_CLIENT_ID`: client id registered with the authorization server (required)
/// - `SMART_REDIRECT_URI`: absolute URL of this app's `/callback` (required)
/// - `SMART_ISS`: FHIR base URL for standalone launches (optional)
/// - `SMART_CLIENT_SECRET`: secret for confidential clients (optional)
/// - `SMART_SCOPES`: requested scopes (default: "launch openid fhirUser patient/*.read patient/*.write")
/// - `PHQ9_ADDR`: server address (default: "0.0.0.0:3000")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("phq9_run=info".parse()?)
                .add_directive("phq9_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (config, addr) = config_from_env()?;

    tracing::info!("++ Starting PHQ-9 on {}", addr);
    tracing::info!("-- {}", HealthService::check_health().message);

    let app = router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
