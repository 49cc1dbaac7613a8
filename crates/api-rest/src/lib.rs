//! # API REST
//!
//! The PHQ-9 web host.
//!
//! Handles:
//! - the SMART launch entry point and authorization callback
//! - the server-rendered questionnaire page and its form posts
//! - the JSON API with OpenAPI/Swagger documentation
//! - REST-specific concerns (HTML rendering, CORS)
//!
//! Uses `phq9-core` for all launch, session and submission logic and `api-shared` for the JSON
//! types.

#![warn(rust_2018_idioms)]

pub mod handlers;
pub mod state;
pub mod views;

use axum::{
    routing::{get, post},
    Router,
};
use phq9_core::constants::{env, DEFAULT_LISTEN_ADDR};
use phq9_core::AppConfig;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::score, handlers::history),
    components(schemas(
        api_shared::HealthRes,
        api_shared::ScoreReq,
        api_shared::ScoreRes,
        api_shared::HistoryEntry,
        api_shared::HistoryRes,
        api_shared::ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Build the complete web host router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/launch", get(handlers::launch))
        .route("/callback", get(handlers::callback))
        .route("/session/:id", get(handlers::session_page))
        .route("/session/:id/answer", post(handlers::set_answer))
        .route("/session/:id/submit", post(handlers::submit_answers))
        .route("/session/:id/history", get(handlers::history))
        .route("/api/score", post(handlers::score))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Read the SMART client configuration and listen address from the process environment.
///
/// Only binaries call this, once, at startup.
///
/// # Errors
///
/// Returns an error if the configuration is incomplete or invalid.
pub fn config_from_env() -> anyhow::Result<(AppConfig, String)> {
    let config = AppConfig::new(
        std::env::var(env::ISSUER).ok(),
        std::env::var(env::CLIENT_ID).ok(),
        std::env::var(env::CLIENT_SECRET).ok(),
        std::env::var(env::SCOPES).ok(),
        std::env::var(env::REDIRECT_URI).ok(),
    )?;
    let addr = std::env::var(env::LISTEN_ADDR).unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.into());
    Ok((config, addr))
}
