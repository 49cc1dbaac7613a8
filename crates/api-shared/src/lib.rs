//! # API Shared
//!
//! Shared definitions for the PHQ-9 HTTP surfaces.
//!
//! Contains:
//! - JSON request/response types with OpenAPI schemas (`types` module)
//! - Shared services like `HealthService` and `ScoreService`
//!
//! Used by `api-rest` for its JSON endpoints and by the CLI for offline scoring.

pub mod health;
pub mod score;
pub mod types;

pub use health::HealthService;
pub use score::ScoreService;
pub use types::*;
