//! Axum HTTP API for the Arthur AI generation backend.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;

// Re-exported for the server binary
pub use arthur_tracker::Reconciler;
