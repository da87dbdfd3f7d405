use crate::handlers::{build_agent_handler, contact_handler, health_check};
use axum::{Router, routing::get, routing::post};

/// Creates and configures all application routes
pub fn create_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/agent-builder", post(build_agent_handler))
        .route("/api/contact", post(contact_handler))
}
