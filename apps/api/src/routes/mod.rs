pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::lp::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Catalogs
        .route("/api/v1/lp/section-types", get(handlers::handle_section_types))
        .route("/api/v1/lp/templates", get(handlers::handle_templates))
        // Documents
        .route(
            "/api/v1/lp/:company_id/:job_id",
            get(handlers::handle_get_document).put(handlers::handle_put_document),
        )
        .route(
            "/api/v1/lp/:company_id/:job_id/operations",
            post(handlers::handle_operations),
        )
        .with_state(state)
}
