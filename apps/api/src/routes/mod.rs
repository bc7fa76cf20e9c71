pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::selection::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/config", get(handlers::handle_get_config))
        .route("/api/v1/scores", post(handlers::handle_score))
        .route("/api/v1/selections", post(handlers::handle_select))
        .with_state(state)
}
