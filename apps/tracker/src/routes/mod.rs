pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::notify::handlers as notifications;
use crate::state::AppState;
use crate::tracking::handlers as tracking;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Notification admin
        .route(
            "/api/v1/notifications/config",
            get(notifications::handle_get_config).post(notifications::handle_update_config),
        )
        .route(
            "/api/v1/notifications/history",
            get(notifications::handle_history),
        )
        .route(
            "/api/v1/notifications/test",
            post(notifications::handle_send_test),
        )
        // Tracking
        .route("/api/v1/tracker/run", post(tracking::handle_run_tick))
        .route("/api/v1/retention/run", post(tracking::handle_run_sweep))
        .route(
            "/api/v1/flights/:id/history",
            get(tracking::handle_flight_history),
        )
        .with_state(state)
}
