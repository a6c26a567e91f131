use crate::handlers;
use crate::state::AppState;
use axum::{routing::{delete, get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/habits", post(handlers::form_add_habit))
        .route("/habits/:kind/:id/toggle", post(handlers::form_toggle_habit))
        .route("/habits/:kind/:id/undo", post(handlers::form_undo_habit))
        .route("/habits/:kind/:id/delete", post(handlers::form_delete_habit))
        .route("/settings/:name", post(handlers::form_toggle_setting))
        .route("/recommendations/refresh", post(handlers::form_refresh_recommendations))
        .route("/recommendations/close", post(handlers::form_close_recommendations))
        .route("/recommendations/:id", post(handlers::form_open_recommendations))
        .route("/api/habits", get(handlers::get_habits).post(handlers::create_habit))
        .route("/api/habits/:kind/:id", delete(handlers::delete_habit))
        .route("/api/habits/:kind/:id/toggle", post(handlers::toggle_habit))
        .route("/api/habits/:kind/:id/undo", post(handlers::undo_habit))
        .route("/api/settings", get(handlers::get_settings).post(handlers::update_settings))
        .route("/api/generate", post(handlers::generate))
        .route(
            "/api/recommendations",
            get(handlers::get_recommendations).delete(handlers::close_recommendations),
        )
        .route("/api/recommendations/refresh", post(handlers::refresh_recommendations))
        .route("/api/recommendations/:id", post(handlers::open_recommendations))
        .with_state(state)
}
