use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    let upload_limit = state.upload_limit;
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/today", get(handlers::get_today))
        .route(
            "/api/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/entries", get(handlers::list_entries))
        .route(
            "/api/entries/:date",
            get(handlers::get_entry).delete(handlers::delete_entry),
        )
        .route("/photos/:date", get(handlers::get_photo))
        .with_state(state)
}
