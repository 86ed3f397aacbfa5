//! Router wiring and shared handler state.
use crate::api;
use crate::service::RosterService;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RosterService>,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
        tracing::info_span!(
            "http.request",
            method = %request.method(),
            uri = %request.uri(),
            version = ?request.version()
        )
    });

    Router::new()
        .route("/health", get(api::system::health))
        .route(
            "/escala",
            get(api::escala::get_schedule)
                .post(api::escala::save_schedule)
                .delete(api::escala::delete_schedule),
        )
        .route("/escala/calendar", get(api::escala::get_calendar))
        .route("/escala/toggle", post(api::escala::toggle_day))
        .route("/logs", get(api::logs::get_logs).post(api::logs::save_logs))
        .route("/login", post(api::accounts::login))
        .route("/change-password", post(api::accounts::change_password))
        .route("/seed-users", post(api::accounts::seed_users))
        .route(
            "/users",
            get(api::accounts::list_users).post(api::accounts::create_user),
        )
        .layer(trace_layer)
        .with_state(state)
}
