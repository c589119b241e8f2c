use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::sources::Source;
use crate::summary::Summary;

#[derive(Clone)]
pub struct AppState {
    pub football: Arc<dyn Source>,
    pub transit: Arc<dyn Source>,
    pub weather: Arc<dyn Source>,
    pub refresh_interval_ms: u64,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(|| async { "OK" }))
        .route("/football", get(football_summary))
        .route("/transit", get(transit_summary))
        .route("/weather", get(weather_summary))
        .route("/next", get(next_refresh))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn index() -> &'static str {
    "Glance Server Running"
}

async fn football_summary(State(state): State<AppState>) -> Json<Summary> {
    Json(state.football.summary().await)
}

async fn transit_summary(State(state): State<AppState>) -> Json<Summary> {
    Json(state.transit.summary().await)
}

async fn weather_summary(State(state): State<AppState>) -> Json<Summary> {
    Json(state.weather.summary().await)
}

/// Milliseconds until the display should ask again, as plain text.
async fn next_refresh(State(state): State<AppState>) -> String {
    state.refresh_interval_ms.to_string()
}
