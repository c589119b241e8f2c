//! Glance Server — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the three summary sources, shared
//! state, and middleware.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use glance_server::api::{create_router, AppState};
use glance_server::config::AppConfig;
use glance_server::fetch::REQUEST_TIMEOUT;
use glance_server::geocode::MapsGeocoder;
use glance_server::metrics::Metrics;
use glance_server::sources::{FootballSource, TransitSource, WeatherSource};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("glance_server=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the variables come from the
    // process environment.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = AppConfig::load()?;
    let metrics = Metrics::init();

    // One HTTP client with a bounded timeout, shared by every source.
    let http = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    let geocoder = Arc::new(MapsGeocoder::new(&config.keys.maps, http.clone()));

    let state = AppState {
        football: Arc::new(FootballSource::new(
            &config.football,
            &config.keys,
            http.clone(),
        )),
        transit: Arc::new(TransitSource::new(
            &config.transit,
            &config.keys,
            http.clone(),
        )),
        weather: Arc::new(WeatherSource::new(
            &config.weather,
            &config.keys.maps,
            geocoder,
            http,
        )),
        refresh_interval_ms: config.server.refresh_interval_ms,
    };

    let router = create_router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    tracing::info!(addr = %config.server.bind_addr, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}
