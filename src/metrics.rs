use axum::{routing::get, Router};
use metrics::{describe_counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::cache::DEFAULT_TTL;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder and describe the series emitted
    /// across the fetch/cache/summary paths.
    pub fn init() -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");

        describe_counter!(
            "summary_requests_total",
            "Summary requests served, labelled by source."
        );
        describe_counter!(
            "summary_degraded_total",
            "Summaries degraded to a default after an upstream failure."
        );
        describe_counter!(
            "fetch_errors_total",
            "Upstream transport/decode failures, labelled by service."
        );
        describe_counter!("cache_hits_total", "Freshness cache hits.");
        describe_counter!("cache_misses_total", "Freshness cache misses.");

        gauge!("weather_cache_ttl_seconds").set(DEFAULT_TTL.as_secs_f64());

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
