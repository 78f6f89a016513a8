// src/metrics.rs
//! Prometheus exporter for the matching counters and the top-score gauge.

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already installed.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!("motor_candidates_scored_total", "Catalog items scored");
        describe_counter!("motor_candidates_failed_total", "Catalog items that could not be scored");
        describe_counter!("requirement_conflicts_total", "Field conflicts seen during consolidation");
        describe_counter!(
            "requirement_missing_fields_total",
            "Requirement fields no draft supplied"
        );
        describe_gauge!("motor_last_top_score", "Total score of the last top-ranked candidate");

        Ok(Self { handle })
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
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
