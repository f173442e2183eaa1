use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use axum_prometheus::PrometheusMetricLayer;

use crate::api;
use crate::session::DashboardSession;

async fn root() -> &'static str {
    "Plan Governance API"
}

/// Full application: health text, Prometheus scrape endpoint and the
/// governance API bound to `session`. Installs the global metrics recorder,
/// so build it once per process.
pub fn app(session: Arc<DashboardSession>) -> Router {
    let (prometheus_layer, metrics_handle) = PrometheusMetricLayer::pair();
    Router::new()
        .route("/", get(root))
        .route(
            "/metrics",
            get(move || async move { metrics_handle.render() }),
        )
        .merge(api_routes())
        .layer(prometheus_layer)
        .layer(Extension(session))
}

pub fn api_routes() -> Router {
    Router::new()
        .route("/api/plans/:tier", get(api::get_plan))
        .route("/api/usage/check", post(api::check_usage))
        .route("/api/dashboard", get(api::get_dashboard))
        .route("/api/dashboard/refresh", post(api::refresh_dashboard))
        .route(
            "/api/dashboard/credits/refresh",
            post(api::refresh_credits),
        )
        .route("/api/dashboard/plan", put(api::change_plan))
        .route("/api/requests", post(api::submit_request))
        .route("/api/invoices", get(api::list_invoices))
        .route(
            "/api/invoices/:id/download",
            get(api::download_invoice),
        )
}
