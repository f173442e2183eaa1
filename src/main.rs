use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use plan_governance::invoices::BillingContact;
use plan_governance::session::FeedLimits;
use plan_governance::{config, routes, scheduler, DashboardSession, HttpDashboardApi};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let api = HttpDashboardApi::new(
        config::DASHBOARD_API_BASE_URL.as_str(),
        config::DASHBOARD_API_TOKEN.clone(),
    )?;
    let contact = BillingContact {
        display_name: config::DASHBOARD_ACCOUNT_NAME.clone(),
        email: config::DASHBOARD_ACCOUNT_EMAIL.clone(),
    };
    let session = Arc::new(DashboardSession::with_limits(
        Arc::new(api),
        contact,
        *config::DASHBOARD_PLAN_TIER,
        *config::DASHBOARD_24X7_ADDON,
        FeedLimits {
            activity: *config::ACTIVITY_FEED_LIMIT,
            changelog: *config::CHANGELOG_FEED_LIMIT,
        },
    ));

    // Initial load runs in the background; fallbacks are served until it lands.
    let loader = session.clone();
    tokio::spawn(async move {
        let report = loader.load().await;
        tracing::info!(?report, "initial dashboard load complete");
    });
    scheduler::spawn(
        session.clone(),
        Duration::from_millis(*config::COOLDOWN_TICK_INTERVAL_MS),
    );

    let app = routes::app(session);

    let addr: SocketAddr = format!("{}:{}", config::BIND_ADDRESS.as_str(), *config::BIND_PORT)
        .parse()
        .map_err(|error| Box::new(error) as Box<dyn std::error::Error>)?;
    tracing::info!(%addr, "Listening for incoming connections");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
