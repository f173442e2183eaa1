use once_cell::sync::Lazy;

use crate::entitlements::PlanTier;

/// Address the HTTP server should bind to. Defaults to `0.0.0.0`.
pub static BIND_ADDRESS: Lazy<String> =
    Lazy::new(|| std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string()));

/// Port the HTTP server should listen on. Defaults to `3000`.
pub static BIND_PORT: Lazy<u16> = Lazy::new(|| {
    std::env::var("BIND_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3000)
});

/// Base URL of the external dashboard API (credits, activity, changelog,
/// invoices, requests).
pub static DASHBOARD_API_BASE_URL: Lazy<String> = Lazy::new(|| {
    read_optional_env("DASHBOARD_API_BASE_URL")
        .unwrap_or_else(|| "http://127.0.0.1:8080/api".to_string())
});

/// Optional bearer token presented to the dashboard API.
pub static DASHBOARD_API_TOKEN: Lazy<Option<String>> =
    Lazy::new(|| read_optional_env("DASHBOARD_API_TOKEN"));

/// Payer name printed on rendered invoices.
pub static DASHBOARD_ACCOUNT_NAME: Lazy<String> = Lazy::new(|| {
    read_optional_env("DASHBOARD_ACCOUNT_NAME").unwrap_or_else(|| "Account holder".to_string())
});

/// Payer email printed on rendered invoices.
pub static DASHBOARD_ACCOUNT_EMAIL: Lazy<String> =
    Lazy::new(|| read_optional_env("DASHBOARD_ACCOUNT_EMAIL").unwrap_or_default());

/// key: session-config -> starting plan tier
///
/// An unrecognized value is a startup error, not a silent fallback to free.
pub static DASHBOARD_PLAN_TIER: Lazy<PlanTier> = Lazy::new(|| {
    match read_optional_env("DASHBOARD_PLAN_TIER") {
        Some(raw) => raw
            .parse()
            .unwrap_or_else(|err| panic!("unsupported DASHBOARD_PLAN_TIER: {err}")),
        None => PlanTier::Free,
    }
});

/// Whether the 24x7 support add-on is active. Defaults to `false`.
pub static DASHBOARD_24X7_ADDON: Lazy<bool> = Lazy::new(|| read_flag("DASHBOARD_24X7_ADDON"));

/// Number of activity entries requested per load. Defaults to `5`.
pub static ACTIVITY_FEED_LIMIT: Lazy<usize> =
    Lazy::new(|| read_positive("ACTIVITY_FEED_LIMIT").unwrap_or(5));

/// Number of changelog entries requested per load. Defaults to `3`.
pub static CHANGELOG_FEED_LIMIT: Lazy<usize> =
    Lazy::new(|| read_positive("CHANGELOG_FEED_LIMIT").unwrap_or(3));

/// key: cooldown-config -> clock tick cadence
pub static COOLDOWN_TICK_INTERVAL_MS: Lazy<u64> = Lazy::new(|| {
    std::env::var("COOLDOWN_TICK_INTERVAL_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(1000)
});

fn read_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn read_flag(key: &str) -> bool {
    read_optional_env(key)
        .map(|value| {
            let normalized = value.to_ascii_lowercase();
            matches!(normalized.as_str(), "1" | "true" | "yes")
        })
        .unwrap_or(false)
}

fn read_positive(key: &str) -> Option<usize> {
    read_optional_env(key)
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
}
