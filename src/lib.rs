pub mod api;
pub mod client;
pub mod config;
pub mod cooldown;
pub mod credits;
pub mod entitlements;
pub mod error;
pub mod feed;
pub mod invoices;
pub mod requests;
pub mod routes;
pub mod scheduler;
pub mod session;
pub mod usage;

pub use client::{DashboardApi, HttpDashboardApi};
pub use entitlements::{resolve_features, PlanFeatures, PlanTier, RequestLimit};
pub use session::DashboardSession;
pub use usage::{can_submit, evaluate_submission, SubmissionDecision, UsageCounter};
