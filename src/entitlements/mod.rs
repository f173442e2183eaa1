pub mod catalog;
pub mod models;

pub use catalog::{resolve_features, resolve_features_str, PRO_ADDON_SURCHARGE};
pub use models::{EntitlementError, PlanFeatures, PlanTier, RequestLimit};
