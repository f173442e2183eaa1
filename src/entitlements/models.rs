use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntitlementError {
    #[error("invalid plan tier `{0}`; expected one of free, pro, enterprise")]
    InvalidTier(String),
}

/// key: entitlement-tier -> free,pro,enterprise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PlanTier {
    Free,
    Pro,
    Enterprise,
}

impl PlanTier {
    pub const ALL: [PlanTier; 3] = [PlanTier::Free, PlanTier::Pro, PlanTier::Enterprise];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
            PlanTier::Enterprise => "enterprise",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlanTier::Free => "Free",
            PlanTier::Pro => "Pro",
            PlanTier::Enterprise => "Enterprise",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = EntitlementError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(PlanTier::Free),
            "pro" => Ok(PlanTier::Pro),
            "enterprise" => Ok(PlanTier::Enterprise),
            _ => Err(EntitlementError::InvalidTier(raw.to_string())),
        }
    }
}

impl TryFrom<String> for PlanTier {
    type Error = EntitlementError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Request allowance attached to a plan. Serialized as a number or the
/// literal string `"unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestLimit {
    Limited(u32),
    Unlimited,
}

impl RequestLimit {
    pub fn as_limited(&self) -> Option<u32> {
        match self {
            RequestLimit::Limited(limit) => Some(*limit),
            RequestLimit::Unlimited => None,
        }
    }
}

impl fmt::Display for RequestLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestLimit::Limited(limit) => write!(f, "{limit}"),
            RequestLimit::Unlimited => f.write_str("unlimited"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RequestLimitRepr {
    Limited(u32),
    Keyword(String),
}

impl Serialize for RequestLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RequestLimit::Limited(limit) => serializer.serialize_u32(*limit),
            RequestLimit::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl<'de> Deserialize<'de> for RequestLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RequestLimitRepr::deserialize(deserializer)? {
            RequestLimitRepr::Limited(limit) => Ok(RequestLimit::Limited(limit)),
            RequestLimitRepr::Keyword(keyword) if keyword.eq_ignore_ascii_case("unlimited") => {
                Ok(RequestLimit::Unlimited)
            }
            RequestLimitRepr::Keyword(other) => Err(serde::de::Error::custom(format!(
                "unsupported request limit `{other}`"
            ))),
        }
    }
}

/// key: entitlement-features -> resolved plan descriptor
///
/// Always produced by [`crate::entitlements::resolve_features`]; never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeatures {
    pub id: PlanTier,
    pub name: String,
    pub price: u32,
    pub price_display: String,
    pub request_limit: RequestLimit,
    pub response_time_business: String,
    pub response_time_off_hours: String,
    pub channels: Vec<String>,
    pub ai_capability: String,
    pub priority_tier: String,
    pub health_check_enabled: bool,
    pub security_audit_enabled: bool,
    pub uptime_monitoring_enabled: bool,
    pub dedicated_engineer_enabled: bool,
    #[serde(rename = "true24x7SupportEnabled")]
    pub true_24x7_support_enabled: bool,
    pub free_dev_credit_hours: u32,
}
