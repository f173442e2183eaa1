use super::models::{EntitlementError, PlanFeatures, PlanTier, RequestLimit};

/// Monthly surcharge for the 24x7 support add-on on the pro tier.
pub const PRO_ADDON_SURCHARGE: u32 = 10;

const FREE_PRICE: u32 = 0;
const PRO_PRICE: u32 = 29;
const ENTERPRISE_PRICE: u32 = 99;

const FREE_REQUEST_LIMIT: u32 = 10;
const PRO_REQUEST_LIMIT: u32 = 50;

const FAST_RESPONSE: &str = "Under 1 hour";
const NEXT_BUSINESS_DAY: &str = "Next business day";

/// key: plan-catalog -> (tier, addon) to entitlement descriptor
///
/// The 24x7 add-on only changes the pro tier. Enterprise already includes it.
pub fn resolve_features(tier: PlanTier, has_addon: bool) -> PlanFeatures {
    match tier {
        PlanTier::Free => PlanFeatures {
            id: PlanTier::Free,
            name: PlanTier::Free.display_name().to_string(),
            price: FREE_PRICE,
            price_display: price_display(FREE_PRICE),
            request_limit: RequestLimit::Limited(FREE_REQUEST_LIMIT),
            response_time_business: "Within 24 hours".to_string(),
            response_time_off_hours: NEXT_BUSINESS_DAY.to_string(),
            channels: channels(&["Email"]),
            ai_capability: "Basic AI triage".to_string(),
            priority_tier: "Standard".to_string(),
            health_check_enabled: false,
            security_audit_enabled: false,
            uptime_monitoring_enabled: false,
            dedicated_engineer_enabled: false,
            true_24x7_support_enabled: false,
            free_dev_credit_hours: 0,
        },
        PlanTier::Pro => {
            let price = if has_addon {
                PRO_PRICE + PRO_ADDON_SURCHARGE
            } else {
                PRO_PRICE
            };
            PlanFeatures {
                id: PlanTier::Pro,
                name: PlanTier::Pro.display_name().to_string(),
                price,
                price_display: price_display(price),
                request_limit: RequestLimit::Limited(PRO_REQUEST_LIMIT),
                response_time_business: "Under 4 hours".to_string(),
                response_time_off_hours: if has_addon {
                    FAST_RESPONSE.to_string()
                } else {
                    NEXT_BUSINESS_DAY.to_string()
                },
                channels: channels(&["Email", "Live chat"]),
                ai_capability: "Advanced AI diagnostics".to_string(),
                priority_tier: "Priority".to_string(),
                health_check_enabled: true,
                security_audit_enabled: false,
                uptime_monitoring_enabled: true,
                dedicated_engineer_enabled: false,
                true_24x7_support_enabled: has_addon,
                free_dev_credit_hours: 5,
            }
        }
        PlanTier::Enterprise => PlanFeatures {
            id: PlanTier::Enterprise,
            name: PlanTier::Enterprise.display_name().to_string(),
            price: ENTERPRISE_PRICE,
            price_display: price_display(ENTERPRISE_PRICE),
            request_limit: RequestLimit::Unlimited,
            response_time_business: FAST_RESPONSE.to_string(),
            response_time_off_hours: FAST_RESPONSE.to_string(),
            channels: channels(&["Email", "Live chat", "Phone", "Dedicated Slack"]),
            ai_capability: "Custom AI workflows".to_string(),
            priority_tier: "Critical".to_string(),
            health_check_enabled: true,
            security_audit_enabled: true,
            uptime_monitoring_enabled: true,
            dedicated_engineer_enabled: true,
            true_24x7_support_enabled: true,
            free_dev_credit_hours: 15,
        },
    }
}

/// Resolves a tier arriving as raw text. Unknown tiers are an error rather
/// than a silent downgrade to free.
pub fn resolve_features_str(
    raw_tier: &str,
    has_addon: bool,
) -> Result<PlanFeatures, EntitlementError> {
    let tier = raw_tier.parse::<PlanTier>()?;
    Ok(resolve_features(tier, has_addon))
}

fn price_display(price: u32) -> String {
    format!("${price}/mo")
}

fn channels(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
