use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cooldown::{CooldownClock, Countdown};
use crate::entitlements::RequestLimit;
use crate::requests::RequestType;

/// key: usage-counter -> rolling request count against a plan limit
///
/// The count is maintained by the request tracker; this crate only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageCounter {
    pub count: u32,
    pub limit: RequestLimit,
}

impl UsageCounter {
    pub fn new(count: u32, limit: RequestLimit) -> Self {
        Self { count, limit }
    }

    pub fn remaining(&self) -> Option<u32> {
        self.limit
            .as_limited()
            .map(|limit| limit.saturating_sub(self.count))
    }

    pub fn is_over_limit(&self) -> bool {
        matches!(self.limit, RequestLimit::Limited(limit) if self.count > limit)
    }
}

/// A counter sitting exactly on its limit is the first rejected attempt.
pub fn can_submit(counter: &UsageCounter) -> bool {
    match counter.limit {
        RequestLimit::Unlimited => true,
        RequestLimit::Limited(limit) => counter.count < limit,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionDecision {
    Allowed,
    LimitReached { count: u32, limit: u32 },
    OnCooldown { remaining: Countdown },
}

impl SubmissionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, SubmissionDecision::Allowed)
    }

    pub fn message(&self) -> String {
        match self {
            SubmissionDecision::Allowed => "allowed".to_string(),
            SubmissionDecision::LimitReached { .. } => "limit reached".to_string(),
            SubmissionDecision::OnCooldown { remaining } => format!("on cooldown ({remaining})"),
        }
    }
}

/// key: submission-gate -> usage limit first, then support cooldown
pub fn evaluate_submission(
    counter: &UsageCounter,
    cooldown: &CooldownClock,
    now: DateTime<Utc>,
    request_type: RequestType,
) -> SubmissionDecision {
    if !can_submit(counter) {
        return SubmissionDecision::LimitReached {
            count: counter.count,
            limit: counter.limit.as_limited().unwrap_or_default(),
        };
    }

    if request_type == RequestType::Support {
        if let Some(remaining) = cooldown.countdown(now) {
            return SubmissionDecision::OnCooldown { remaining };
        }
    }

    SubmissionDecision::Allowed
}
