use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Support,
    Change,
}

/// key: request-projection -> read-only view of the external tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRequest {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: RequestStatus,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRequestsSnapshot {
    #[serde(default)]
    pub requests: Vec<ActiveRequest>,
    #[serde(default)]
    pub next_cooldown_expires_at: Option<DateTime<Utc>>,
    /// Requests counted against the rolling limit. Trackers that omit it
    /// fall back to the number of listed requests.
    #[serde(default)]
    pub requests_this_period: Option<u32>,
}

impl ActiveRequestsSnapshot {
    pub fn usage_count(&self) -> u32 {
        self.requests_this_period
            .unwrap_or_else(|| u32::try_from(self.requests.len()).unwrap_or(u32::MAX))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequestForm {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    #[serde(default)]
    pub specialist: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAck {
    pub id: String,
    #[serde(default)]
    pub next_cooldown_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub support: usize,
    pub change: usize,
}

impl RequestSummary {
    pub fn from_requests(requests: &[ActiveRequest]) -> Self {
        requests
            .iter()
            .fold(RequestSummary::default(), |mut summary, request| {
                summary.total += 1;
                match request.status {
                    RequestStatus::Pending => summary.pending += 1,
                    RequestStatus::InProgress => summary.in_progress += 1,
                    RequestStatus::Resolved => summary.resolved += 1,
                }
                match request.request_type {
                    RequestType::Support => summary.support += 1,
                    RequestType::Change => summary.change += 1,
                }
                summary
            })
    }

    pub fn open(&self) -> usize {
        self.pending + self.in_progress
    }
}
