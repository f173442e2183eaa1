use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::credits::DevCreditLedger;
use crate::feed::{ActivityEntry, ChangelogEntry};
use crate::invoices::Invoice;
use crate::requests::{ActiveRequestsSnapshot, SubmissionAck, SupportRequestForm};

/// key: dashboard-api -> external reads and the support submission
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn fetch_dev_credits(&self) -> Result<DevCreditLedger>;
    async fn fetch_recent_activity(&self, limit: usize) -> Result<Vec<ActivityEntry>>;
    async fn fetch_changelog(&self, limit: usize) -> Result<Vec<ChangelogEntry>>;
    async fn fetch_invoices(&self) -> Result<Vec<Invoice>>;
    async fn fetch_active_requests(&self) -> Result<ActiveRequestsSnapshot>;
    async fn submit_support_request(&self, form: &SupportRequestForm) -> Result<SubmissionAck>;
}

pub struct HttpDashboardApi {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpDashboardApi {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Result<Self> {
        let base_url = base_url.into();
        url::Url::parse(&base_url)
            .with_context(|| format!("invalid dashboard api base url `{base_url}`"))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build dashboard api client")?;
        Ok(Self {
            client,
            base_url,
            auth_token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.auth_token {
            request.bearer_auth(token)
        } else {
            request
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        resource: &str,
    ) -> Result<T> {
        self.auth(self.client.get(self.endpoint(path)))
            .query(query)
            .send()
            .await
            .with_context(|| format!("failed to reach dashboard api for {resource}"))?
            .error_for_status()
            .with_context(|| format!("dashboard api rejected {resource} request"))?
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode {resource} response"))
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn fetch_dev_credits(&self) -> Result<DevCreditLedger> {
        self.get_json("credits", &[], "dev credits").await
    }

    async fn fetch_recent_activity(&self, limit: usize) -> Result<Vec<ActivityEntry>> {
        self.get_json("activity", &[("limit", limit.to_string())], "activity")
            .await
    }

    async fn fetch_changelog(&self, limit: usize) -> Result<Vec<ChangelogEntry>> {
        self.get_json("changelog", &[("limit", limit.to_string())], "changelog")
            .await
    }

    async fn fetch_invoices(&self) -> Result<Vec<Invoice>> {
        self.get_json("invoices", &[], "invoices").await
    }

    async fn fetch_active_requests(&self) -> Result<ActiveRequestsSnapshot> {
        self.get_json("requests", &[], "active requests").await
    }

    async fn submit_support_request(&self, form: &SupportRequestForm) -> Result<SubmissionAck> {
        self.auth(self.client.post(self.endpoint("requests")))
            .json(form)
            .send()
            .await
            .context("failed to reach dashboard api for request submission")?
            .error_for_status()
            .context("dashboard api rejected request submission")?
            .json::<SubmissionAck>()
            .await
            .context("failed to decode submission acknowledgement")
    }
}
