#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use plan_governance::credits::DevCreditLedger;
use plan_governance::feed::{ActivityEntry, ChangelogEntry};
use plan_governance::invoices::{BillingContact, Invoice};
use plan_governance::requests::{
    ActiveRequestsSnapshot, SubmissionAck, SupportRequestForm,
};
use plan_governance::DashboardApi;

/// Scripted credit response: wait `delay`, then return the ledger or fail.
pub struct ScriptedCredits {
    pub delay: Duration,
    pub ledger: Option<DevCreditLedger>,
}

#[derive(Default)]
pub struct FakeDashboardApi {
    pub credits: Mutex<VecDeque<ScriptedCredits>>,
    pub activity: Mutex<Option<Vec<ActivityEntry>>>,
    pub changelog: Mutex<Option<Vec<ChangelogEntry>>>,
    pub invoices: Mutex<Option<Vec<Invoice>>>,
    pub requests: Mutex<Option<ActiveRequestsSnapshot>>,
    pub submissions: Mutex<Vec<SupportRequestForm>>,
    pub submission_cooldown: Mutex<Option<DateTime<Utc>>>,
    pub submit_delay: Mutex<Duration>,
    pub activity_limits: Mutex<Vec<usize>>,
}

impl FakeDashboardApi {
    pub fn push_credits(&self, delay: Duration, ledger: Option<DevCreditLedger>) {
        self.credits
            .lock()
            .unwrap()
            .push_back(ScriptedCredits { delay, ledger });
    }
}

#[async_trait]
impl DashboardApi for FakeDashboardApi {
    async fn fetch_dev_credits(&self) -> Result<DevCreditLedger> {
        let scripted = self.credits.lock().unwrap().pop_front();
        let Some(scripted) = scripted else {
            return Err(anyhow!("credits endpoint unavailable"));
        };
        tokio::time::sleep(scripted.delay).await;
        scripted
            .ledger
            .ok_or_else(|| anyhow!("credits endpoint returned 503"))
    }

    async fn fetch_recent_activity(&self, limit: usize) -> Result<Vec<ActivityEntry>> {
        self.activity_limits.lock().unwrap().push(limit);
        self.activity
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("activity endpoint unavailable"))
    }

    async fn fetch_changelog(&self, _limit: usize) -> Result<Vec<ChangelogEntry>> {
        self.changelog
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("changelog endpoint unavailable"))
    }

    async fn fetch_invoices(&self) -> Result<Vec<Invoice>> {
        self.invoices
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("invoices endpoint unavailable"))
    }

    async fn fetch_active_requests(&self) -> Result<ActiveRequestsSnapshot> {
        self.requests
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("requests endpoint unavailable"))
    }

    /// Accepts the ticket and, like the real tracker, counts it against the
    /// period when a request snapshot is being served.
    async fn submit_support_request(&self, form: &SupportRequestForm) -> Result<SubmissionAck> {
        let delay = *self.submit_delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        let next_cooldown_expires_at = *self.submission_cooldown.lock().unwrap();
        if let Some(snapshot) = self.requests.lock().unwrap().as_mut() {
            let counted = snapshot.usage_count();
            snapshot.requests_this_period = Some(counted + 1);
            if next_cooldown_expires_at.is_some() {
                snapshot.next_cooldown_expires_at = next_cooldown_expires_at;
            }
        }

        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(form.clone());
        Ok(SubmissionAck {
            id: format!("req-{}", submissions.len()),
            next_cooldown_expires_at,
        })
    }
}

pub fn contact() -> BillingContact {
    BillingContact {
        display_name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
    }
}

pub fn invoice(id: &str, number: &str, amount_cents: i64) -> Invoice {
    let created_at = Utc::now();
    Invoice {
        id: id.to_string(),
        invoice_number: number.to_string(),
        amount_cents,
        currency: "USD".to_string(),
        status: "paid".to_string(),
        plan_name: "Pro".to_string(),
        billing_start: created_at - chrono::Duration::days(30),
        billing_end: created_at,
        created_at,
    }
}
