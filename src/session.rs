use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::client::DashboardApi;
use crate::cooldown::{CooldownClock, Countdown};
use crate::credits::{CreditBalance, CreditLedgerView, CreditLogEntry};
use crate::entitlements::{resolve_features, PlanFeatures, PlanTier};
use crate::error::SubmitError;
use crate::feed::{ActivityEntry, ChangelogEntry};
use crate::invoices::{self, BillingContact, Invoice, InvoiceArchive, InvoiceArtifact};
use crate::requests::{
    ActiveRequest, RequestSummary, RequestType, SubmissionAck, SupportRequestForm,
};
use crate::usage::{evaluate_submission, SubmissionDecision, UsageCounter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Credits,
    Activity,
    Changelog,
    Invoices,
    Requests,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Credits,
        Resource::Activity,
        Resource::Changelog,
        Resource::Invoices,
        Resource::Requests,
    ];

    fn index(self) -> usize {
        match self {
            Resource::Credits => 0,
            Resource::Activity => 1,
            Resource::Changelog => 2,
            Resource::Invoices => 3,
            Resource::Requests => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    resource: Resource,
    generation: u64,
}

/// key: fetch-generations -> last-issued-wins per resource
///
/// Every fetch takes a ticket when it is issued. A result is applied only if
/// no newer ticket was issued for the same resource in the meantime.
#[derive(Debug, Default)]
pub struct FetchGenerations {
    counters: [AtomicU64; 5],
}

impl FetchGenerations {
    pub fn issue(&self, resource: Resource) -> FetchTicket {
        let generation = self.counters[resource.index()].fetch_add(1, Ordering::SeqCst) + 1;
        FetchTicket {
            resource,
            generation,
        }
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.counters[ticket.resource.index()].load(Ordering::SeqCst) == ticket.generation
    }

    /// Supersedes every ticket issued so far, for all resources.
    pub fn invalidate_all(&self) {
        for resource in Resource::ALL {
            self.counters[resource.index()].fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    Applied,
    Degraded,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub credits: FetchOutcome,
    pub activity: FetchOutcome,
    pub changelog: FetchOutcome,
    pub invoices: FetchOutcome,
    pub requests: FetchOutcome,
}

#[derive(Debug, Clone, Copy)]
pub struct FeedLimits {
    pub activity: usize,
    pub changelog: usize,
}

impl Default for FeedLimits {
    fn default() -> Self {
        Self {
            activity: 5,
            changelog: 3,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    tier: PlanTier,
    has_addon: bool,
    features: PlanFeatures,
    credits: CreditLedgerView,
    invoices: InvoiceArchive,
    activity: Vec<ActivityEntry>,
    changelog: Vec<ChangelogEntry>,
    requests: Vec<ActiveRequest>,
    usage: UsageCounter,
    cooldown: CooldownClock,
}

impl SessionState {
    fn new(tier: PlanTier, has_addon: bool) -> Self {
        let features = resolve_features(tier, has_addon);
        Self {
            tier,
            has_addon,
            credits: CreditLedgerView::new(f64::from(features.free_dev_credit_hours)),
            usage: UsageCounter::new(0, features.request_limit),
            features,
            invoices: InvoiceArchive::default(),
            activity: Vec::new(),
            changelog: Vec::new(),
            requests: Vec::new(),
            cooldown: CooldownClock::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub tier: PlanTier,
    #[serde(rename = "has24x7Support")]
    pub has_addon: bool,
    pub features: PlanFeatures,
    pub credits: CreditBalance,
    pub credit_logs: Vec<CreditLogEntry>,
    pub usage: UsageCounter,
    pub usage_remaining: Option<u32>,
    pub over_limit: bool,
    pub cooldown: Option<Countdown>,
    pub support_submission: SubmissionDecision,
    pub change_submission: SubmissionDecision,
    pub request_summary: RequestSummary,
    pub requests: Vec<ActiveRequest>,
    pub activity: Vec<ActivityEntry>,
    pub changelog: Vec<ChangelogEntry>,
    pub invoices: Vec<Invoice>,
}

/// key: dashboard-session -> in-memory store owned by the hosting process
///
/// Holds one account's view. Fetched data is replaced wholesale per resource;
/// the state lock is never held across a network call. Submissions are
/// serialized by their own guard so the gate and the tracker agree.
pub struct DashboardSession {
    api: Arc<dyn DashboardApi>,
    contact: BillingContact,
    limits: FeedLimits,
    generations: FetchGenerations,
    state: RwLock<SessionState>,
    submissions: Mutex<()>,
}

impl DashboardSession {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        contact: BillingContact,
        tier: PlanTier,
        has_addon: bool,
    ) -> Self {
        Self::with_limits(api, contact, tier, has_addon, FeedLimits::default())
    }

    pub fn with_limits(
        api: Arc<dyn DashboardApi>,
        contact: BillingContact,
        tier: PlanTier,
        has_addon: bool,
        limits: FeedLimits,
    ) -> Self {
        Self {
            api,
            contact,
            limits,
            generations: FetchGenerations::default(),
            state: RwLock::new(SessionState::new(tier, has_addon)),
            submissions: Mutex::new(()),
        }
    }

    pub async fn features(&self) -> PlanFeatures {
        self.state.read().await.features.clone()
    }

    pub async fn cooldown(&self) -> CooldownClock {
        self.state.read().await.cooldown
    }

    pub async fn usage(&self) -> UsageCounter {
        self.state.read().await.usage
    }

    pub async fn credit_balance(&self) -> CreditBalance {
        self.state.read().await.credits.balance()
    }

    /// Re-resolves entitlements for a new plan and reloads everything.
    /// Results of fetches issued under the previous plan are discarded.
    pub async fn change_plan(&self, tier: PlanTier, has_addon: bool) -> RefreshReport {
        {
            let mut state = self.state.write().await;
            let features = resolve_features(tier, has_addon);
            state.credits.reset(f64::from(features.free_dev_credit_hours));
            state.usage.limit = features.request_limit;
            state.tier = tier;
            state.has_addon = has_addon;
            state.features = features;
            self.generations.invalidate_all();
            info!(tier = %tier, has_addon, "plan entitlements resolved");
        }
        self.load().await
    }

    /// Issues every boundary read concurrently. Each resource is applied on
    /// its own as it completes.
    pub async fn load(&self) -> RefreshReport {
        let (credits, activity, changelog, invoices, requests) = tokio::join!(
            self.refresh_credits(),
            self.refresh_activity(),
            self.refresh_changelog(),
            self.refresh_invoices(),
            self.refresh_requests(),
        );
        let report = RefreshReport {
            credits,
            activity,
            changelog,
            invoices,
            requests,
        };
        debug!(?report, "dashboard load finished");
        report
    }

    pub async fn refresh_credits(&self) -> FetchOutcome {
        let ticket = self.generations.issue(Resource::Credits);
        let outcome = self.api.fetch_dev_credits().await;
        let mut state = self.state.write().await;
        if !self.generations.is_current(ticket) {
            return stale(ticket);
        }
        let degraded = outcome.is_err();
        state.credits.apply_refresh(outcome);
        if degraded {
            FetchOutcome::Degraded
        } else {
            FetchOutcome::Applied
        }
    }

    pub async fn refresh_activity(&self) -> FetchOutcome {
        let ticket = self.generations.issue(Resource::Activity);
        let outcome = self.api.fetch_recent_activity(self.limits.activity).await;
        let mut state = self.state.write().await;
        if !self.generations.is_current(ticket) {
            return stale(ticket);
        }
        let (entries, result) = or_empty(outcome, Resource::Activity);
        state.activity = entries;
        result
    }

    pub async fn refresh_changelog(&self) -> FetchOutcome {
        let ticket = self.generations.issue(Resource::Changelog);
        let outcome = self.api.fetch_changelog(self.limits.changelog).await;
        let mut state = self.state.write().await;
        if !self.generations.is_current(ticket) {
            return stale(ticket);
        }
        let (entries, result) = or_empty(outcome, Resource::Changelog);
        state.changelog = entries;
        result
    }

    pub async fn refresh_invoices(&self) -> FetchOutcome {
        let ticket = self.generations.issue(Resource::Invoices);
        let outcome = self.api.fetch_invoices().await;
        let mut state = self.state.write().await;
        if !self.generations.is_current(ticket) {
            return stale(ticket);
        }
        let (invoices, result) = or_empty(outcome, Resource::Invoices);
        state.invoices = InvoiceArchive::new(invoices);
        result
    }

    /// A failed read empties the list but leaves the cooldown and the usage
    /// count as they were.
    pub async fn refresh_requests(&self) -> FetchOutcome {
        let ticket = self.generations.issue(Resource::Requests);
        let outcome = self.api.fetch_active_requests().await;
        let mut state = self.state.write().await;
        if !self.generations.is_current(ticket) {
            return stale(ticket);
        }
        match outcome {
            Ok(snapshot) => {
                state.usage.count = snapshot.usage_count();
                state.cooldown = CooldownClock::new(snapshot.next_cooldown_expires_at);
                state.requests = snapshot.requests;
                FetchOutcome::Applied
            }
            Err(err) => {
                warn!(?err, resource = "requests", "dashboard fetch degraded");
                state.requests = Vec::new();
                FetchOutcome::Degraded
            }
        }
    }

    pub async fn submission_decision(
        &self,
        request_type: RequestType,
        now: DateTime<Utc>,
    ) -> SubmissionDecision {
        let state = self.state.read().await;
        evaluate_submission(&state.usage, &state.cooldown, now, request_type)
    }

    /// Gates the submission locally, forwards it to the tracker, then
    /// refreshes the request projection so the counter reflects it. Only one
    /// submission is in flight at a time; the next one is gated against the
    /// refreshed count and cooldown.
    pub async fn submit_request(
        &self,
        form: SupportRequestForm,
        now: DateTime<Utc>,
    ) -> Result<SubmissionAck, SubmitError> {
        let _in_flight = self.submissions.lock().await;
        let decision = self.submission_decision(form.request_type, now).await;
        if !decision.is_allowed() {
            info!(
                request_type = ?form.request_type,
                reason = %decision.message(),
                "request submission refused"
            );
            return Err(SubmitError::Rejected(decision));
        }

        let ack = self
            .api
            .submit_support_request(&form)
            .await
            .map_err(SubmitError::Upstream)?;
        info!(request_id = %ack.id, request_type = ?form.request_type, "request submitted");

        if let Some(next_eligible_at) = ack.next_cooldown_expires_at {
            self.state.write().await.cooldown = CooldownClock::new(Some(next_eligible_at));
        }
        self.refresh_requests().await;
        Ok(ack)
    }

    pub async fn invoices(&self) -> Vec<Invoice> {
        self.state.read().await.invoices.invoices().to_vec()
    }

    pub async fn render_invoice(&self, id: &str, now: DateTime<Utc>) -> Option<InvoiceArtifact> {
        let state = self.state.read().await;
        state
            .invoices
            .get(id)
            .map(|invoice| invoices::render(invoice, &self.contact, now))
    }

    pub async fn snapshot(&self, now: DateTime<Utc>) -> DashboardSnapshot {
        let state = self.state.read().await;
        DashboardSnapshot {
            tier: state.tier,
            has_addon: state.has_addon,
            features: state.features.clone(),
            credits: state.credits.balance(),
            credit_logs: state
                .credits
                .ledger()
                .map(|ledger| ledger.logs.clone())
                .unwrap_or_default(),
            usage: state.usage,
            usage_remaining: state.usage.remaining(),
            over_limit: state.usage.is_over_limit(),
            cooldown: state.cooldown.countdown(now),
            support_submission: evaluate_submission(
                &state.usage,
                &state.cooldown,
                now,
                RequestType::Support,
            ),
            change_submission: evaluate_submission(
                &state.usage,
                &state.cooldown,
                now,
                RequestType::Change,
            ),
            request_summary: RequestSummary::from_requests(&state.requests),
            requests: state.requests.clone(),
            activity: state.activity.clone(),
            changelog: state.changelog.clone(),
            invoices: state.invoices.invoices().to_vec(),
        }
    }
}

fn stale(ticket: FetchTicket) -> FetchOutcome {
    debug!(
        resource = ?ticket.resource,
        generation = ticket.generation,
        "discarding superseded fetch result"
    );
    FetchOutcome::Stale
}

fn or_empty<T>(outcome: anyhow::Result<Vec<T>>, resource: Resource) -> (Vec<T>, FetchOutcome) {
    match outcome {
        Ok(entries) => (entries, FetchOutcome::Applied),
        Err(err) => {
            warn!(?err, ?resource, "dashboard fetch degraded");
            (Vec::new(), FetchOutcome::Degraded)
        }
    }
}
