mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use common::{contact, invoice, FakeDashboardApi};
use plan_governance::credits::DevCreditLedger;
use plan_governance::error::SubmitError;
use plan_governance::requests::{
    ActiveRequest, ActiveRequestsSnapshot, RequestStatus, RequestType, SupportRequestForm,
};
use plan_governance::session::{FetchOutcome, FeedLimits};
use plan_governance::{DashboardSession, PlanTier, RequestLimit, SubmissionDecision};

fn support_form() -> SupportRequestForm {
    SupportRequestForm {
        title: "Checkout is failing".to_string(),
        description: "500 on /pay since this morning".to_string(),
        request_type: RequestType::Support,
        specialist: Some("payments".to_string()),
    }
}

fn open_request(id: &str) -> ActiveRequest {
    ActiveRequest {
        id: id.to_string(),
        title: "Existing ticket".to_string(),
        description: String::new(),
        status: RequestStatus::Pending,
        request_type: RequestType::Support,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn superseded_credit_fetch_is_discarded() {
    let api = Arc::new(FakeDashboardApi::default());
    api.push_credits(Duration::from_millis(150), Some(DevCreditLedger::new(1.0, 5.0)));
    api.push_credits(Duration::from_millis(0), Some(DevCreditLedger::new(4.0, 5.0)));
    let session = DashboardSession::new(api.clone(), contact(), PlanTier::Pro, false);

    let (older, newer) = tokio::join!(session.refresh_credits(), session.refresh_credits());

    assert_eq!(older, FetchOutcome::Stale);
    assert_eq!(newer, FetchOutcome::Applied);
    let balance = session.credit_balance().await;
    assert_eq!(balance.remaining_hours, 1.0);
}

#[tokio::test]
async fn failed_reads_degrade_to_defaults() {
    let api = Arc::new(FakeDashboardApi::default());
    let session = DashboardSession::new(api.clone(), contact(), PlanTier::Enterprise, false);

    let report = session.load().await;
    assert_eq!(report.credits, FetchOutcome::Degraded);
    assert_eq!(report.activity, FetchOutcome::Degraded);
    assert_eq!(report.changelog, FetchOutcome::Degraded);
    assert_eq!(report.invoices, FetchOutcome::Degraded);
    assert_eq!(report.requests, FetchOutcome::Degraded);

    let snapshot = session.snapshot(Utc::now()).await;
    assert_eq!(snapshot.credits.remaining_hours, 15.0);
    assert_eq!(snapshot.credits.percent, 100.0);
    assert!(snapshot.activity.is_empty());
    assert!(snapshot.changelog.is_empty());
    assert!(snapshot.invoices.is_empty());
    assert!(snapshot.requests.is_empty());
    assert_eq!(snapshot.support_submission, SubmissionDecision::Allowed);
}

#[tokio::test]
async fn partial_completion_only_touches_its_own_resource() {
    let api = Arc::new(FakeDashboardApi::default());
    *api.invoices.lock().unwrap() = Some(vec![invoice("inv-1", "INV-1", 2900)]);
    *api.activity.lock().unwrap() = Some(vec![]);
    let session = DashboardSession::with_limits(
        api.clone(),
        contact(),
        PlanTier::Pro,
        false,
        FeedLimits {
            activity: 7,
            changelog: 2,
        },
    );

    let report = session.load().await;
    assert_eq!(report.invoices, FetchOutcome::Applied);
    assert_eq!(report.activity, FetchOutcome::Applied);
    assert_eq!(report.credits, FetchOutcome::Degraded);
    assert_eq!(session.invoices().await.len(), 1);
    assert_eq!(api.activity_limits.lock().unwrap().as_slice(), &[7]);
}

#[tokio::test]
async fn failed_request_fetch_keeps_cooldown() {
    let api = Arc::new(FakeDashboardApi::default());
    let next = Utc::now() + ChronoDuration::minutes(30);
    *api.requests.lock().unwrap() = Some(ActiveRequestsSnapshot {
        requests: vec![open_request("r-1")],
        next_cooldown_expires_at: Some(next),
        requests_this_period: Some(4),
    });
    let session = DashboardSession::new(api.clone(), contact(), PlanTier::Free, false);
    assert_eq!(session.refresh_requests().await, FetchOutcome::Applied);
    assert_eq!(session.usage().await.count, 4);

    *api.requests.lock().unwrap() = None;
    assert_eq!(session.refresh_requests().await, FetchOutcome::Degraded);
    assert_eq!(session.cooldown().await.next_eligible_at, Some(next));
    assert_eq!(session.usage().await.count, 4);
    assert!(session.snapshot(Utc::now()).await.requests.is_empty());
}

#[tokio::test]
async fn free_tier_at_limit_is_denied_regardless_of_cooldown() {
    let api = Arc::new(FakeDashboardApi::default());
    *api.requests.lock().unwrap() = Some(ActiveRequestsSnapshot {
        requests: vec![],
        next_cooldown_expires_at: None,
        requests_this_period: Some(10),
    });
    let session = DashboardSession::new(api.clone(), contact(), PlanTier::Free, false);
    session.refresh_requests().await;

    let err = session
        .submit_request(support_form(), Utc::now())
        .await
        .expect_err("limit should reject");
    match err {
        SubmitError::Rejected(decision) => {
            assert_eq!(
                decision,
                SubmissionDecision::LimitReached {
                    count: 10,
                    limit: 10
                }
            );
            assert_eq!(decision.message(), "limit reached");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(api.submissions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn submission_applies_returned_cooldown() {
    let api = Arc::new(FakeDashboardApi::default());
    let now = Utc::now();
    let cooldown_until = now + ChronoDuration::hours(2);
    *api.submission_cooldown.lock().unwrap() = Some(cooldown_until);
    let session = DashboardSession::new(api.clone(), contact(), PlanTier::Pro, true);

    let ack = session
        .submit_request(support_form(), now)
        .await
        .expect("first ticket accepted");
    assert_eq!(ack.id, "req-1");
    assert_eq!(api.submissions.lock().unwrap().len(), 1);
    assert_eq!(session.cooldown().await.next_eligible_at, Some(cooldown_until));

    let second = session.submit_request(support_form(), now).await;
    assert!(matches!(
        second,
        Err(SubmitError::Rejected(SubmissionDecision::OnCooldown { .. }))
    ));

    let change = SupportRequestForm {
        request_type: RequestType::Change,
        ..support_form()
    };
    assert!(session.submit_request(change, now).await.is_ok());

    let after = session
        .submission_decision(RequestType::Support, cooldown_until + ChronoDuration::seconds(1))
        .await;
    assert_eq!(after, SubmissionDecision::Allowed);
}

#[tokio::test]
async fn plan_change_swaps_limits_and_credit_fallback() {
    let api = Arc::new(FakeDashboardApi::default());
    let session = DashboardSession::new(api.clone(), contact(), PlanTier::Free, false);
    assert_eq!(session.usage().await.limit, RequestLimit::Limited(10));
    assert_eq!(session.credit_balance().await.remaining_hours, 0.0);

    session.change_plan(PlanTier::Enterprise, false).await;
    let features = session.features().await;
    assert_eq!(features.id, PlanTier::Enterprise);
    assert_eq!(session.usage().await.limit, RequestLimit::Unlimited);
    assert_eq!(session.credit_balance().await.remaining_hours, 15.0);
}

#[tokio::test]
async fn stored_invoice_renders_on_demand() {
    let api = Arc::new(FakeDashboardApi::default());
    *api.invoices.lock().unwrap() = Some(vec![invoice("inv-7", "INV-0007", 3900)]);
    let session = DashboardSession::new(api.clone(), contact(), PlanTier::Pro, true);
    session.refresh_invoices().await;

    let artifact = session
        .render_invoice("inv-7", Utc::now())
        .await
        .expect("invoice present");
    assert_eq!(artifact.file_name, "invoice-INV-0007.html");
    assert!(artifact.body.contains("Grace Hopper"));
    assert!(artifact.body.contains("$39.00"));
    assert!(session.render_invoice("missing", Utc::now()).await.is_none());
}

#[tokio::test]
async fn concurrent_submissions_cannot_overrun_the_limit() {
    let api = Arc::new(FakeDashboardApi::default());
    *api.requests.lock().unwrap() = Some(ActiveRequestsSnapshot {
        requests: vec![],
        next_cooldown_expires_at: None,
        requests_this_period: Some(9),
    });
    *api.submit_delay.lock().unwrap() = Duration::from_millis(50);
    let session = DashboardSession::new(api.clone(), contact(), PlanTier::Free, false);
    session.refresh_requests().await;

    let change = SupportRequestForm {
        request_type: RequestType::Change,
        ..support_form()
    };
    let now = Utc::now();
    let (first, second) = tokio::join!(
        session.submit_request(change.clone(), now),
        session.submit_request(change.clone(), now),
    );

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(SubmitError::Rejected(SubmissionDecision::LimitReached {
            count: 10,
            limit: 10
        }))
    ));
    assert_eq!(api.submissions.lock().unwrap().len(), 1);
    assert_eq!(session.usage().await.count, 10);
}

#[tokio::test]
async fn concurrent_support_tickets_respect_the_cooldown() {
    let api = Arc::new(FakeDashboardApi::default());
    *api.requests.lock().unwrap() = Some(ActiveRequestsSnapshot::default());
    *api.submit_delay.lock().unwrap() = Duration::from_millis(50);
    let now = Utc::now();
    *api.submission_cooldown.lock().unwrap() = Some(now + ChronoDuration::hours(1));
    let session = DashboardSession::new(api.clone(), contact(), PlanTier::Pro, false);
    session.refresh_requests().await;

    let (first, second) = tokio::join!(
        session.submit_request(support_form(), now),
        session.submit_request(support_form(), now),
    );

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(SubmitError::Rejected(SubmissionDecision::OnCooldown { .. }))
    ));
    assert_eq!(api.submissions.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn fetch_in_flight_during_plan_change_is_discarded() {
    let api = Arc::new(FakeDashboardApi::default());
    api.push_credits(Duration::from_millis(100), Some(DevCreditLedger::new(0.0, 5.0)));
    api.push_credits(Duration::from_millis(0), Some(DevCreditLedger::new(3.0, 15.0)));
    let session = DashboardSession::new(api.clone(), contact(), PlanTier::Pro, false);

    let (old_plan_fetch, report) = tokio::join!(session.refresh_credits(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.change_plan(PlanTier::Enterprise, false).await
    });

    assert_eq!(old_plan_fetch, FetchOutcome::Stale);
    assert_eq!(report.credits, FetchOutcome::Applied);
    let balance = session.credit_balance().await;
    assert_eq!(balance.remaining_hours, 12.0);
}

#[tokio::test]
async fn snapshot_flags_counts_reported_past_the_limit() {
    let api = Arc::new(FakeDashboardApi::default());
    *api.requests.lock().unwrap() = Some(ActiveRequestsSnapshot {
        requests: vec![open_request("r-1"), open_request("r-2")],
        next_cooldown_expires_at: None,
        requests_this_period: Some(12),
    });
    let session = DashboardSession::new(api.clone(), contact(), PlanTier::Free, false);
    session.refresh_requests().await;

    let snapshot = session.snapshot(Utc::now()).await;
    assert!(snapshot.over_limit);
    assert_eq!(snapshot.usage.count, 12);
    assert_eq!(snapshot.usage_remaining, Some(0));
    assert_eq!(snapshot.request_summary.open(), 2);
}
