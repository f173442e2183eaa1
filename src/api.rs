use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::entitlements::{resolve_features_str, PlanFeatures, PlanTier};
use crate::error::{AppError, AppResult};
use crate::invoices::Invoice;
use crate::requests::{SubmissionAck, SupportRequestForm};
use crate::session::{DashboardSession, DashboardSnapshot, FetchOutcome, RefreshReport};
use crate::usage::{can_submit, UsageCounter};

#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    #[serde(default)]
    pub addon: bool,
}

/// key: plans-api -> entitlement lookup
pub async fn get_plan(
    Path(tier): Path<String>,
    Query(query): Query<PlanQuery>,
) -> AppResult<Json<PlanFeatures>> {
    Ok(Json(resolve_features_str(&tier, query.addon)?))
}

#[derive(Debug, Serialize)]
pub struct UsageCheckResponse {
    pub allowed: bool,
    pub remaining: Option<u32>,
}

pub async fn check_usage(Json(counter): Json<UsageCounter>) -> Json<UsageCheckResponse> {
    Json(UsageCheckResponse {
        allowed: can_submit(&counter),
        remaining: counter.remaining(),
    })
}

pub async fn get_dashboard(
    Extension(session): Extension<Arc<DashboardSession>>,
) -> Json<DashboardSnapshot> {
    Json(session.snapshot(Utc::now()).await)
}

pub async fn refresh_dashboard(
    Extension(session): Extension<Arc<DashboardSession>>,
) -> Json<RefreshReport> {
    Json(session.load().await)
}

#[derive(Debug, Serialize)]
pub struct CreditRefreshResponse {
    pub outcome: FetchOutcome,
    pub balance: crate::credits::CreditBalance,
}

pub async fn refresh_credits(
    Extension(session): Extension<Arc<DashboardSession>>,
) -> Json<CreditRefreshResponse> {
    let outcome = session.refresh_credits().await;
    Json(CreditRefreshResponse {
        outcome,
        balance: session.credit_balance().await,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePlanRequest {
    pub tier: PlanTier,
    #[serde(default, rename = "has24x7Support")]
    pub has_addon: bool,
}

pub async fn change_plan(
    Extension(session): Extension<Arc<DashboardSession>>,
    Json(payload): Json<ChangePlanRequest>,
) -> Json<DashboardSnapshot> {
    session.change_plan(payload.tier, payload.has_addon).await;
    Json(session.snapshot(Utc::now()).await)
}

pub async fn submit_request(
    Extension(session): Extension<Arc<DashboardSession>>,
    Json(form): Json<SupportRequestForm>,
) -> AppResult<(StatusCode, Json<SubmissionAck>)> {
    if form.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".to_string()));
    }
    let ack = session.submit_request(form, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(ack)))
}

pub async fn list_invoices(
    Extension(session): Extension<Arc<DashboardSession>>,
) -> Json<Vec<Invoice>> {
    Json(session.invoices().await)
}

/// key: invoices-api -> attachment download
pub async fn download_invoice(
    Extension(session): Extension<Arc<DashboardSession>>,
    Path(invoice_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let artifact = session
        .render_invoice(&invoice_id, Utc::now())
        .await
        .ok_or(AppError::NotFound)?;
    let headers = [
        (header::CONTENT_TYPE, artifact.content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.file_name),
        ),
    ];
    Ok((headers, artifact.body))
}
