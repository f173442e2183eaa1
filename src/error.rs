use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::entitlements::EntitlementError;
use crate::usage::SubmissionDecision;

/// Outcome of a refused or failed request submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{}", .0.message())]
    Rejected(SubmissionDecision),
    #[error("request submission failed: {0:#}")]
    Upstream(anyhow::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Entitlement(#[from] EntitlementError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error("not found")]
    NotFound,
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Entitlement(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Submit(SubmitError::Rejected(_)) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Submit(SubmitError::Upstream(_)) => StatusCode::BAD_GATEWAY,
        };
        let body = match &self {
            AppError::Submit(SubmitError::Rejected(decision)) => json!({
                "error": self.to_string(),
                "decision": decision,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        if status.is_server_error() {
            tracing::error!(error = ?self, %status, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request refused");
        }
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
