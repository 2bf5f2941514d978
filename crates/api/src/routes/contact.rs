//! Contact-form orchestrator.
//!
//! The ordered pipeline a submission passes through: method guard (router),
//! CSRF consume, rate limit, request-metadata check, sanitize, de-dup check,
//! CRM upsert, de-dup record. Every rejection and every outcome emits an
//! audit event before the response leaves.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use leadgate_core::fingerprint::fingerprint;
use leadgate_core::sanitize::{sanitize, validate_request_metadata};
use leadgate_core::types::{SubmissionInput, ValidationError};
use leadgate_crm::LeadPayload;

use crate::audit;
use crate::error::{ApiError, ApiResult, AppError};
use crate::security;
use crate::state::{AppState, RequestId};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/contact",
            post(submit_contact).fallback(method_not_allowed),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    lead_id: Option<String>,
}

fn respond(status: StatusCode, message: &str, lead_id: Option<String>) -> Response {
    (
        status,
        Json(ContactResponse {
            success: true,
            message: message.to_string(),
            lead_id,
        }),
    )
        .into_response()
}

/// Audit-safe description of a rejection. Field names and categories only,
/// never submitted values.
fn describe(error: &AppError) -> String {
    match error {
        AppError::Validation(err) => err.to_string(),
        AppError::CsrfInvalid => "missing, expired or already-used token".to_string(),
        AppError::MethodNotAllowed => "method not allowed".to_string(),
        AppError::RateLimited => "window limit reached".to_string(),
        AppError::Crm(err) => err.to_string(),
        AppError::Internal(detail) => detail.clone(),
    }
}

async fn submit_contact(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    headers: HeaderMap,
    payload: Result<Json<SubmissionInput>, JsonRejection>,
) -> ApiResult<Response> {
    let expose = !state.settings.is_production();
    let client_ip = security::client_ip(&headers);
    let fail = |error: AppError| {
        audit::security_rejection(&request_id, &client_ip, error.kind(), &describe(&error));
        error.with_request_id(&request_id).exposing_detail(expose)
    };

    let Json(raw) = payload.map_err(|_| {
        fail(AppError::Validation(ValidationError::new(
            "body",
            "invalid JSON body",
        )))
    })?;

    // CSRF first: a valid token is consumed even if the rest fails, so a
    // replayed request cannot probe further.
    let token = headers
        .get("x-csrf-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| raw.csrf_token.clone());
    let Some(token) = token else {
        return Err(fail(AppError::CsrfInvalid));
    };
    let consumed = state
        .csrf
        .consume(&token)
        .await
        .map_err(|err| fail(AppError::from(err)))?;
    if !consumed {
        return Err(fail(AppError::CsrfInvalid));
    }

    let decision = state
        .limiter
        .check(&client_ip, raw.email.as_deref())
        .await
        .map_err(|err| fail(AppError::from(err)))?;
    if !decision.allowed {
        return Err(fail(AppError::RateLimited));
    }

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());
    let referer = headers.get(header::REFERER).and_then(|v| v.to_str().ok());
    validate_request_metadata(user_agent, referer)
        .map_err(|err| fail(AppError::Validation(err)))?;

    let submission = sanitize(&raw).map_err(|err| fail(AppError::Validation(err)))?;

    let fp = fingerprint(&submission);
    let duplicate = state
        .dedup
        .is_duplicate(&fp)
        .await
        .map_err(|err| fail(AppError::from(err)))?;
    if duplicate {
        // Double-submit inside the window: report success without touching
        // the CRM. No lead id on purpose.
        audit::submission_outcome(
            &request_id,
            &client_ip,
            "duplicate",
            None,
            submission.email.len(),
            submission.phone.len(),
        );
        return Ok(respond(
            StatusCode::OK,
            "Your submission has already been received",
            None,
        ));
    }

    let matches = state.crm.search_by_email(&submission.email).await;
    let mut lead = LeadPayload::from_submission(&submission);
    let (status, message, lead_id) = match matches.first() {
        Some(existing) => {
            lead.append_update_note(existing.description.as_deref(), Utc::now());
            state
                .crm
                .update_lead(&existing.id, &lead)
                .await
                .map_err(|err| fail(AppError::Crm(err)))?;
            (StatusCode::OK, "Lead updated successfully", existing.id.clone())
        }
        None => {
            let id = state
                .crm
                .create_lead(&lead)
                .await
                .map_err(|err| fail(AppError::Crm(err)))?;
            (StatusCode::CREATED, "Lead created successfully", id)
        }
    };

    if let Err(err) = state.dedup.record(&fp).await {
        warn!(error = %err, "failed to record de-dup entry");
    }

    audit::submission_outcome(
        &request_id,
        &client_ip,
        if status == StatusCode::CREATED {
            "created"
        } else {
            "updated"
        },
        Some(&lead_id),
        submission.email.len(),
        submission.phone.len(),
    );

    Ok(respond(status, message, Some(lead_id)))
}

async fn method_not_allowed(Extension(RequestId(request_id)): Extension<RequestId>) -> ApiError {
    AppError::MethodNotAllowed.with_request_id(&request_id)
}
