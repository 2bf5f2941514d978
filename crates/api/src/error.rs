use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use leadgate_core::store::StoreError;
use leadgate_core::types::ValidationError;
use leadgate_crm::CrmError;

#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    CsrfInvalid,
    MethodNotAllowed,
    RateLimited,
    Crm(CrmError),
    Internal(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<CrmError> for AppError {
    fn from(err: CrmError) -> Self {
        AppError::Crm(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub request_id: String,
    pub expose_detail: bool,
}

impl AppError {
    pub fn with_request_id(self, request_id: &str) -> ApiError {
        ApiError {
            error: self,
            request_id: request_id.to_string(),
            expose_detail: false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_failed",
            AppError::CsrfInvalid => "csrf_invalid",
            AppError::MethodNotAllowed => "method_not_allowed",
            AppError::RateLimited => "rate_limited",
            AppError::Crm(_) => "crm_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl ApiError {
    /// Internal error detail is only serialized outside production.
    pub fn exposing_detail(mut self, expose: bool) -> Self {
        self.expose_detail = expose;
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, detail) = match self.error {
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            AppError::CsrfInvalid => (
                StatusCode::FORBIDDEN,
                "Invalid or expired security token".to_string(),
                None,
            ),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_string(),
                None,
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests. Please try again later.".to_string(),
                None,
            ),
            AppError::Crm(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unable to process your request right now".to_string(),
                Some(err.to_string()),
            ),
            AppError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected error".to_string(),
                Some(detail),
            ),
        };

        let detail = if self.expose_detail { detail } else { None };

        (
            status,
            Json(ErrorResponse {
                success: false,
                message,
                request_id: self.request_id,
                detail,
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
