use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::graphql::GraphqlError;
use crate::positions::image::StorageError;
use crate::session::company_auth::CompanyAuthError;
use crate::wizard::controller::TransitionError;
use crate::wizard::modal::ModalError;
use crate::wizard::pipeline::PipelineFailure;

/// Generic toast text shown for any upstream failure.
pub const SERVER_ERROR_NOTICE: &str = "Server error";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Subscription required for company {0}")]
    SubscriptionRequired(String),

    #[error("Step transition rejected: {0}")]
    Transition(#[from] TransitionError),

    #[error("Modal action rejected: {0}")]
    Modal(#[from] ModalError),

    #[error("GraphQL error: {0}")]
    Graphql(#[from] GraphqlError),

    #[error("Company auth error: {0}")]
    CompanyAuth(#[from] CompanyAuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Submission failed: {source}")]
    Submission {
        notice: &'static str,
        source: PipelineFailure,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Authentication required".to_string(),
            ),
            AppError::Unauthorized => (
                StatusCode::FORBIDDEN,
                "UNAUTHORIZED",
                "Access denied".to_string(),
            ),
            AppError::SubscriptionRequired(slug) => (
                StatusCode::PAYMENT_REQUIRED,
                "SUBSCRIPTION_REQUIRED",
                format!("Company {slug} needs an active subscription"),
            ),
            AppError::Transition(e) => (StatusCode::CONFLICT, "STEP_REJECTED", e.to_string()),
            AppError::Modal(e) => (StatusCode::CONFLICT, "MODAL_REJECTED", e.to_string()),
            AppError::Graphql(e) => {
                tracing::error!("GraphQL error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SERVER_ERROR",
                    SERVER_ERROR_NOTICE.to_string(),
                )
            }
            AppError::CompanyAuth(e) => {
                tracing::error!("Company auth error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SERVER_ERROR",
                    SERVER_ERROR_NOTICE.to_string(),
                )
            }
            AppError::Storage(StorageError::TooLarge { size, limit }) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "IMAGE_TOO_LARGE",
                format!("Image is {size} bytes, the limit is {limit}"),
            ),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SERVER_ERROR",
                    SERVER_ERROR_NOTICE.to_string(),
                )
            }
            AppError::Submission { notice, source } => {
                tracing::error!("Submission failed: {source}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SUBMISSION_FAILED",
                    notice.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
