use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::render::{PreviewError, RenderError};
use crate::signing::workflow::FailureKind;
use crate::signing::WorkflowError;
use crate::templates::TemplateError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    UnknownTemplate(#[from] TemplateError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Preview blocked by missing fields: {}", .0.join(", "))]
    PreviewIncomplete(Vec<String>),

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error("Preview render failed: {0}")]
    PreviewFailed(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<Value>) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::UnknownTemplate(e) => {
                (StatusCode::NOT_FOUND, "UNKNOWN_TEMPLATE", e.to_string(), None)
            }
            AppError::Workflow(e) => {
                let (status, code) = match e {
                    WorkflowError::Validation { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "MISSING_FIELDS")
                    }
                    WorkflowError::InvalidDocumentResponse => {
                        (StatusCode::BAD_GATEWAY, "INVALID_DOCUMENT_RESPONSE")
                    }
                    WorkflowError::RecipientMissing { .. } => {
                        (StatusCode::BAD_GATEWAY, "RECIPIENT_MISSING")
                    }
                    WorkflowError::Render { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "RENDER_FAILED")
                    }
                    WorkflowError::Storage { .. } => (StatusCode::BAD_GATEWAY, "STORAGE_ERROR"),
                    WorkflowError::Esign { .. } => (StatusCode::BAD_GATEWAY, "ESIGN_ERROR"),
                };
                let kind = match e.kind() {
                    FailureKind::Validation => "validation",
                    FailureKind::Transport => "transport",
                };
                let mut extra = json!({ "kind": kind });
                if let WorkflowError::Validation { missing } = e {
                    extra["missing"] = json!(missing);
                }
                if let Some(step) = e.step() {
                    extra["step"] = json!(step);
                }
                if let Some(id) = e.document_id() {
                    extra["documentId"] = json!(id);
                }
                (status, code, e.user_message(), Some(extra))
            }
            AppError::PreviewIncomplete(missing) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PREVIEW_MISSING_FIELDS",
                format!(
                    "Preview unavailable until these fields are completed: {}.",
                    missing.join(", ")
                ),
                Some(json!({ "missing": missing })),
            ),
            AppError::Preview(e @ PreviewError::Superseded { .. }) => (
                StatusCode::CONFLICT,
                "PREVIEW_SUPERSEDED",
                e.to_string(),
                None,
            ),
            AppError::Preview(e @ PreviewError::Closed { .. }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string(), None)
            }
            AppError::PreviewFailed(e) => {
                tracing::error!("Preview render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PREVIEW_FAILED",
                    "The preview could not be rendered".to_string(),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, extra) = self.parts();

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let (Some(Value::Object(extra)), Some(obj)) = (extra, error.as_object_mut()) {
            obj.extend(extra);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
