use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::drafts::handlers::load;
use crate::errors::AppError;
use crate::signing::workflow::SubmitRequest;
use crate::signing::{plan_fields, DocumentKind, FieldDescriptor, RecipientRole, SubmitOutcome};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFieldsRequest {
    pub recipient_id: String,
    #[serde(default = "default_role")]
    pub role: RecipientRole,
    pub document_kind: DocumentKind,
}

fn default_role() -> RecipientRole {
    RecipientRole::Candidate
}

/// POST /api/v1/fields/plan
pub async fn handle_plan_fields(
    Json(req): Json<PlanFieldsRequest>,
) -> Result<Json<Vec<FieldDescriptor>>, AppError> {
    if req.recipient_id.trim().is_empty() {
        return Err(AppError::Validation(
            "recipientId must be the id assigned by the signing service".to_string(),
        ));
    }
    Ok(Json(plan_fields(
        &req.recipient_id,
        req.role,
        req.document_kind,
    )))
}

/// POST /api/v1/drafts/:id/submit
///
/// The draft id is the in-flight key, so a double submit of one draft runs once.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let draft = load(&state, id)?;
    let bound = draft.bound(&state.templates);

    let outcome = state
        .workflow
        .submit(SubmitRequest {
            key: id,
            template_id: draft.template_id,
            data: &bound,
            parent_id: draft.parent_id.clone(),
        })
        .await?;

    Ok(match outcome {
        SubmitOutcome::Sent(receipt) => (
            StatusCode::OK,
            Json(json!({ "status": "sent", "receipt": receipt })),
        ),
        SubmitOutcome::Ignored => (
            StatusCode::ACCEPTED,
            Json(json!({
                "status": "ignored",
                "message": "A submission for this draft is already in progress"
            })),
        ),
    })
}
