use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::binding::{Overrides, SourceRecord};
use crate::document::{self, DocumentTree};
use crate::drafts::{DraftSession, DraftView};
use crate::errors::AppError;
use crate::render::PreviewHandle;
use crate::state::AppState;
use crate::templates::{missing_fields, TemplateId};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDraftRequest {
    pub template_id: String,
    #[serde(default)]
    pub record: SourceRecord,
    #[serde(default)]
    pub overrides: Overrides,
    pub parent_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectTemplateRequest {
    pub template_id: String,
}

#[derive(Deserialize)]
pub struct SetFieldsRequest {
    pub fields: Overrides,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Draft {id} does not exist"))
}

pub(crate) fn load(state: &AppState, id: Uuid) -> Result<DraftSession, AppError> {
    state.drafts.get(id).ok_or_else(|| not_found(id))
}

/// POST /api/v1/drafts
pub async fn handle_create_draft(
    State(state): State<AppState>,
    Json(req): Json<CreateDraftRequest>,
) -> Result<(StatusCode, Json<DraftView>), AppError> {
    let template_id: TemplateId = req.template_id.parse()?;
    let draft = state.drafts.insert(DraftSession::new(
        template_id,
        req.record,
        req.overrides,
        req.parent_id,
    ));
    state.previews.open(draft.id);
    info!(draft_id = %draft.id, template = %template_id, "Draft created");
    Ok((StatusCode::CREATED, Json(draft.view(&state.templates))))
}

/// GET /api/v1/drafts/:id
pub async fn handle_get_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DraftView>, AppError> {
    Ok(Json(load(&state, id)?.view(&state.templates)))
}

/// DELETE /api/v1/drafts/:id
pub async fn handle_delete_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    // Released before the existence check so a slot never outlives its draft.
    state.previews.release(id);
    state.drafts.remove(id).ok_or_else(|| not_found(id))?;
    info!(draft_id = %id, "Draft deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/drafts/:id/template
pub async fn handle_select_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectTemplateRequest>,
) -> Result<Json<DraftView>, AppError> {
    let template_id: TemplateId = req.template_id.parse()?;
    let draft = state
        .drafts
        .update(id, |d| d.select_template(&state.templates, template_id))
        .ok_or_else(|| not_found(id))?;
    Ok(Json(draft.view(&state.templates)))
}

/// PATCH /api/v1/drafts/:id/fields
pub async fn handle_set_fields(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetFieldsRequest>,
) -> Result<Json<DraftView>, AppError> {
    let draft = state
        .drafts
        .update(id, |d| d.set_fields(req.fields))
        .ok_or_else(|| not_found(id))?;
    Ok(Json(draft.view(&state.templates)))
}

/// GET /api/v1/drafts/:id/document
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentTree>, AppError> {
    let draft = load(&state, id)?;
    let bound = draft.bound(&state.templates);
    Ok(Json(document::render(&state.templates, draft.template_id, &bound)))
}

fn pdf_response(state: &AppState, handle: PreviewHandle) -> Response {
    (
        [
            (header::CONTENT_TYPE, state.renderer.content_type().to_string()),
            (
                header::HeaderName::from_static("x-preview-generation"),
                handle.generation.to_string(),
            ),
        ],
        handle.bytes,
    )
        .into_response()
}

/// POST /api/v1/drafts/:id/preview
///
/// Renders a fresh preview. A newer request for the same draft supersedes this one.
pub async fn handle_render_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let draft = load(&state, id)?;
    let template = state.templates.get(draft.template_id);
    let bound = draft.bound(&state.templates);

    let missing = missing_fields(template, &bound);
    if !missing.is_empty() {
        return Err(AppError::PreviewIncomplete(missing));
    }

    let ticket = state.previews.begin(id)?;
    let tree = document::render(&state.templates, draft.template_id, &bound);
    let bytes = state.renderer.render_pdf(&tree).await?;
    let handle = state.previews.complete(ticket, bytes)?;
    Ok(pdf_response(&state, handle))
}

/// GET /api/v1/drafts/:id/preview
pub async fn handle_get_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    load(&state, id)?;
    let handle = state
        .previews
        .latest(id)
        .ok_or_else(|| AppError::NotFound(format!("No preview rendered for draft {id}")))?;
    Ok(pdf_response(&state, handle))
}
