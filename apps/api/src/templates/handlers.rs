use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::state::AppState;
use crate::templates::{Template, TemplateCategory};

#[derive(Deserialize)]
pub struct CategoryQuery {
    pub category: Option<TemplateCategory>,
}

/// GET /api/v1/templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
    Query(params): Query<CategoryQuery>,
) -> Json<Vec<Template>> {
    Json(
        state
            .templates
            .list(params.category)
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// GET /api/v1/templates/:id
pub async fn handle_get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Template>, AppError> {
    Ok(Json(state.templates.lookup(&id)?.clone()))
}
