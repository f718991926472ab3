pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::drafts::handlers as drafts;
use crate::signing::handlers as signing;
use crate::state::AppState;
use crate::templates::handlers as templates;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Template registry
        .route("/api/v1/templates", get(templates::handle_list_templates))
        .route("/api/v1/templates/:id", get(templates::handle_get_template))
        // Field planner
        .route("/api/v1/fields/plan", post(signing::handle_plan_fields))
        // Drafts
        .route("/api/v1/drafts", post(drafts::handle_create_draft))
        .route(
            "/api/v1/drafts/:id",
            get(drafts::handle_get_draft).delete(drafts::handle_delete_draft),
        )
        .route(
            "/api/v1/drafts/:id/template",
            put(drafts::handle_select_template),
        )
        .route("/api/v1/drafts/:id/fields", patch(drafts::handle_set_fields))
        .route(
            "/api/v1/drafts/:id/document",
            get(drafts::handle_get_document),
        )
        .route(
            "/api/v1/drafts/:id/preview",
            post(drafts::handle_render_preview).get(drafts::handle_get_preview),
        )
        // Signature workflow
        .route("/api/v1/drafts/:id/submit", post(signing::handle_submit))
        .with_state(state)
}
