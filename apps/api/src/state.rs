use std::sync::Arc;

use crate::drafts::DraftStore;
use crate::render::{PreviewStore, RenderBackend};
use crate::signing::SignatureWorkflow;
use crate::templates::TemplateRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup from the configured company profile.
    pub templates: Arc<TemplateRegistry>,
    pub drafts: DraftStore,
    pub previews: PreviewStore,
    /// Pluggable PDF backend. Default: PdfRenderer.
    pub renderer: Arc<dyn RenderBackend>,
    pub workflow: Arc<SignatureWorkflow>,
}
