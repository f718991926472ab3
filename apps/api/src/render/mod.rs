// Render Backend
// Turns a DocumentTree into a binary PDF. The backend sits behind a trait so the workflow and
// preview paths can be exercised with doubles; the default implementation writes PDF locally.

pub mod pdf;
pub mod preview;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::document::DocumentTree;

pub use pdf::PdfRenderer;
pub use preview::{PreviewError, PreviewHandle, PreviewStore};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Render task failed: {0}")]
    Task(String),
}

/// Produces the binary form of a document.
///
/// Carried in `AppState` and the signature workflow as `Arc<dyn RenderBackend>`.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    async fn render_pdf(&self, tree: &DocumentTree) -> Result<Bytes, RenderError>;

    /// MIME type of the blobs this backend produces.
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }
}
