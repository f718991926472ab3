//! Test doubles for the collaborator seams: signing service, storage and render backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::Config;
use crate::document::DocumentTree;
use crate::drafts::DraftStore;
use crate::layout::default_page_config;
use crate::render::{PdfRenderer, PreviewStore, RenderBackend, RenderError};
use crate::signing::client::CreateDocument;
use crate::signing::{
    DocumentStorage, EsignError, EsignService, FieldDescriptor, NewRecipient, Recipient,
    RecipientRole, SignatureWorkflow, StorageError,
};
use crate::state::AppState;
use crate::templates::{CompanyProfile, TemplateRegistry};

pub fn test_registry() -> TemplateRegistry {
    TemplateRegistry::new(&CompanyProfile {
        name: "Acme Staffing LLC".to_string(),
    })
}

pub fn test_config() -> Config {
    Config {
        esign_api_url: "http://esign.test".into(),
        esign_api_token: "token".into(),
        s3_bucket: "docs".into(),
        s3_endpoint: "http://s3.test".into(),
        s3_public_url: "https://storage.test".into(),
        aws_access_key_id: "key".into(),
        aws_secret_access_key: "secret".into(),
        company_name: "Acme Staffing LLC".into(),
        company_signer_email: None,
        company_signer_name: None,
        port: 0,
        rust_log: "debug".into(),
    }
}

pub fn test_state(esign: Arc<RecordingEsign>, storage: Arc<MemoryStorage>) -> AppState {
    let config = test_config();
    let templates = Arc::new(test_registry());
    let renderer: Arc<dyn RenderBackend> = Arc::new(PdfRenderer::new(default_page_config()));
    let workflow = SignatureWorkflow::new(
        esign,
        storage,
        renderer.clone(),
        templates.clone(),
        config.company_signer(),
    );
    AppState {
        templates,
        drafts: DraftStore::new(),
        previews: PreviewStore::new(),
        renderer,
        workflow: Arc::new(workflow),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Signing service
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum EsignCall {
    Create(CreateDocument),
    AttachSource {
        document_id: String,
        url: String,
    },
    AddRecipients {
        document_id: String,
        recipients: Vec<NewRecipient>,
    },
    AddFields {
        document_id: String,
        fields: Vec<FieldDescriptor>,
    },
    Send {
        document_id: String,
    },
}

impl EsignCall {
    pub fn name(&self) -> &'static str {
        match self {
            EsignCall::Create(_) => "create",
            EsignCall::AttachSource { .. } => "attach_source",
            EsignCall::AddRecipients { .. } => "add_recipients",
            EsignCall::AddFields { .. } => "add_fields",
            EsignCall::Send { .. } => "send",
        }
    }
}

/// Records every call in order. Fails the call named by `fail_at` after recording it.
#[derive(Debug, Default)]
pub struct RecordingEsign {
    pub calls: Mutex<Vec<EsignCall>>,
    pub fail_at: Option<&'static str>,
    pub omit_document_id: bool,
    pub omit_candidate: bool,
}

impl RecordingEsign {
    pub const DOCUMENT_ID: &'static str = "doc-remote-1";

    /// Ids the fake service assigns; deliberately unrelated to anything sent.
    pub fn echoed_id(role: RecipientRole) -> String {
        match role {
            RecipientRole::Candidate => "rcp-501".to_string(),
            RecipientRole::Company => "rcp-502".to_string(),
        }
    }

    pub fn calls(&self) -> Vec<EsignCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.calls().iter().map(EsignCall::name).collect()
    }

    pub fn count_of(&self, name: &str) -> usize {
        self.step_names().iter().filter(|n| **n == name).count()
    }

    pub fn placed_fields(&self) -> Vec<FieldDescriptor> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                EsignCall::AddFields { fields, .. } => Some(fields),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn record(&self, call: EsignCall) -> Result<(), EsignError> {
        let name = call.name();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        if self.fail_at == Some(name) {
            return Err(EsignError::Api {
                status: 503,
                message: format!("{name} unavailable"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EsignService for RecordingEsign {
    async fn create_document(&self, req: &CreateDocument) -> Result<Option<String>, EsignError> {
        // Suspend once so concurrent submissions interleave.
        tokio::task::yield_now().await;
        self.record(EsignCall::Create(req.clone()))?;
        Ok((!self.omit_document_id).then(|| Self::DOCUMENT_ID.to_string()))
    }

    async fn attach_source(&self, document_id: &str, url: &str) -> Result<(), EsignError> {
        self.record(EsignCall::AttachSource {
            document_id: document_id.to_string(),
            url: url.to_string(),
        })
    }

    async fn add_recipients(
        &self,
        document_id: &str,
        recipients: &[NewRecipient],
    ) -> Result<Vec<Recipient>, EsignError> {
        self.record(EsignCall::AddRecipients {
            document_id: document_id.to_string(),
            recipients: recipients.to_vec(),
        })?;
        Ok(recipients
            .iter()
            .filter(|r| !(self.omit_candidate && r.rol == RecipientRole::Candidate))
            .map(|r| Recipient {
                id: Self::echoed_id(r.rol),
                email: Some(r.email.clone()),
                nombre: Some(r.nombre.clone()),
                orden: Some(r.orden),
                rol: r.rol,
            })
            .collect())
    }

    async fn add_fields(
        &self,
        document_id: &str,
        fields: &[FieldDescriptor],
    ) -> Result<(), EsignError> {
        self.record(EsignCall::AddFields {
            document_id: document_id.to_string(),
            fields: fields.to_vec(),
        })
    }

    async fn send_document(&self, document_id: &str) -> Result<(), EsignError> {
        self.record(EsignCall::Send {
            document_id: document_id.to_string(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Storage
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStorage {
    pub objects: Mutex<HashMap<String, Bytes>>,
    pub fail: bool,
}

impl MemoryStorage {
    pub fn url_for(key: &str) -> String {
        format!("https://storage.test/{key}")
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

#[async_trait]
impl DocumentStorage for MemoryStorage {
    async fn put_pdf(&self, key: &str, bytes: Bytes) -> Result<String, StorageError> {
        if self.fail {
            return Err(StorageError::Upload {
                key: key.to_string(),
                message: "bucket unavailable".to_string(),
            });
        }
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), bytes);
        Ok(Self::url_for(key))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Render backends
// ────────────────────────────────────────────────────────────────────────────

/// Returns a fixed blob without laying anything out.
pub struct StaticRenderer;

#[async_trait]
impl RenderBackend for StaticRenderer {
    async fn render_pdf(&self, _tree: &DocumentTree) -> Result<Bytes, RenderError> {
        Ok(Bytes::from_static(b"%PDF-1.5 static"))
    }
}

pub struct FailingRenderer;

#[async_trait]
impl RenderBackend for FailingRenderer {
    async fn render_pdf(&self, _tree: &DocumentTree) -> Result<Bytes, RenderError> {
        Err(RenderError::Pdf("backend unavailable".to_string()))
    }
}
