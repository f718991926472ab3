//! Signature Workflow Orchestrator.
//!
//! Drives a remote document through CREATED → SOURCE_ATTACHED → RECIPIENTS_ASSIGNED →
//! FIELDS_PLACED → SENT. Steps run strictly in order, each awaited before the next, with no
//! retries and no rollback: a failure halts the run and leaves the remote document wherever it
//! got to. Required-field validation happens before any network call.
//!
//! Re-entrant submissions for the same key are ignored while one is in flight.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::binding::{render_subject, BoundData};
use crate::document;
use crate::render::{RenderBackend, RenderError};
use crate::signing::client::CreateDocument;
use crate::signing::fields::plan_for_recipients;
use crate::signing::{
    storage_key, DocumentKind, DocumentStorage, EsignError, EsignService, FieldDescriptor,
    NewRecipient, Recipient, RecipientRole, SignatureState, StorageError,
};
use crate::templates::{missing_fields, TemplateId, TemplateRegistry};

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Remote call the workflow was making when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Create,
    Render,
    Upload,
    AttachSource,
    AddRecipients,
    AddFields,
    Send,
}

/// Coarse failure class shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Caught locally; fixable by editing the draft.
    Validation,
    /// The render backend, the store or the signing service failed mid-run.
    Transport,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Missing required fields: {}", missing.join(", "))]
    Validation { missing: Vec<String> },

    #[error("Signing service returned no document id")]
    InvalidDocumentResponse,

    #[error("No {role:?} recipient was echoed for document {document_id}")]
    RecipientMissing {
        document_id: String,
        role: RecipientRole,
    },

    #[error("Rendering failed for document {document_id}: {source}")]
    Render {
        document_id: String,
        #[source]
        source: RenderError,
    },

    #[error("Upload failed for document {document_id}: {source}")]
    Storage {
        document_id: String,
        #[source]
        source: StorageError,
    },

    #[error("Signing service failed at {step:?}: {source}")]
    Esign {
        step: Step,
        document_id: Option<String>,
        #[source]
        source: EsignError,
    },
}

impl WorkflowError {
    pub fn kind(&self) -> FailureKind {
        match self {
            WorkflowError::Validation { .. } => FailureKind::Validation,
            _ => FailureKind::Transport,
        }
    }

    pub fn step(&self) -> Option<Step> {
        match self {
            WorkflowError::Validation { .. } => None,
            WorkflowError::InvalidDocumentResponse => Some(Step::Create),
            WorkflowError::RecipientMissing { .. } => Some(Step::AddRecipients),
            WorkflowError::Render { .. } => Some(Step::Render),
            WorkflowError::Storage { .. } => Some(Step::Upload),
            WorkflowError::Esign { step, .. } => Some(*step),
        }
    }

    /// The remote document left behind by a partial run, if one was created.
    pub fn document_id(&self) -> Option<&str> {
        match self {
            WorkflowError::Validation { .. } | WorkflowError::InvalidDocumentResponse => None,
            WorkflowError::RecipientMissing { document_id, .. }
            | WorkflowError::Render { document_id, .. }
            | WorkflowError::Storage { document_id, .. } => Some(document_id),
            WorkflowError::Esign { document_id, .. } => document_id.as_deref(),
        }
    }

    /// Human-readable message for the submission path.
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::Validation { missing } => format!(
                "Complete the required fields before sending: {}.",
                missing.join(", ")
            ),
            WorkflowError::InvalidDocumentResponse => {
                "The signing service returned an invalid document response. Nothing was sent."
                    .to_string()
            }
            WorkflowError::RecipientMissing { .. } => {
                "The signing service did not register the signer, so no signature fields could \
                 be placed. The document was not sent."
                    .to_string()
            }
            WorkflowError::Render { .. } => {
                "The document could not be rendered to PDF. The document was not sent.".to_string()
            }
            WorkflowError::Storage { .. } => {
                "The rendered document could not be uploaded. The document was not sent."
                    .to_string()
            }
            WorkflowError::Esign { .. } => {
                "A network error occurred while talking to the signing service. The document was \
                 not sent."
                    .to_string()
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-flight guard
// ────────────────────────────────────────────────────────────────────────────

/// Set of submission keys currently running. Scoped to this process.
#[derive(Debug, Clone, Default)]
struct InFlight {
    keys: Arc<Mutex<HashSet<Uuid>>>,
}

impl InFlight {
    fn try_acquire(&self, key: Uuid) -> Option<InFlightGuard> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        keys.insert(key).then(|| InFlightGuard {
            keys: Arc::clone(&self.keys),
            key,
        })
    }
}

/// Releases its key on drop, whichever way the run exits.
struct InFlightGuard {
    keys: Arc<Mutex<HashSet<Uuid>>>,
    key: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

/// Countersigner added to main contracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanySigner {
    pub email: String,
    pub name: String,
}

pub struct SubmitRequest<'a> {
    /// Guard key: one run at a time per key.
    pub key: Uuid,
    pub template_id: TemplateId,
    pub data: &'a BoundData,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub document_id: String,
    pub state: SignatureState,
    pub title: String,
    pub source_url: String,
    pub recipients: Vec<Recipient>,
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Sent(SubmitReceipt),
    /// Another submission for the same key was already running.
    Ignored,
}

pub struct SignatureWorkflow {
    esign: Arc<dyn EsignService>,
    storage: Arc<dyn DocumentStorage>,
    renderer: Arc<dyn RenderBackend>,
    registry: Arc<TemplateRegistry>,
    company_signer: Option<CompanySigner>,
    in_flight: InFlight,
}

impl SignatureWorkflow {
    pub fn new(
        esign: Arc<dyn EsignService>,
        storage: Arc<dyn DocumentStorage>,
        renderer: Arc<dyn RenderBackend>,
        registry: Arc<TemplateRegistry>,
        company_signer: Option<CompanySigner>,
    ) -> Self {
        Self {
            esign,
            storage,
            renderer,
            registry,
            company_signer,
            in_flight: InFlight::default(),
        }
    }

    pub async fn submit(&self, req: SubmitRequest<'_>) -> Result<SubmitOutcome, WorkflowError> {
        let Some(_guard) = self.in_flight.try_acquire(req.key) else {
            info!(key = %req.key, "Submission already in flight, ignoring");
            return Ok(SubmitOutcome::Ignored);
        };

        let template = self.registry.get(req.template_id);
        let missing = missing_fields(template, req.data);
        if !missing.is_empty() {
            warn!(key = %req.key, template = %template.id, ?missing, "Submission blocked by missing fields");
            return Err(WorkflowError::Validation { missing });
        }

        let kind = DocumentKind::from(template.category);
        let title = render_subject(template.subject_pattern, req.data);

        let result = self.run(&req, kind, title).await;
        if let Err(e) = &result {
            error!(
                key = %req.key,
                step = ?e.step(),
                document_id = e.document_id().unwrap_or("-"),
                error = %e,
                "Signature workflow aborted"
            );
        }
        result.map(SubmitOutcome::Sent)
    }

    async fn run(
        &self,
        req: &SubmitRequest<'_>,
        kind: DocumentKind,
        title: String,
    ) -> Result<SubmitReceipt, WorkflowError> {
        let template = self.registry.get(req.template_id);

        // 1. Create
        info!(template = %template.id, %title, "Creating signature document");
        let document_id = self
            .esign
            .create_document(&CreateDocument {
                title: title.clone(),
                description: template.description.to_string(),
                parent_id: req.parent_id.clone(),
                is_annex: template.is_annex(),
            })
            .await
            .map_err(|source| WorkflowError::Esign {
                step: Step::Create,
                document_id: None,
                source,
            })?
            .ok_or(WorkflowError::InvalidDocumentResponse)?;
        info!(document_id = %document_id, state = %SignatureState::Created, "Document created");

        // 2. Render, upload, attach
        let tree = document::render(&self.registry, template.id, req.data);
        let pdf = self
            .renderer
            .render_pdf(&tree)
            .await
            .map_err(|source| WorkflowError::Render {
                document_id: document_id.clone(),
                source,
            })?;
        let key = storage_key(&document_id);
        let source_url = self
            .storage
            .put_pdf(&key, pdf)
            .await
            .map_err(|source| WorkflowError::Storage {
                document_id: document_id.clone(),
                source,
            })?;
        self.esign
            .attach_source(&document_id, &source_url)
            .await
            .map_err(|source| esign_failure(Step::AttachSource, &document_id, source))?;
        info!(document_id = %document_id, state = %SignatureState::SourceAttached, %source_url, "Source attached");

        // 3. Recipients
        let requested = self.recipients_for(kind, req.data);
        let echoed = self
            .esign
            .add_recipients(&document_id, &requested)
            .await
            .map_err(|source| esign_failure(Step::AddRecipients, &document_id, source))?;
        info!(
            document_id = %document_id,
            state = %SignatureState::RecipientsAssigned,
            count = echoed.len(),
            "Recipients assigned"
        );

        // 4. Fields, targeted at the echoed ids only
        let mut resolved = Vec::with_capacity(requested.len());
        for wanted in &requested {
            let recipient = echoed
                .iter()
                .find(|r| r.rol == wanted.rol)
                .ok_or_else(|| WorkflowError::RecipientMissing {
                    document_id: document_id.clone(),
                    role: wanted.rol,
                })?;
            resolved.push(recipient.clone());
        }
        let fields = plan_for_recipients(&resolved, kind);
        self.esign
            .add_fields(&document_id, &fields)
            .await
            .map_err(|source| esign_failure(Step::AddFields, &document_id, source))?;
        info!(
            document_id = %document_id,
            state = %SignatureState::FieldsPlaced,
            count = fields.len(),
            "Fields placed"
        );

        // 5. Send
        self.esign
            .send_document(&document_id)
            .await
            .map_err(|source| esign_failure(Step::Send, &document_id, source))?;
        info!(document_id = %document_id, state = %SignatureState::Sent, "Document sent for signature");

        Ok(SubmitReceipt {
            document_id,
            state: SignatureState::Sent,
            title,
            source_url,
            recipients: resolved,
            fields,
        })
    }

    fn recipients_for(&self, kind: DocumentKind, data: &BoundData) -> Vec<NewRecipient> {
        let mut recipients = vec![NewRecipient {
            email: data.raw("correoElectronico").unwrap_or_default().trim().to_string(),
            nombre: data.raw("nombreCompleto").unwrap_or_default().trim().to_string(),
            orden: 1,
            rol: RecipientRole::Candidate,
        }];
        if let (DocumentKind::Contract, Some(signer)) = (kind, &self.company_signer) {
            recipients.push(NewRecipient {
                email: signer.email.clone(),
                nombre: signer.name.clone(),
                orden: 2,
                rol: RecipientRole::Company,
            });
        }
        recipients
    }
}

fn esign_failure(step: Step, document_id: &str, source: EsignError) -> WorkflowError {
    WorkflowError::Esign {
        step,
        document_id: Some(document_id.to_string()),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{bind, Overrides, SourceRecord};
    use crate::signing::fields::FieldKind;
    use crate::testing::{
        test_registry, EsignCall, FailingRenderer, MemoryStorage, RecordingEsign, StaticRenderer,
    };
    use serde_json::json;

    fn scenario_data(registry: &TemplateRegistry, id: TemplateId) -> BoundData {
        let record: SourceRecord = json!({
            "nombreCompleto": "Ana Chávez",
            "correoElectronico": "ana@x.com",
            "cedula": "123",
            "paisDocumento": "Colombia",
            "fechaInicioContratoOriginal": "January 1, 2024",
            "nuevoValorContrato": "1200",
            "descripcionServicios": "Backend development.",
            "signContractDate": "June 30, 2025",
            "fechaInicio": "06/01/2024",
            "valorMensual": "3500"
        })
        .as_object()
        .cloned()
        .unwrap_or_default();
        bind(registry.get(id), &record, &Overrides::new())
    }

    struct Harness {
        esign: Arc<RecordingEsign>,
        storage: Arc<MemoryStorage>,
        registry: Arc<TemplateRegistry>,
        workflow: SignatureWorkflow,
    }

    fn harness_with(
        esign: RecordingEsign,
        storage: MemoryStorage,
        renderer: Arc<dyn RenderBackend>,
        signer: Option<CompanySigner>,
    ) -> Harness {
        let esign = Arc::new(esign);
        let storage = Arc::new(storage);
        let registry = Arc::new(test_registry());
        let workflow = SignatureWorkflow::new(
            esign.clone(),
            storage.clone(),
            renderer,
            registry.clone(),
            signer,
        );
        Harness {
            esign,
            storage,
            registry,
            workflow,
        }
    }

    fn harness(esign: RecordingEsign) -> Harness {
        harness_with(esign, MemoryStorage::default(), Arc::new(StaticRenderer), None)
    }

    fn request(data: &BoundData, id: TemplateId) -> SubmitRequest<'_> {
        SubmitRequest {
            key: Uuid::new_v4(),
            template_id: id,
            data,
            parent_id: Some("contract-9".into()),
        }
    }

    #[tokio::test]
    async fn test_annex_runs_steps_in_order() {
        let h = harness(RecordingEsign::default());
        let data = scenario_data(&h.registry, TemplateId::ExtensionAddendum);

        let outcome = h
            .workflow
            .submit(request(&data, TemplateId::ExtensionAddendum))
            .await
            .expect("workflow succeeds");
        let SubmitOutcome::Sent(receipt) = outcome else {
            panic!("expected a sent receipt");
        };

        assert_eq!(
            h.esign.step_names(),
            vec!["create", "attach_source", "add_recipients", "add_fields", "send"]
        );
        assert_eq!(receipt.title, "Addendum for Extension - Ana Chávez");
        assert_eq!(receipt.state, SignatureState::Sent);

        let calls = h.esign.calls();
        match &calls[0] {
            EsignCall::Create(req) => {
                assert!(req.is_annex);
                assert_eq!(req.parent_id.as_deref(), Some("contract-9"));
            }
            other => panic!("unexpected first call: {other:?}"),
        }
        match &calls[2] {
            EsignCall::AddRecipients { recipients, .. } => {
                assert_eq!(recipients.len(), 1);
                assert_eq!(recipients[0].email, "ana@x.com");
                assert_eq!(recipients[0].nombre, "Ana Chávez");
                assert_eq!(recipients[0].orden, 1);
                assert_eq!(recipients[0].rol, RecipientRole::Candidate);
            }
            other => panic!("unexpected third call: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fields_target_echoed_recipient_id() {
        let h = harness(RecordingEsign::default());
        let data = scenario_data(&h.registry, TemplateId::ExtensionAddendum);
        h.workflow
            .submit(request(&data, TemplateId::ExtensionAddendum))
            .await
            .expect("workflow succeeds");

        let fields = h.esign.placed_fields();
        assert_eq!(fields.len(), 4);
        assert_eq!(
            fields.iter().filter(|f| f.kind == FieldKind::Signature).count(),
            1
        );
        let echoed_id = RecordingEsign::echoed_id(RecipientRole::Candidate);
        assert!(fields.iter().all(|f| f.recipient_id == echoed_id));
    }

    #[tokio::test]
    async fn test_upload_uses_document_key_and_attaches_its_url() {
        let h = harness(RecordingEsign::default());
        let data = scenario_data(&h.registry, TemplateId::ExtensionAddendum);
        h.workflow
            .submit(request(&data, TemplateId::ExtensionAddendum))
            .await
            .expect("workflow succeeds");

        let key = storage_key(RecordingEsign::DOCUMENT_ID);
        assert!(h.storage.contains(&key));
        match &h.esign.calls()[1] {
            EsignCall::AttachSource { url, .. } => {
                assert_eq!(url, &MemoryStorage::url_for(&key))
            }
            other => panic!("unexpected second call: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_fields_never_reach_the_network() {
        let h = harness(RecordingEsign::default());
        let mut record = SourceRecord::new();
        record.insert("nombreCompleto".into(), json!("Ana"));
        let data = bind(
            h.registry.get(TemplateId::ExtensionAddendum),
            &record,
            &Overrides::new(),
        );

        let err = h
            .workflow
            .submit(request(&data, TemplateId::ExtensionAddendum))
            .await
            .expect_err("validation fails");
        assert_eq!(err.kind(), FailureKind::Validation);
        match &err {
            WorkflowError::Validation { missing } => {
                assert!(missing.contains(&"correoElectronico".to_string()));
                assert!(!missing.contains(&"nombreCompleto".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(h.esign.calls().is_empty());
    }

    #[tokio::test]
    async fn test_double_submit_runs_once() {
        let h = harness(RecordingEsign::default());
        let data = scenario_data(&h.registry, TemplateId::ExtensionAddendum);
        let key = Uuid::new_v4();
        let make = || SubmitRequest {
            key,
            template_id: TemplateId::ExtensionAddendum,
            data: &data,
            parent_id: None,
        };

        let (first, second) = tokio::join!(h.workflow.submit(make()), h.workflow.submit(make()));
        let outcomes = [first.expect("first ok"), second.expect("second ok")];
        let sent = outcomes
            .iter()
            .filter(|o| matches!(o, SubmitOutcome::Sent(_)))
            .count();
        let ignored = outcomes
            .iter()
            .filter(|o| matches!(o, SubmitOutcome::Ignored))
            .count();
        assert_eq!((sent, ignored), (1, 1));
        assert_eq!(h.esign.count_of("create"), 1);
        assert_eq!(h.esign.count_of("send"), 1);

        // The guard is released once the first run finishes.
        let again = h.workflow.submit(make()).await.expect("third ok");
        assert!(matches!(again, SubmitOutcome::Sent(_)));
    }

    #[tokio::test]
    async fn test_missing_document_id_is_invalid_response() {
        let h = harness(RecordingEsign {
            omit_document_id: true,
            ..Default::default()
        });
        let data = scenario_data(&h.registry, TemplateId::ExtensionAddendum);
        let err = h
            .workflow
            .submit(request(&data, TemplateId::ExtensionAddendum))
            .await
            .expect_err("no id");
        assert!(matches!(err, WorkflowError::InvalidDocumentResponse));
        assert_eq!(err.kind(), FailureKind::Transport);
        assert_eq!(h.esign.step_names(), vec!["create"]);
        assert!(h.storage.is_empty());
    }

    #[tokio::test]
    async fn test_missing_candidate_aborts_before_fields() {
        let h = harness(RecordingEsign {
            omit_candidate: true,
            ..Default::default()
        });
        let data = scenario_data(&h.registry, TemplateId::ExtensionAddendum);
        let err = h
            .workflow
            .submit(request(&data, TemplateId::ExtensionAddendum))
            .await
            .expect_err("no candidate");
        assert!(matches!(
            err,
            WorkflowError::RecipientMissing {
                role: RecipientRole::Candidate,
                ..
            }
        ));
        assert_eq!(err.document_id(), Some(RecordingEsign::DOCUMENT_ID));
        assert_eq!(
            h.esign.step_names(),
            vec!["create", "attach_source", "add_recipients"]
        );
    }

    #[tokio::test]
    async fn test_failure_at_each_step_halts_the_run() {
        let steps = ["create", "attach_source", "add_recipients", "add_fields", "send"];
        for (i, failing) in steps.iter().enumerate() {
            let h = harness(RecordingEsign {
                fail_at: Some(*failing),
                ..Default::default()
            });
            let data = scenario_data(&h.registry, TemplateId::ExtensionAddendum);
            let err = h
                .workflow
                .submit(request(&data, TemplateId::ExtensionAddendum))
                .await
                .expect_err("step fails");
            assert_eq!(err.kind(), FailureKind::Transport, "{failing}");
            assert!(matches!(err, WorkflowError::Esign { .. }), "{failing}");
            assert!(!err.user_message().is_empty());
            assert_eq!(h.esign.step_names(), steps[..=i].to_vec(), "{failing}");
        }
    }

    #[tokio::test]
    async fn test_upload_failure_halts_before_attach() {
        let h = harness_with(
            RecordingEsign::default(),
            MemoryStorage {
                fail: true,
                ..Default::default()
            },
            Arc::new(StaticRenderer),
            None,
        );
        let data = scenario_data(&h.registry, TemplateId::ExtensionAddendum);
        let err = h
            .workflow
            .submit(request(&data, TemplateId::ExtensionAddendum))
            .await
            .expect_err("upload fails");
        assert!(matches!(err, WorkflowError::Storage { .. }));
        assert_eq!(h.esign.step_names(), vec!["create"]);
    }

    #[tokio::test]
    async fn test_render_failure_halts_before_upload() {
        let h = harness_with(
            RecordingEsign::default(),
            MemoryStorage::default(),
            Arc::new(FailingRenderer),
            None,
        );
        let data = scenario_data(&h.registry, TemplateId::ExtensionAddendum);
        let err = h
            .workflow
            .submit(request(&data, TemplateId::ExtensionAddendum))
            .await
            .expect_err("render fails");
        assert!(matches!(err, WorkflowError::Render { .. }));
        assert!(h.storage.is_empty());
        assert_eq!(h.esign.step_names(), vec!["create"]);
    }

    #[tokio::test]
    async fn test_contract_adds_company_countersigner() {
        let signer = CompanySigner {
            email: "legal@acme.com".into(),
            name: "Legal Team".into(),
        };
        let h = harness_with(
            RecordingEsign::default(),
            MemoryStorage::default(),
            Arc::new(StaticRenderer),
            Some(signer),
        );
        let data = scenario_data(&h.registry, TemplateId::ServiceAgreement);
        let outcome = h
            .workflow
            .submit(request(&data, TemplateId::ServiceAgreement))
            .await
            .expect("contract sends");
        let SubmitOutcome::Sent(receipt) = outcome else {
            panic!("expected a sent receipt");
        };
        assert_eq!(receipt.recipients.len(), 2);
        assert_eq!(receipt.fields.len(), 8);

        let company_id = RecordingEsign::echoed_id(RecipientRole::Company);
        let company_fields: Vec<_> = receipt
            .fields
            .iter()
            .filter(|f| f.recipient_id == company_id)
            .collect();
        assert_eq!(company_fields.len(), 4);
        assert!(company_fields.iter().all(|f| f.x == 0.58));

        match &h.esign.calls()[0] {
            EsignCall::Create(req) => assert!(!req.is_annex),
            other => panic!("unexpected first call: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_annex_never_adds_company_signer() {
        let h = harness_with(
            RecordingEsign::default(),
            MemoryStorage::default(),
            Arc::new(StaticRenderer),
            Some(CompanySigner {
                email: "legal@acme.com".into(),
                name: "Legal Team".into(),
            }),
        );
        let data = scenario_data(&h.registry, TemplateId::ExtensionAddendum);
        h.workflow
            .submit(request(&data, TemplateId::ExtensionAddendum))
            .await
            .expect("annex sends");
        match &h.esign.calls()[2] {
            EsignCall::AddRecipients { recipients, .. } => assert_eq!(recipients.len(), 1),
            other => panic!("unexpected third call: {other:?}"),
        }
    }
}
