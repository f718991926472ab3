/// E-signature REST client.
///
/// The signing service is opaque: only the call ordering and the payload shapes matter to the
/// workflow, so the workflow talks to `EsignService` and this module supplies the reqwest
/// implementation. Calls are never retried; the orchestrator owns failure policy.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::signing::{FieldDescriptor, NewRecipient, Recipient};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum EsignError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocument {
    pub title: String,
    pub description: String,
    pub parent_id: Option<String>,
    pub is_annex: bool,
}

#[derive(Debug, Deserialize)]
struct CreateDocumentResponse {
    #[serde(default)]
    document: Option<DocumentRef>,
}

#[derive(Debug, Deserialize)]
struct DocumentRef {
    #[serde(default)]
    id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RecipientsResponse {
    /// Decoded entry by entry: one recipient the workflow does not know about must not hide
    /// the ones it does.
    #[serde(default)]
    recipients: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct AttachSourceBody<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct RecipientsBody<'a> {
    recipients: &'a [NewRecipient],
}

#[derive(Debug, Serialize)]
struct FieldsBody<'a> {
    fields: &'a [FieldDescriptor],
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// The remote signing service, one method per workflow transition.
///
/// Carried in the workflow as `Arc<dyn EsignService>`.
#[async_trait]
pub trait EsignService: Send + Sync {
    /// Returns the remote document id, or `None` when the response carried none.
    async fn create_document(&self, req: &CreateDocument) -> Result<Option<String>, EsignError>;

    async fn attach_source(&self, document_id: &str, url: &str) -> Result<(), EsignError>;

    /// Returns the recipients echoed back with their remote ids.
    async fn add_recipients(
        &self,
        document_id: &str,
        recipients: &[NewRecipient],
    ) -> Result<Vec<Recipient>, EsignError>;

    async fn add_fields(
        &self,
        document_id: &str,
        fields: &[FieldDescriptor],
    ) -> Result<(), EsignError>;

    async fn send_document(&self, document_id: &str) -> Result<(), EsignError>;
}

#[derive(Clone)]
pub struct HttpEsignClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpEsignClient {
    pub fn new(base_url: &str, token: String) -> Result<Self, EsignError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn post<B: Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, EsignError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("E-sign API returned {} for {}: {}", status, path, body);
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|e| e.message.or(e.error))
                .unwrap_or(body);
            return Err(EsignError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("E-sign call succeeded: POST {}", path);
        Ok(response)
    }
}

#[async_trait]
impl EsignService for HttpEsignClient {
    async fn create_document(&self, req: &CreateDocument) -> Result<Option<String>, EsignError> {
        let response = self.post("/documents", Some(req)).await?;
        let text = response.text().await?;
        // A 2xx without a readable body is treated like one without an id.
        let Some(body) = serde_json::from_str::<CreateDocumentResponse>(&text).ok() else {
            warn!("Create document returned an unreadable body: {:?}", text);
            return Ok(None);
        };

        Ok(body
            .document
            .and_then(|d| d.id)
            .and_then(|id| match id {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }))
    }

    async fn attach_source(&self, document_id: &str, url: &str) -> Result<(), EsignError> {
        self.post(
            &format!("/documents/{document_id}/source"),
            Some(&AttachSourceBody { url }),
        )
        .await?;
        Ok(())
    }

    async fn add_recipients(
        &self,
        document_id: &str,
        recipients: &[NewRecipient],
    ) -> Result<Vec<Recipient>, EsignError> {
        let response = self
            .post(
                &format!("/documents/{document_id}/recipients"),
                Some(&RecipientsBody { recipients }),
            )
            .await?;
        let body: RecipientsResponse = response
            .json()
            .await
            .map_err(|e| EsignError::Decode(format!("add recipients: {e}")))?;
        Ok(body
            .recipients
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Recipient>(entry.clone()) {
                Ok(recipient) => Some(recipient),
                Err(e) => {
                    debug!("Skipping echoed recipient {}: {}", entry, e);
                    None
                }
            })
            .collect())
    }

    async fn add_fields(
        &self,
        document_id: &str,
        fields: &[FieldDescriptor],
    ) -> Result<(), EsignError> {
        self.post(
            &format!("/documents/{document_id}/fields"),
            Some(&FieldsBody { fields }),
        )
        .await?;
        Ok(())
    }

    async fn send_document(&self, document_id: &str) -> Result<(), EsignError> {
        self.post::<()>(&format!("/documents/{document_id}/send"), None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::binding::{bind, Overrides};
    use crate::signing::workflow::SubmitRequest;
    use crate::signing::{plan_fields, DocumentKind, RecipientRole, SignatureWorkflow, WorkflowError};
    use crate::templates::TemplateId;
    use crate::testing::{test_registry, MemoryStorage, StaticRenderer};
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> HttpEsignClient {
        HttpEsignClient::new(&format!("{}/", server.uri()), "secret".to_string())
            .expect("client builds")
    }

    fn create_request() -> CreateDocument {
        CreateDocument {
            title: "Addendum for Extension - Ana".into(),
            description: "Extends the term".into(),
            parent_id: Some("c-1".into()),
            is_annex: true,
        }
    }

    #[tokio::test]
    async fn test_create_document_sends_bearer_and_camel_case_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents"))
            .and(header("authorization", "Bearer secret"))
            .and(body_json(json!({
                "title": "Addendum for Extension - Ana",
                "description": "Extends the term",
                "parentId": "c-1",
                "isAnnex": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "document": { "id": "doc-77" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = client_for(&server)
            .await
            .create_document(&create_request())
            .await
            .expect("create succeeds");
        assert_eq!(id.as_deref(), Some("doc-77"));
    }

    #[tokio::test]
    async fn test_create_document_without_id_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "document": {} })))
            .mount(&server)
            .await;

        let id = client_for(&server)
            .await
            .create_document(&create_request())
            .await
            .expect("2xx is not an error");
        assert_eq!(id, None);
    }

    #[tokio::test]
    async fn test_non_success_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents/doc-1/send"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({ "message": "already sent" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .send_document("doc-1")
            .await
            .expect_err("409 fails");
        match err {
            EsignError::Api { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "already sent");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_recipients_returns_echoed_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents/doc-1/recipients"))
            .and(body_json(json!({
                "recipients": [
                    { "email": "ana@x.com", "nombre": "Ana", "orden": 1, "rol": "CANDIDATE" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "recipients": [ { "id": 501, "email": "ana@x.com", "rol": "CANDIDATE" } ]
            })))
            .mount(&server)
            .await;

        let echoed = client_for(&server)
            .await
            .add_recipients(
                "doc-1",
                &[NewRecipient {
                    email: "ana@x.com".into(),
                    nombre: "Ana".into(),
                    orden: 1,
                    rol: RecipientRole::Candidate,
                }],
            )
            .await
            .expect("recipients accepted");
        assert_eq!(echoed.len(), 1);
        assert_eq!(echoed[0].id, "501");
    }

    #[tokio::test]
    async fn test_attach_and_fields_post_expected_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents/doc-1/source"))
            .and(body_json(json!({ "url": "https://cdn/x.pdf" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        let fields = plan_fields("501", RecipientRole::Candidate, DocumentKind::Annex);
        Mock::given(method("POST"))
            .and(path("/documents/doc-1/fields"))
            .and(body_json(json!({ "fields": fields })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client
            .attach_source("doc-1", "https://cdn/x.pdf")
            .await
            .expect("attach succeeds");
        client
            .add_fields("doc-1", &fields)
            .await
            .expect("fields succeed");
    }

    #[tokio::test]
    async fn test_create_document_with_empty_body_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let id = client_for(&server)
            .await
            .create_document(&create_request())
            .await
            .expect("empty 2xx is not a transport error");
        assert_eq!(id, None);
    }

    #[tokio::test]
    async fn test_add_recipients_skips_unknown_roles() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents/doc-1/recipients"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "recipients": [
                    { "id": 501, "rol": "CANDIDATE" },
                    { "id": 7, "rol": "VIEWER" },
                    { "id": "", "rol": "COMPANY" }
                ]
            })))
            .mount(&server)
            .await;

        let echoed = client_for(&server)
            .await
            .add_recipients("doc-1", &[])
            .await
            .expect("known recipients survive");
        assert_eq!(echoed.len(), 1);
        assert_eq!(echoed[0].id, "501");
        assert_eq!(echoed[0].rol, RecipientRole::Candidate);
    }

    async fn submit_against(server: &MockServer) -> Result<(), WorkflowError> {
        let registry = Arc::new(test_registry());
        let record = json!({
            "nombreCompleto": "Ana Chávez",
            "correoElectronico": "ana@x.com",
            "cedula": "123",
            "paisDocumento": "Colombia",
            "fechaInicioContratoOriginal": "January 1, 2024",
            "nuevoValorContrato": "1200",
            "signContractDate": "June 30, 2025"
        })
        .as_object()
        .cloned()
        .unwrap_or_default();
        let data = bind(
            registry.get(TemplateId::ExtensionAddendum),
            &record,
            &Overrides::new(),
        );
        let workflow = SignatureWorkflow::new(
            Arc::new(client_for(server).await),
            Arc::new(MemoryStorage::default()),
            Arc::new(StaticRenderer),
            registry,
            None,
        );
        workflow
            .submit(SubmitRequest {
                key: Uuid::new_v4(),
                template_id: TemplateId::ExtensionAddendum,
                data: &data,
                parent_id: None,
            })
            .await
            .map(|_| ())
    }

    #[tokio::test]
    async fn test_workflow_reports_empty_create_as_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let err = submit_against(&server).await.expect_err("no id comes back");
        assert!(matches!(err, WorkflowError::InvalidDocumentResponse));
    }

    #[tokio::test]
    async fn test_workflow_sends_despite_extra_echoed_role() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "document": { "id": "doc-1" } })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/documents/doc-1/source"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/documents/doc-1/recipients"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "recipients": [
                    { "id": 501, "rol": "CANDIDATE" },
                    { "id": 7, "rol": "VIEWER" }
                ]
            })))
            .mount(&server)
            .await;
        let fields = plan_fields("501", RecipientRole::Candidate, DocumentKind::Annex);
        Mock::given(method("POST"))
            .and(path("/documents/doc-1/fields"))
            .and(body_json(json!({ "fields": fields })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/documents/doc-1/send"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        submit_against(&server).await.expect("candidate resolved, run completes");
    }
}
