// Signature Workflow
// Field placement, the e-signature REST client, PDF storage and the orchestrator that drives a
// remote document from creation to dispatch.

pub mod client;
pub mod fields;
pub mod handlers;
pub mod storage;
pub mod workflow;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::templates::TemplateCategory;

pub use client::{EsignError, EsignService, HttpEsignClient};
pub use fields::{plan_fields, FieldDescriptor};
pub use storage::{storage_key, DocumentStorage, S3Storage, StorageError};
pub use workflow::{CompanySigner, SignatureWorkflow, SubmitOutcome, WorkflowError};

// ────────────────────────────────────────────────────────────────────────────
// Recipients
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipientRole {
    Candidate,
    Company,
}

/// Recipient as submitted to the signing service, before it assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipient {
    pub email: String,
    pub nombre: String,
    pub orden: u32,
    pub rol: RecipientRole,
}

/// Recipient as echoed back by the signing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(deserialize_with = "remote_id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub orden: Option<u32>,
    pub rol: RecipientRole,
}

/// Remote ids arrive either as strings or as bare numbers.
fn remote_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or numeric id, got {other}"
        ))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Documents
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Single signer: the candidate.
    Annex,
    /// Candidate plus, when configured, a company countersigner.
    Contract,
}

impl From<TemplateCategory> for DocumentKind {
    fn from(category: TemplateCategory) -> Self {
        match category {
            TemplateCategory::Annex => DocumentKind::Annex,
            TemplateCategory::Contract => DocumentKind::Contract,
        }
    }
}

/// Lifecycle of the remote signature document. Each transition is one network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureState {
    Created,
    SourceAttached,
    RecipientsAssigned,
    FieldsPlaced,
    Sent,
}

impl fmt::Display for SignatureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignatureState::Created => "CREATED",
            SignatureState::SourceAttached => "SOURCE_ATTACHED",
            SignatureState::RecipientsAssigned => "RECIPIENTS_ASSIGNED",
            SignatureState::FieldsPlaced => "FIELDS_PLACED",
            SignatureState::Sent => "SENT",
        })
    }
}
