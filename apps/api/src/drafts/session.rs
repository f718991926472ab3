use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::binding::{bind, render_subject, BoundData, Overrides, SourceRecord};
use crate::templates::{missing_fields, TemplateId, TemplateRegistry};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSession {
    pub id: Uuid,
    pub template_id: TemplateId,
    pub record: SourceRecord,
    pub overrides: Overrides,
    /// Remote id of the contract an annex belongs to.
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What the form shows: bound values, the subject line and what is still missing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub id: Uuid,
    pub template_id: TemplateId,
    pub parent_id: Option<String>,
    pub subject: String,
    pub bound: BoundData,
    pub missing_fields: Vec<String>,
    pub overrides: Overrides,
    pub updated_at: DateTime<Utc>,
}

impl DraftSession {
    pub fn new(
        template_id: TemplateId,
        record: SourceRecord,
        overrides: Overrides,
        parent_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            template_id,
            record,
            overrides,
            parent_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn bound(&self, registry: &TemplateRegistry) -> BoundData {
        bind(registry.get(self.template_id), &self.record, &self.overrides)
    }

    pub fn view(&self, registry: &TemplateRegistry) -> DraftView {
        let template = registry.get(self.template_id);
        let bound = self.bound(registry);
        DraftView {
            id: self.id,
            template_id: self.template_id,
            parent_id: self.parent_id.clone(),
            subject: render_subject(template.subject_pattern, &bound),
            missing_fields: missing_fields(template, &bound),
            bound,
            overrides: self.overrides.clone(),
            updated_at: self.updated_at,
        }
    }

    /// Switches template without leaking the previous template's specific values.
    ///
    /// Drops the override of the previous free-text clause and of every variable the new
    /// template does not declare, so those fall back to the record or the new template's own
    /// defaults. Overrides shared by both templates (identity fields) survive.
    pub fn select_template(&mut self, registry: &TemplateRegistry, template_id: TemplateId) {
        if template_id == self.template_id {
            return;
        }
        let previous = registry.get(self.template_id);
        let next = registry.get(template_id);

        let before = self.overrides.len();
        self.overrides.retain(|name, _| {
            name != previous.free_text_variable && !(previous.declares(name) && !next.declares(name))
        });
        debug!(
            draft_id = %self.id,
            from = %previous.id,
            to = %next.id,
            dropped = before - self.overrides.len(),
            "Template switched"
        );

        self.template_id = template_id;
        self.updated_at = Utc::now();
    }

    /// Merges edits into the overrides. Empty strings are kept: an explicit blank wins.
    pub fn set_fields(&mut self, fields: Overrides) {
        self.overrides.extend(fields);
        self.updated_at = Utc::now();
    }
}

/// In-memory draft sessions. Lost on restart.
#[derive(Debug, Clone, Default)]
pub struct DraftStore {
    sessions: Arc<Mutex<HashMap<Uuid, DraftSession>>>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: DraftSession) -> DraftSession {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.insert(session.id, session.clone());
        session
    }

    pub fn get(&self, id: Uuid) -> Option<DraftSession> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.get(&id).cloned()
    }

    /// Applies `f` to the session and returns the updated copy.
    pub fn update(&self, id: Uuid, f: impl FnOnce(&mut DraftSession)) -> Option<DraftSession> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let session = sessions.get_mut(&id)?;
        f(session);
        Some(session.clone())
    }

    pub fn remove(&self, id: Uuid) -> Option<DraftSession> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.remove(&id)
    }
}
