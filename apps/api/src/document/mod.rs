// Document Renderer
// Pure (template, bound data) → DocumentTree. One renderer per template, dispatched through an
// exhaustive match; any construction failure falls back to the baseline agreement.

pub mod renderers;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::binding::BoundData;
use crate::templates::{Template, TemplateId, TemplateRegistry};

// ────────────────────────────────────────────────────────────────────────────
// Tree model
// ────────────────────────────────────────────────────────────────────────────

/// Renderer output. Built fresh per call and never patched afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentTree {
    /// The template that actually produced this tree (the baseline after a fallback).
    pub template_id: TemplateId,
    pub title: String,
    pub pages: Vec<Page>,
}

/// An explicit page. The layout engine may spill a page's content onto further pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub heading: Option<String>,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paragraph {
    pub align: Align,
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    pub text: String,
    pub bold: bool,
}

impl Paragraph {
    pub fn new() -> Self {
        Self {
            align: Align::Left,
            runs: Vec::new(),
        }
    }

    pub fn centered() -> Self {
        Self {
            align: Align::Center,
            runs: Vec::new(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.runs.push(Run {
            text: text.into(),
            bold: false,
        });
        self
    }

    pub fn bold(mut self, text: impl Into<String>) -> Self {
        self.runs.push(Run {
            text: text.into(),
            bold: true,
        });
        self
    }

    #[cfg(test)]
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Section {
    pub fn titled(heading: impl Into<String>) -> Self {
        Self {
            heading: Some(heading.into()),
            paragraphs: Vec::new(),
        }
    }

    pub fn untitled() -> Self {
        Self {
            heading: None,
            paragraphs: Vec::new(),
        }
    }

    pub fn paragraph(mut self, paragraph: Paragraph) -> Self {
        self.paragraphs.push(paragraph);
        self
    }
}

#[cfg(test)]
impl DocumentTree {
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.pages
            .iter()
            .flat_map(|p| &p.sections)
            .flat_map(|s| &s.paragraphs)
            .flat_map(|p| &p.runs)
    }

    /// Number of bold runs whose trimmed text is exactly `text`.
    pub fn bold_occurrences(&self, text: &str) -> usize {
        self.runs()
            .filter(|r| r.bold && r.text.trim() == text)
            .count()
    }

    /// All text in reading order, one line per paragraph or heading.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for section in self.pages.iter().flat_map(|p| &p.sections) {
            if let Some(h) = &section.heading {
                out.push_str(h);
                out.push('\n');
            }
            for p in &section.paragraphs {
                out.push_str(&p.plain_text());
                out.push('\n');
            }
        }
        out
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    /// The bound data was not produced for this template.
    #[error("Variable '{0}' is not bound for this template")]
    Unbound(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Dispatch
// ────────────────────────────────────────────────────────────────────────────

pub type RenderFn = fn(&Template, &BoundData) -> Result<DocumentTree, TreeError>;

pub fn renderer_for(id: TemplateId) -> RenderFn {
    match id {
        TemplateId::ServiceAgreement => renderers::service_agreement::render,
        TemplateId::ExtensionAddendum => renderers::extension_addendum::render,
        TemplateId::CompensationAddendum => renderers::compensation_addendum::render,
        TemplateId::ScopeChangeAddendum => renderers::scope_change_addendum::render,
        TemplateId::TerminationAgreement => renderers::termination_agreement::render,
        TemplateId::ConfidentialityAddendum => renderers::confidentiality_addendum::render,
    }
}

/// Renders `id` against `data`. Never fails: a renderer error yields the baseline agreement
/// rendered leniently, with placeholders for anything it cannot find.
pub fn render(registry: &TemplateRegistry, id: TemplateId, data: &BoundData) -> DocumentTree {
    let template = registry.get(id);
    match renderer_for(id)(template, data) {
        Ok(tree) => tree,
        Err(e) => {
            warn!(template = %id, error = %e, "Renderer failed, falling back to baseline agreement");
            renderers::service_agreement::render_lenient(
                registry.get(TemplateId::ServiceAgreement),
                data,
            )
        }
    }
}
