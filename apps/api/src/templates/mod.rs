// Template Registry
// Immutable catalog of legal templates, built once at startup and shared through AppState.
// Also owns the required-field validator that gates preview rendering and submission.

pub mod catalog;
pub mod handlers;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::binding::BoundData;

// ────────────────────────────────────────────────────────────────────────────
// Identifiers
// ────────────────────────────────────────────────────────────────────────────

/// Stable key for every template. The kebab-case string form is what clients send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateId {
    /// Baseline contract. Also the fallback when another renderer fails.
    ServiceAgreement,
    ExtensionAddendum,
    CompensationAddendum,
    ScopeChangeAddendum,
    TerminationAgreement,
    ConfidentialityAddendum,
}

impl TemplateId {
    pub const ALL: [TemplateId; 6] = [
        TemplateId::ServiceAgreement,
        TemplateId::ExtensionAddendum,
        TemplateId::CompensationAddendum,
        TemplateId::ScopeChangeAddendum,
        TemplateId::TerminationAgreement,
        TemplateId::ConfidentialityAddendum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::ServiceAgreement => "service-agreement",
            TemplateId::ExtensionAddendum => "extension-addendum",
            TemplateId::CompensationAddendum => "compensation-addendum",
            TemplateId::ScopeChangeAddendum => "scope-change-addendum",
            TemplateId::TerminationAgreement => "termination-agreement",
            TemplateId::ConfidentialityAddendum => "confidentiality-addendum",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Unknown template: {0}")]
    Unknown(String),
}

impl FromStr for TemplateId {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| TemplateError::Unknown(s.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Template model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    /// A main contract, possibly countersigned by the company.
    Contract,
    /// A single-signer supplement to an existing contract.
    Annex,
}

/// Semantic type of a template variable. Drives display formatting in the binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    Text,
    Email,
    /// Grouped thousands, no decimals.
    Money,
    /// `Month D, YYYY`.
    Date,
    /// Ordinal form: `Month Dst, YYYY`.
    StartDate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: VariableKind,
    pub required: bool,
}

/// A parametrized legal-document pattern.
///
/// `defaults` are the hard defaults with the lowest binding precedence. `free_text_variable`
/// names the single "service description" style clause, and `default_free_text` is the
/// boilerplate paragraph rendered when it is blank.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: TemplateId,
    pub display_name: &'static str,
    pub description: &'static str,
    pub subject_pattern: &'static str,
    pub category: TemplateCategory,
    pub variables: Vec<VariableSpec>,
    pub defaults: BTreeMap<&'static str, String>,
    pub free_text_variable: &'static str,
    pub default_free_text: &'static str,
}

impl Template {
    pub fn required_variables(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.variables.iter().filter(|v| v.required).map(|v| v.name)
    }

    pub fn variable(&self, name: &str) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.variable(name).is_some() || self.defaults.contains_key(name)
    }

    pub fn kind_of(&self, name: &str) -> VariableKind {
        self.variable(name)
            .map(|v| v.kind)
            .unwrap_or(VariableKind::Text)
    }

    pub fn is_annex(&self) -> bool {
        self.category == TemplateCategory::Annex
    }
}

/// Company-level values bound into every template as hard defaults.
#[derive(Debug, Clone)]
pub struct CompanyProfile {
    pub name: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

/// Immutable catalog of templates, constructed once and passed by reference.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    /// Indexed by `TemplateId` discriminant, in `TemplateId::ALL` order.
    templates: [Template; 6],
}

impl TemplateRegistry {
    pub fn new(company: &CompanyProfile) -> Self {
        Self {
            templates: TemplateId::ALL.map(|id| catalog::template_for(id, company)),
        }
    }

    pub fn get(&self, id: TemplateId) -> &Template {
        &self.templates[id as usize]
    }

    pub fn lookup(&self, id: &str) -> Result<&Template, TemplateError> {
        let id: TemplateId = id.parse()?;
        Ok(self.get(id))
    }

    pub fn list(&self, category: Option<TemplateCategory>) -> Vec<&Template> {
        self.templates
            .iter()
            .filter(|t| category.map_or(true, |c| t.category == c))
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Required-field validation
// ────────────────────────────────────────────────────────────────────────────

/// Returns the required variables whose bound value is absent or blank after trimming.
///
/// Order follows the template's declaration order so UI messages are stable.
pub fn missing_fields(template: &Template, data: &BoundData) -> Vec<String> {
    template
        .required_variables()
        .filter(|name| data.is_blank(name))
        .map(str::to_string)
        .collect()
}
