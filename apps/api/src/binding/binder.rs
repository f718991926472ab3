//! Variable Binder: merges template defaults, the source record and user overrides.
//!
//! Precedence (lowest → highest): template hard defaults → source record → overrides.
//! Each bound value keeps its raw string (used by subject substitution and validation)
//! next to the display string renderers interpolate.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use crate::binding::format::{format_money, long_date, ordinal_date, PLACEHOLDER};
use crate::templates::{Template, VariableKind};

/// Contract/applicant record as received from the backend.
pub type SourceRecord = serde_json::Map<String, Value>;

/// User edits from the form, keyed by variable name.
pub type Overrides = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundValue {
    /// Plain string form, `None` when no source supplied a value.
    pub raw: Option<String>,
    /// Display-ready form; `PLACEHOLDER` when blank or unformattable.
    pub display: String,
}

impl BoundValue {
    pub fn is_blank(&self) -> bool {
        self.raw.as_deref().map_or(true, |r| r.trim().is_empty())
    }
}

/// Fully-resolved variable → value mapping for one template.
///
/// Never persisted: rebuilt from the source record and overrides on every render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BoundData {
    values: BTreeMap<String, BoundValue>,
}

impl BoundData {
    pub fn get(&self, name: &str) -> Option<&BoundValue> {
        self.values.get(name)
    }

    pub fn raw(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.raw.as_deref())
    }

    pub fn is_blank(&self, name: &str) -> bool {
        self.values.get(name).map_or(true, BoundValue::is_blank)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
impl BoundData {
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Display string, or the placeholder when the variable was never bound.
    pub fn display(&self, name: &str) -> &str {
        self.values
            .get(name)
            .map_or(PLACEHOLDER, |v| v.display.as_str())
    }
}

/// Binds a template against its data sources. Pure: identical inputs yield identical output.
///
/// Every declared variable is present in the result, bound or not, so renderers can tell
/// "blank" apart from "this data was built for another template".
pub fn bind(template: &Template, record: &SourceRecord, overrides: &Overrides) -> BoundData {
    let mut names: BTreeSet<&str> = template.variables.iter().map(|v| v.name).collect();
    names.extend(template.defaults.keys().copied());
    names.extend(record.keys().map(String::as_str));
    names.extend(overrides.keys().map(String::as_str));

    let values = names
        .into_iter()
        .map(|name| {
            let raw = overrides
                .get(name)
                .cloned()
                .or_else(|| record.get(name).and_then(value_to_string))
                .or_else(|| template.defaults.get(name).cloned());
            let display = display_value(template.kind_of(name), raw.as_deref());
            (name.to_string(), BoundValue { raw, display })
        })
        .collect();

    BoundData { values }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn display_value(kind: VariableKind, raw: Option<&str>) -> String {
    let raw = raw.filter(|r| !r.trim().is_empty());
    match kind {
        VariableKind::Money => format_money(raw),
        VariableKind::StartDate => ordinal_date(raw),
        VariableKind::Date => long_date(raw),
        VariableKind::Text | VariableKind::Email => raw
            .map(|r| r.trim().to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
    }
}

/// Replaces every `{{name}}` in `pattern` with the variable's plain string value.
///
/// Blank or unknown variables stay verbatim; subjects are display-only. The pattern is scanned
/// once left to right, so substituted values are never rescanned for placeholders.
pub fn render_subject(pattern: &str, data: &BoundData) -> String {
    let mut subject = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        let name = &rest[start + 2..start + 2 + len];
        let end = start + 2 + len + 2;
        subject.push_str(&rest[..start]);
        match data.get(name).filter(|v| !v.is_blank()) {
            Some(value) => subject.push_str(value.raw.as_deref().unwrap_or_default().trim()),
            None => subject.push_str(&rest[start..end]),
        }
        rest = &rest[end..];
    }
    subject.push_str(rest);
    subject
}
