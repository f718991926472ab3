//! Clause builders shared by every legal template.

use crate::binding::format::{day_of, month_of, year_of, PLACEHOLDER};
use crate::binding::BoundData;
use crate::document::{Paragraph, Section, TreeError};
use crate::templates::Template;

/// Field accessor used by renderers.
///
/// Strict lookups fail on variables the data was never bound with, which is what sends a
/// mismatched render down the fallback path. Lenient lookups answer with the placeholder.
pub struct Fields<'a> {
    data: &'a BoundData,
    strict: bool,
}

impl<'a> Fields<'a> {
    pub fn strict(data: &'a BoundData) -> Self {
        Self { data, strict: true }
    }

    pub fn lenient(data: &'a BoundData) -> Self {
        Self {
            data,
            strict: false,
        }
    }

    pub fn display(&self, name: &str) -> Result<&'a str, TreeError> {
        match self.data.get(name) {
            Some(v) => Ok(v.display.as_str()),
            None if !self.strict => Ok(PLACEHOLDER),
            None => Err(TreeError::Unbound(name.to_string())),
        }
    }

    pub fn raw(&self, name: &str) -> Result<Option<&'a str>, TreeError> {
        match self.data.get(name) {
            Some(v) => Ok(v.raw.as_deref().filter(|r| !r.trim().is_empty())),
            None if !self.strict => Ok(None),
            None => Err(TreeError::Unbound(name.to_string())),
        }
    }

    /// The template's free-text clause, or its boilerplate paragraph when blank.
    pub fn free_text(&self, template: &Template) -> Result<String, TreeError> {
        Ok(self
            .raw(template.free_text_variable)?
            .map(|t| t.trim().to_string())
            .unwrap_or_else(|| template.default_free_text.to_string()))
    }
}

/// Identity block common to every template.
pub struct Parties<'a> {
    pub company: &'a str,
    pub name: &'a str,
    pub id_number: &'a str,
    pub country: &'a str,
    pub email: &'a str,
}

impl<'a> Parties<'a> {
    pub fn from_fields(fields: &Fields<'a>) -> Result<Self, TreeError> {
        Ok(Self {
            company: fields.display("nombreEmpresa")?,
            name: fields.display("nombreCompleto")?,
            id_number: fields.display("cedula")?,
            country: fields.display("paisDocumento")?,
            email: fields.display("correoElectronico")?,
        })
    }
}

pub fn title_section(title: &str, subtitle: Option<&str>) -> Section {
    let mut section = Section::untitled().paragraph(Paragraph::centered().bold(title));
    if let Some(sub) = subtitle {
        section = section.paragraph(Paragraph::centered().text(sub));
    }
    section
}

/// Opening paragraph naming both parties. `instrument` is e.g. "Addendum".
pub fn parties_paragraph(parties: &Parties<'_>, instrument: &str, signed_on: &str) -> Paragraph {
    Paragraph::new()
        .text(format!(
            "This {instrument} (the \"{instrument}\") is entered into on {signed_on} by and \
             between {}, (the \"Company\"), and ",
            parties.company
        ))
        .bold(parties.name)
        .text(format!(
            ", of legal age, identified with identification No. {} issued in {}, with email \
             address {} (the \"Contractor\"), collectively referred to as the \"Parties\".",
            parties.id_number, parties.country, parties.email
        ))
}

/// Closing clause and signature block. The e-signature fields are placed beneath it.
pub fn signature_section(
    parties: &Parties<'_>,
    fields: &Fields<'_>,
    instrument: &str,
) -> Result<Section, TreeError> {
    let signed = fields.raw("signContractDate")?;
    Ok(Section::titled("SIGNATURES")
        .paragraph(Paragraph::new().text(format!(
            "IN WITNESS WHEREOF, the Parties sign this {instrument} on the {} day of {}, {}, \
             in two counterparts of equal value.",
            day_of(signed),
            month_of(signed),
            year_of(signed)
        )))
        .paragraph(Paragraph::new().text("THE COMPANY: ").text(parties.company))
        .paragraph(Paragraph::new().text("THE CONTRACTOR: ").bold(parties.name))
        .paragraph(Paragraph::new().text(
            "The Contractor signs electronically and completes name, country and \
             identification number in the fields provided below.",
        )))
}

/// Numbered clause: bold label followed by body text.
pub fn clause(label: &str, body: impl Into<String>) -> Paragraph {
    Paragraph::new().bold(format!("{label} ")).text(body)
}
