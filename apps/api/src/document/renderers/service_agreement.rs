//! Baseline independent contractor agreement.
//!
//! Also the fallback document: `render_lenient` accepts data bound for any template and
//! fills whatever it cannot find with the placeholder.

use tracing::error;

use crate::binding::BoundData;
use crate::document::renderers::common::{
    clause, parties_paragraph, signature_section, title_section, Fields, Parties,
};
use crate::document::{DocumentTree, Page, Paragraph, Section, TreeError};
use crate::templates::Template;

pub fn render(template: &Template, data: &BoundData) -> Result<DocumentTree, TreeError> {
    build(template, &Fields::strict(data))
}

pub fn render_lenient(template: &Template, data: &BoundData) -> DocumentTree {
    match build(template, &Fields::lenient(data)) {
        Ok(tree) => tree,
        Err(e) => {
            // Lenient lookups do not fail; keep a title-only document rather than panic.
            error!(error = %e, "Baseline agreement failed in lenient mode");
            DocumentTree {
                template_id: template.id,
                title: template.display_name.to_string(),
                pages: vec![Page {
                    sections: vec![title_section(template.display_name, None)],
                }],
            }
        }
    }
}

fn build(template: &Template, fields: &Fields<'_>) -> Result<DocumentTree, TreeError> {
    let parties = Parties::from_fields(fields)?;
    let start = fields.display("fechaInicio")?;
    let fee = fields.display("valorMensual")?;
    let role = fields.display("cargo")?;

    let clauses = Section::titled("CLAUSES")
        .paragraph(
            clause("FIRST. Object.", "")
                .bold(parties.name)
                .text(format!(
                    " undertakes to provide, with full technical and administrative autonomy, \
                     the services described in Annex A in the capacity of {role}."
                )),
        )
        .paragraph(clause(
            "SECOND. Term.",
            format!(
                "This Agreement starts on {start} and remains in force for an indefinite term \
                 until terminated by either Party with thirty (30) days' written notice."
            ),
        ))
        .paragraph(clause(
            "THIRD. Fee.",
            format!(
                "The Company shall pay the Contractor a monthly fee of USD ${fee}, payable within \
                 the first ten (10) days of each month against the corresponding invoice."
            ),
        ))
        .paragraph(clause(
            "FOURTH. Independence.",
            "No employment relationship arises from this Agreement. The Contractor is solely \
             responsible for taxes and social security contributions on the fees received.",
        ))
        .paragraph(clause(
            "FIFTH. Confidentiality and intellectual property.",
            "All information received and all work product created under this Agreement belong \
             to the Company and shall be kept confidential.",
        ));

    let annex = Section::titled("ANNEX A - DESCRIPTION OF SERVICES")
        .paragraph(Paragraph::new().text(fields.free_text(template)?));

    Ok(DocumentTree {
        template_id: template.id,
        title: template.display_name.to_string(),
        pages: vec![
            Page {
                sections: vec![
                    title_section("INDEPENDENT CONTRACTOR AGREEMENT", None),
                    Section::untitled().paragraph(parties_paragraph(
                        &parties,
                        "Agreement",
                        fields.display("signContractDate")?,
                    )),
                    clauses,
                ],
            },
            Page {
                sections: vec![annex, signature_section(&parties, fields, "Agreement")?],
            },
        ],
    })
}
