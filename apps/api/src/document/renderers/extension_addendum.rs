//! Addendum extending the term of an existing agreement.

use crate::binding::BoundData;
use crate::document::renderers::common::{
    clause, parties_paragraph, signature_section, title_section, Fields, Parties,
};
use crate::document::{DocumentTree, Page, Paragraph, Section, TreeError};
use crate::templates::Template;

pub fn render(template: &Template, data: &BoundData) -> Result<DocumentTree, TreeError> {
    let fields = Fields::strict(data);
    let parties = Parties::from_fields(&fields)?;

    let original_start = fields.display("fechaInicioContratoOriginal")?;
    let fee = fields.display("nuevoValorContrato")?;
    let term = match fields.raw("fechaFinExtension")? {
        Some(_) => format!(
            "The term of the Original Agreement is extended until {}, unless terminated \
             earlier in accordance with its provisions.",
            fields.display("fechaFinExtension")?
        ),
        None => "The term of the Original Agreement is extended for an indefinite period, \
                 until terminated by either Party in accordance with its provisions."
            .to_string(),
    };

    let body = Section::untitled()
        .paragraph(parties_paragraph(
            &parties,
            "Addendum",
            fields.display("signContractDate")?,
        ))
        .paragraph(Paragraph::new().text(format!(
            "WHEREAS the Parties entered into an independent contractor agreement that commenced \
             on {original_start} (the \"Original Agreement\"), and wish to extend its term under \
             the conditions set out below."
        )));

    let clauses = Section::titled("CLAUSES")
        .paragraph(clause("FIRST. Extension.", term))
        .paragraph(
            clause(
                "SECOND. Fee.",
                "From the signing of this Addendum, the Company shall pay ",
            )
            .bold(parties.name)
            .text(format!(
                " a monthly fee of USD ${fee}, payable within the first ten (10) days of each \
                 month against the corresponding invoice."
            )),
        )
        .paragraph(clause("THIRD. Services.", fields.free_text(template)?))
        .paragraph(clause(
            "FOURTH. Other terms.",
            "All terms of the Original Agreement not expressly modified by this Addendum remain \
             in full force and effect.",
        ));

    Ok(DocumentTree {
        template_id: template.id,
        title: template.display_name.to_string(),
        pages: vec![Page {
            sections: vec![
                title_section("ADDENDUM FOR EXTENSION", Some("Independent Contractor Agreement")),
                body,
                clauses,
                signature_section(&parties, &fields, "Addendum")?,
            ],
        }],
    })
}
