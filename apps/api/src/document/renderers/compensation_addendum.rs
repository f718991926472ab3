//! Addendum changing the monthly fee.

use crate::binding::BoundData;
use crate::document::renderers::common::{
    clause, parties_paragraph, signature_section, title_section, Fields, Parties,
};
use crate::document::{DocumentTree, Page, Section, TreeError};
use crate::templates::Template;

pub fn render(template: &Template, data: &BoundData) -> Result<DocumentTree, TreeError> {
    let fields = Fields::strict(data);
    let parties = Parties::from_fields(&fields)?;

    let previous = fields.display("valorAnterior")?;
    let new_fee = fields.display("nuevoValorContrato")?;
    let effective = fields.display("fechaEfectiva")?;

    let clauses = Section::titled("CLAUSES")
        .paragraph(
            clause("FIRST. Adjustment.", "Effective ")
                .text(format!("{effective}, the monthly fee payable to "))
                .bold(parties.name)
                .text(format!(
                    " changes from USD ${previous} to USD ${new_fee}, under the same payment \
                     conditions set out in the Original Agreement."
                )),
        )
        .paragraph(clause("SECOND. Grounds.", fields.free_text(template)?))
        .paragraph(clause(
            "THIRD. Other terms.",
            "All terms of the Original Agreement not expressly modified by this Addendum remain \
             in full force and effect.",
        ));

    Ok(DocumentTree {
        template_id: template.id,
        title: template.display_name.to_string(),
        pages: vec![Page {
            sections: vec![
                title_section("ADDENDUM FOR COMPENSATION ADJUSTMENT", None),
                Section::untitled().paragraph(parties_paragraph(
                    &parties,
                    "Addendum",
                    fields.display("signContractDate")?,
                )),
                clauses,
                signature_section(&parties, &fields, "Addendum")?,
            ],
        }],
    })
}
