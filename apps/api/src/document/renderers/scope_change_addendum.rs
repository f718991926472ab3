//! Addendum replacing the services clause.

use crate::binding::BoundData;
use crate::document::renderers::common::{
    clause, parties_paragraph, signature_section, title_section, Fields, Parties,
};
use crate::document::{DocumentTree, Page, Paragraph, Section, TreeError};
use crate::templates::Template;

pub fn render(template: &Template, data: &BoundData) -> Result<DocumentTree, TreeError> {
    let fields = Fields::strict(data);
    let parties = Parties::from_fields(&fields)?;
    let effective = fields.display("fechaEfectiva")?;

    let clauses = Section::titled("CLAUSES")
        .paragraph(
            clause("FIRST. New scope.", "Effective ")
                .text(format!("{effective}, "))
                .bold(parties.name)
                .text(
                    " shall provide the following services, which replace those described in \
                     the Original Agreement:",
                ),
        )
        .paragraph(Paragraph::new().text(fields.free_text(template)?))
        .paragraph(clause(
            "SECOND. Fee.",
            "The fee agreed in the Original Agreement remains unchanged unless the Parties agree \
             otherwise in writing.",
        ))
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
                title_section("ADDENDUM FOR SCOPE CHANGE", None),
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
