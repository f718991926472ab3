//! Confidentiality and non-disclosure addendum.

use crate::binding::BoundData;
use crate::document::renderers::common::{
    clause, parties_paragraph, signature_section, title_section, Fields, Parties,
};
use crate::document::{DocumentTree, Page, Section, TreeError};
use crate::templates::Template;

pub fn render(template: &Template, data: &BoundData) -> Result<DocumentTree, TreeError> {
    let fields = Fields::strict(data);
    let parties = Parties::from_fields(&fields)?;
    let effective = fields.display("fechaInicio")?;

    let clauses = Section::titled("CLAUSES")
        .paragraph(clause(
            "FIRST. Confidential Information.",
            fields.free_text(template)?,
        ))
        .paragraph(
            clause("SECOND. Obligations.", "From ")
                .text(format!("{effective}, "))
                .bold(parties.name)
                .text(
                    " shall keep the Confidential Information strictly confidential, use it \
                     solely to perform the services, and not disclose it to any third party \
                     without the prior written consent of the Company.",
                ),
        )
        .paragraph(clause(
            "THIRD. Duration.",
            "These obligations remain in force during the engagement and for five (5) years \
             after its termination.",
        ))
        .paragraph(clause(
            "FOURTH. Return of information.",
            "Upon request or at termination, the Contractor shall return or destroy all \
             Confidential Information in its possession.",
        ));

    Ok(DocumentTree {
        template_id: template.id,
        title: template.display_name.to_string(),
        pages: vec![Page {
            sections: vec![
                title_section("CONFIDENTIALITY ADDENDUM", None),
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
