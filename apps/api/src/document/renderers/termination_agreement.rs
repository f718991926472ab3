//! Mutual termination of an existing agreement.

use crate::binding::BoundData;
use crate::document::renderers::common::{
    clause, parties_paragraph, signature_section, title_section, Fields, Parties,
};
use crate::document::{DocumentTree, Page, Section, TreeError};
use crate::templates::Template;

pub fn render(template: &Template, data: &BoundData) -> Result<DocumentTree, TreeError> {
    let fields = Fields::strict(data);
    let parties = Parties::from_fields(&fields)?;

    let end = fields.display("fechaTerminacion")?;
    let settlement = match fields.raw("valorLiquidacion")? {
        Some(raw) if raw.trim() != "0" => format!(
            "The Company shall pay a final amount of USD ${} together with any fees accrued up \
             to the termination date.",
            fields.display("valorLiquidacion")?
        ),
        _ => "The Company shall pay only the fees accrued up to the termination date; no \
              additional amount is owed."
            .to_string(),
    };

    let clauses = Section::titled("CLAUSES")
        .paragraph(
            clause("FIRST. Termination.", "The Parties agree to terminate the agreement with ")
                .bold(parties.name)
                .text(format!(" by mutual consent, effective {end}.")),
        )
        .paragraph(clause("SECOND. Settlement.", settlement))
        .paragraph(clause("THIRD. Handover.", fields.free_text(template)?))
        .paragraph(clause(
            "FOURTH. Release.",
            "Upon fulfilment of the above, the Parties declare themselves mutually at peace and \
             safe for all obligations arising from the agreement, except for confidentiality \
             obligations, which survive termination.",
        ));

    Ok(DocumentTree {
        template_id: template.id,
        title: template.display_name.to_string(),
        pages: vec![Page {
            sections: vec![
                title_section("MUTUAL TERMINATION AGREEMENT", None),
                Section::untitled().paragraph(parties_paragraph(
                    &parties,
                    "Agreement",
                    fields.display("signContractDate")?,
                )),
                clauses,
                signature_section(&parties, &fields, "Agreement")?,
            ],
        }],
    })
}
