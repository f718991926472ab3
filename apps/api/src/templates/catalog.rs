//! Static template definitions.
//!
//! Variables shared by every template (identity block + signing date) are declared once in
//! `identity_variables`; each template appends its own. The legal prose lives in the
//! per-template renderers under `document::renderers`.

use std::collections::BTreeMap;

use crate::templates::{
    CompanyProfile, Template, TemplateCategory, TemplateId, VariableKind, VariableSpec,
};

const fn var(
    name: &'static str,
    label: &'static str,
    kind: VariableKind,
    required: bool,
) -> VariableSpec {
    VariableSpec {
        name,
        label,
        kind,
        required,
    }
}

fn identity_variables() -> Vec<VariableSpec> {
    vec![
        var("nombreCompleto", "Full name", VariableKind::Text, true),
        var("correoElectronico", "Email", VariableKind::Email, true),
        var("cedula", "Identification No.", VariableKind::Text, true),
        var("paisDocumento", "Issuing country", VariableKind::Text, true),
        var("signContractDate", "Signing date", VariableKind::Date, true),
    ]
}

fn company_defaults(company: &CompanyProfile) -> BTreeMap<&'static str, String> {
    BTreeMap::from([("nombreEmpresa", company.name.clone())])
}

/// Builds the catalog entry for `id`. Exhaustive so a new id cannot ship without a template.
pub fn template_for(id: TemplateId, company: &CompanyProfile) -> Template {
    let mut variables = identity_variables();
    let mut defaults = company_defaults(company);

    match id {
        TemplateId::ServiceAgreement => {
            variables.extend([
                var("fechaInicio", "Start date", VariableKind::StartDate, true),
                var("valorMensual", "Monthly fee (USD)", VariableKind::Money, true),
                var("cargo", "Role", VariableKind::Text, false),
                var("descripcionServicios", "Services", VariableKind::Text, false),
            ]);
            defaults.insert("cargo", "Independent Contractor".to_string());
            Template {
                id,
                display_name: "Independent Contractor Agreement",
                description: "Baseline services agreement between the company and a contractor.",
                subject_pattern: "Independent Contractor Agreement - {{nombreCompleto}}",
                category: TemplateCategory::Contract,
                variables,
                defaults,
                free_text_variable: "descripcionServicios",
                default_free_text: "The Contractor shall provide professional services in the \
                    area agreed with the Company, including the planning, execution and \
                    reporting of assigned tasks, in accordance with the instructions, quality \
                    standards and deadlines communicated by the Company from time to time.",
            }
        }
        TemplateId::ExtensionAddendum => {
            variables.extend([
                var(
                    "fechaInicioContratoOriginal",
                    "Original contract start date",
                    VariableKind::StartDate,
                    true,
                ),
                var("nuevoValorContrato", "New monthly fee (USD)", VariableKind::Money, true),
                var("fechaFinExtension", "Extension end date", VariableKind::Date, false),
                var("descripcionServicios", "Services", VariableKind::Text, false),
            ]);
            Template {
                id,
                display_name: "Addendum for Extension",
                description: "Extends the term of an existing agreement and restates the fee.",
                subject_pattern: "Addendum for Extension - {{nombreCompleto}}",
                category: TemplateCategory::Annex,
                variables,
                defaults,
                free_text_variable: "descripcionServicios",
                default_free_text: "During the extended term the Contractor shall continue to \
                    provide the same services described in the Original Agreement, under the \
                    same quality standards, reporting lines and confidentiality obligations.",
            }
        }
        TemplateId::CompensationAddendum => {
            variables.extend([
                var("valorAnterior", "Previous monthly fee (USD)", VariableKind::Money, true),
                var("nuevoValorContrato", "New monthly fee (USD)", VariableKind::Money, true),
                var("fechaEfectiva", "Effective date", VariableKind::StartDate, true),
                var("motivoAjuste", "Reason for adjustment", VariableKind::Text, false),
            ]);
            Template {
                id,
                display_name: "Addendum for Compensation Adjustment",
                description: "Changes the monthly fee payable under an existing agreement.",
                subject_pattern: "Addendum for Compensation Adjustment - {{nombreCompleto}}",
                category: TemplateCategory::Annex,
                variables,
                defaults,
                free_text_variable: "motivoAjuste",
                default_free_text: "The Parties have reviewed the scope, performance and market \
                    conditions of the engagement and agree that the adjusted fee fairly \
                    reflects the services rendered under the Original Agreement.",
            }
        }
        TemplateId::ScopeChangeAddendum => {
            variables.extend([
                var("fechaEfectiva", "Effective date", VariableKind::StartDate, true),
                var("descripcionServicios", "Updated services", VariableKind::Text, false),
            ]);
            Template {
                id,
                display_name: "Addendum for Scope Change",
                description: "Replaces the services clause of an existing agreement.",
                subject_pattern: "Addendum for Scope Change - {{nombreCompleto}}",
                category: TemplateCategory::Annex,
                variables,
                defaults,
                free_text_variable: "descripcionServicios",
                default_free_text: "The Contractor shall provide the services reasonably \
                    requested by the Company within the Contractor's area of expertise, \
                    including any additional responsibilities communicated in writing by the \
                    Company after the effective date of this Addendum.",
            }
        }
        TemplateId::TerminationAgreement => {
            variables.extend([
                var("fechaTerminacion", "Termination date", VariableKind::Date, true),
                var("valorLiquidacion", "Final payment (USD)", VariableKind::Money, false),
                var(
                    "condicionesTerminacion",
                    "Termination conditions",
                    VariableKind::Text,
                    false,
                ),
            ]);
            defaults.insert("valorLiquidacion", "0".to_string());
            Template {
                id,
                display_name: "Mutual Termination Agreement",
                description: "Terminates an existing agreement by mutual consent.",
                subject_pattern: "Mutual Termination Agreement - {{nombreCompleto}}",
                category: TemplateCategory::Annex,
                variables,
                defaults,
                free_text_variable: "condicionesTerminacion",
                default_free_text: "The Contractor shall return all equipment, credentials and \
                    materials belonging to the Company, deliver any work in progress, and \
                    cooperate in the orderly handover of pending matters before the \
                    termination date.",
            }
        }
        TemplateId::ConfidentialityAddendum => {
            variables.extend([
                var("fechaInicio", "Effective date", VariableKind::StartDate, true),
                var(
                    "alcanceConfidencialidad",
                    "Scope of confidential information",
                    VariableKind::Text,
                    false,
                ),
            ]);
            Template {
                id,
                display_name: "Confidentiality Addendum",
                description: "Adds confidentiality and non-disclosure obligations.",
                subject_pattern: "Confidentiality Addendum - {{nombreCompleto}}",
                category: TemplateCategory::Annex,
                variables,
                defaults,
                free_text_variable: "alcanceConfidencialidad",
                default_free_text: "Confidential Information includes all non-public business, \
                    technical, financial and client information disclosed to the Contractor in \
                    any form, including source code, pricing, personnel data and the terms of \
                    this engagement.",
            }
        }
    }
}
