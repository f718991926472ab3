//! Field-Placement Planner.
//!
//! Fields are placed in normalized page coordinates on the last page (`page = -1`), which the
//! signing service resolves. The recipe is a fixed, tested contract: a signature box anchored
//! at `BASE_Y` with three text fields stacked under it at fixed offsets, each clamped so the
//! column never runs off the printable area. A second recipient gets a second column.

use serde::{Deserialize, Serialize};

use crate::signing::{DocumentKind, Recipient, RecipientRole};

/// Sentinel for "last page of the rendered document".
pub const LAST_PAGE: i32 = -1;
pub const BASE_Y: f64 = 0.82;
/// No field may extend past this fraction of the page height.
pub const MAX_BOTTOM: f64 = 0.97;

const SIGNATURE_WIDTH: f64 = 0.30;
const SIGNATURE_HEIGHT: f64 = 0.08;
const TEXT_WIDTH: f64 = 0.30;
const TEXT_HEIGHT: f64 = 0.018;

const CANDIDATE_COLUMN_X: f64 = 0.12;
const COMPANY_COLUMN_X: f64 = 0.58;

/// (offset below `BASE_Y`, maximum y) for each supporting text row.
const TEXT_ROWS: [(f64, f64); 3] = [(0.085, 0.91), (0.105, 0.935), (0.125, 0.96)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    Signature,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub page: i32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub recipient_id: String,
    pub required: bool,
    pub label: String,
}

#[cfg(test)]
impl FieldDescriptor {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

fn column_x(role: RecipientRole) -> f64 {
    match role {
        RecipientRole::Candidate => CANDIDATE_COLUMN_X,
        RecipientRole::Company => COMPANY_COLUMN_X,
    }
}

fn text_labels(role: RecipientRole) -> [&'static str; 3] {
    match role {
        RecipientRole::Candidate => ["Name", "Country", "Identification No."],
        RecipientRole::Company => ["Name", "Title", "Date"],
    }
}

fn signature_label(role: RecipientRole, kind: DocumentKind) -> &'static str {
    match (kind, role) {
        (DocumentKind::Annex, _) => "Signature",
        (DocumentKind::Contract, RecipientRole::Candidate) => "Contractor signature",
        (DocumentKind::Contract, RecipientRole::Company) => "Company signature",
    }
}

/// Rounds to three decimals so the wire values read like the recipe constants.
fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Plans the signature box and its three supporting text fields for one recipient.
///
/// `recipient_id` must be the id the signing service assigned, never a local guess.
pub fn plan_fields(
    recipient_id: &str,
    role: RecipientRole,
    kind: DocumentKind,
) -> Vec<FieldDescriptor> {
    let x = column_x(role);
    let mut fields = Vec::with_capacity(1 + TEXT_ROWS.len());

    fields.push(FieldDescriptor {
        page: LAST_PAGE,
        x,
        y: BASE_Y,
        width: SIGNATURE_WIDTH,
        height: SIGNATURE_HEIGHT,
        kind: FieldKind::Signature,
        recipient_id: recipient_id.to_string(),
        required: true,
        label: signature_label(role, kind).to_string(),
    });

    for ((offset, max_y), label) in TEXT_ROWS.into_iter().zip(text_labels(role)) {
        let y = (BASE_Y + offset).min(max_y).min(MAX_BOTTOM - TEXT_HEIGHT);
        fields.push(FieldDescriptor {
            page: LAST_PAGE,
            x,
            y: round3(y),
            width: TEXT_WIDTH,
            height: TEXT_HEIGHT,
            kind: FieldKind::Text,
            recipient_id: recipient_id.to_string(),
            required: true,
            label: label.to_string(),
        });
    }

    fields
}

/// Plans fields for every echoed recipient, candidate column first.
pub fn plan_for_recipients(recipients: &[Recipient], kind: DocumentKind) -> Vec<FieldDescriptor> {
    let mut ordered: Vec<&Recipient> = recipients.iter().collect();
    ordered.sort_by_key(|r| match r.rol {
        RecipientRole::Candidate => 0,
        RecipientRole::Company => 1,
    });
    ordered
        .into_iter()
        .flat_map(|r| plan_fields(&r.id, r.rol, kind))
        .collect()
}
