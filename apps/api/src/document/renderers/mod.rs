//! Per-template renderers. Each exposes `render(&Template, &BoundData)`; shared clauses
//! (title, parties, free-text clause, signature block) live in `common`.

pub mod common;
pub mod compensation_addendum;
pub mod confidentiality_addendum;
pub mod extension_addendum;
pub mod scope_change_addendum;
pub mod service_agreement;
pub mod termination_agreement;
