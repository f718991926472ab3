// Draft Sessions
// Server-side counterpart of the document form: the selected template, the source record and
// the user's overrides. Bound data is never stored; it is re-derived on every read.

pub mod handlers;
pub mod session;

pub use session::{DraftSession, DraftStore, DraftView};
