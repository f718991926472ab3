// Variable Binder
// Pure merge of template defaults, source record and user overrides into display-ready values,
// plus the formatting toolkit (money, ordinal dates, date part extraction) renderers share.

pub mod binder;
pub mod format;

pub use binder::{bind, render_subject, BoundData, Overrides, SourceRecord};
