// Layout
// Turns a DocumentTree into positioned lines on fixed-size pages: static font metrics,
// greedy word wrap over styled runs, and pagination that keeps the signature zone of the
// last page clear. CPU-bound; the PDF backend runs it inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod paginate;
pub mod wrap;

pub use font_metrics::{default_page_config, FontFace, PageConfig};
pub use paginate::{layout_document, LaidOutPage, PlacedLine};
