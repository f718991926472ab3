//! Local PDF backend: layout + lopdf writer using the standard Helvetica faces.
//!
//! Layout and serialization are CPU-bound and run inside `tokio::task::spawn_blocking`.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, StringFormat};
use tracing::debug;

use crate::document::DocumentTree;
use crate::layout::font_metrics::get_metrics;
use crate::layout::{layout_document, FontFace, LaidOutPage, PageConfig, PlacedLine};
use crate::render::{RenderBackend, RenderError};

#[derive(Clone)]
pub struct PdfRenderer {
    config: Arc<PageConfig>,
}

impl PdfRenderer {
    pub fn new(config: PageConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[async_trait]
impl RenderBackend for PdfRenderer {
    async fn render_pdf(&self, tree: &DocumentTree) -> Result<Bytes, RenderError> {
        let tree = tree.clone();
        let config = Arc::clone(&self.config);

        let bytes = tokio::task::spawn_blocking(move || {
            let pages = layout_document(&tree, &config);
            debug!(template = %tree.template_id, pages = pages.len(), "Document laid out");
            write_pdf(&tree.title, &pages, &config)
        })
        .await
        .map_err(|e| RenderError::Task(format!("spawn_blocking failed in PDF render: {e}")))??;

        Ok(Bytes::from(bytes))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Writer
// ────────────────────────────────────────────────────────────────────────────

/// Serializes laid-out pages into a PDF document.
pub fn write_pdf(
    title: &str,
    pages: &[LaidOutPage],
    config: &PageConfig,
) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font_dictionary(FontFace::Regular));
    let bold_id = doc.add_object(font_dictionary(FontFace::Bold));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FontFace::Regular.resource_name() => regular_id,
            FontFace::Bold.resource_name() => bold_id,
        },
    });

    let total = pages.len();
    let mut kids: Vec<Object> = Vec::with_capacity(total);
    for (i, page) in pages.iter().enumerate() {
        let content = page_content(page, i + 1, total, config);
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Pdf(format!("content stream encoding: {e}")))?;
        let content_id = doc.add_object(lopdf::Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                config.page_width_pt.into(),
                config.page_height_pt.into(),
            ],
        }),
    );

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal(env!("CARGO_PKG_NAME")),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| RenderError::Pdf(format!("serialization: {e}")))?;
    Ok(buf)
}

fn font_dictionary(face: FontFace) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => face.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn page_content(
    page: &LaidOutPage,
    number: usize,
    total: usize,
    config: &PageConfig,
) -> Content {
    let mut operations = Vec::new();
    for line in &page.lines {
        push_line(&mut operations, line, config);
    }

    let footer = format!("Page {number} of {total}");
    let footer_width = get_metrics(FontFace::Regular).measure_pt(&footer, config.footer_size_pt);
    let x = (config.page_width_pt - footer_width) / 2.0;
    let y = config.margin_pt / 2.0;
    operations.extend([
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                FontFace::Regular.resource_name().into(),
                config.footer_size_pt.into(),
            ],
        ),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![pdf_string(&footer)]),
        Operation::new("ET", vec![]),
    ]);

    Content { operations }
}

fn push_line(operations: &mut Vec<Operation>, line: &PlacedLine, config: &PageConfig) {
    // PDF user space grows upwards from the bottom edge.
    let y = config.page_height_pt - line.baseline_pt();
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Td", vec![line.x_pt.into(), y.into()]));
    for segment in &line.segments {
        operations.push(Operation::new(
            "Tf",
            vec![segment.face.resource_name().into(), line.size_pt.into()],
        ));
        operations.push(Operation::new("Tj", vec![pdf_string(&segment.text)]));
    }
    operations.push(Operation::new("ET", vec![]));
}

fn pdf_string(text: &str) -> Object {
    Object::String(encode_win_ansi(text), StringFormat::Literal)
}

/// Maps text onto WinAnsiEncoding. Characters outside it become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '\u{20AC}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}
