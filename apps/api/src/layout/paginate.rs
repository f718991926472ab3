//! Page fill: flows a DocumentTree into fixed-size pages.
//!
//! # Rules
//! - Explicit tree pages always start a new physical page.
//! - A line that would cross the bottom margin moves to a new page.
//! - A heading never sits alone at the bottom of a page (kept with its first line).
//! - On the LAST page, nothing may extend below `PageConfig::last_page_bottom_pt`. Lines that
//!   do are carried to a fresh final page, leaving the signature zone empty.

use serde::Serialize;

use crate::document::{Align, DocumentTree, Run};
use crate::layout::font_metrics::PageConfig;
use crate::layout::wrap::{wrap_runs, Line, Segment};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// A line positioned on a page. Vertical positions are measured from the TOP edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    pub top_pt: f32,
    pub height_pt: f32,
    pub x_pt: f32,
    pub size_pt: f32,
    pub segments: Vec<Segment>,
}

impl PlacedLine {
    pub fn bottom_pt(&self) -> f32 {
        self.top_pt + self.height_pt
    }

    /// Baseline position from the top edge.
    pub fn baseline_pt(&self) -> f32 {
        self.top_pt + self.size_pt
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaidOutPage {
    pub lines: Vec<PlacedLine>,
}

impl LaidOutPage {
    pub fn content_bottom_pt(&self) -> f32 {
        self.lines.last().map_or(0.0, PlacedLine::bottom_pt)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core
// ────────────────────────────────────────────────────────────────────────────

struct Flow<'a> {
    config: &'a PageConfig,
    pages: Vec<LaidOutPage>,
    current: LaidOutPage,
    cursor_pt: f32,
}

impl<'a> Flow<'a> {
    fn new(config: &'a PageConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            current: LaidOutPage::default(),
            cursor_pt: config.margin_pt,
        }
    }

    fn break_page(&mut self) {
        if !self.current.lines.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
        self.cursor_pt = self.config.margin_pt;
    }

    fn remaining_pt(&self) -> f32 {
        self.config.body_bottom_pt() - self.cursor_pt
    }

    fn place(&mut self, line: Line, size_pt: f32, align: Align) {
        let height = self.config.line_height_pt(size_pt);
        if self.cursor_pt + height > self.config.body_bottom_pt() && !self.current.lines.is_empty()
        {
            self.break_page();
        }
        let x_pt = match align {
            Align::Left => self.config.margin_pt,
            Align::Center => {
                self.config.margin_pt + ((self.config.text_width_pt() - line.width_pt) / 2.0).max(0.0)
            }
        };
        self.current.lines.push(PlacedLine {
            top_pt: self.cursor_pt,
            height_pt: height,
            x_pt,
            size_pt,
            segments: line.segments,
        });
        self.cursor_pt += height;
    }

    fn gap(&mut self, pt: f32) {
        if !self.current.lines.is_empty() {
            self.cursor_pt += pt;
        }
    }

    fn finish(mut self) -> Vec<LaidOutPage> {
        self.break_page();
        self.pages
    }
}

/// Lays out every page of `tree`. Always returns at least one page.
pub fn layout_document(tree: &DocumentTree, config: &PageConfig) -> Vec<LaidOutPage> {
    let mut flow = Flow::new(config);
    let body_line = config.line_height_pt(config.body_size_pt);
    let heading_line = config.line_height_pt(config.heading_size_pt);

    for page in &tree.pages {
        flow.break_page();
        for section in &page.sections {
            if let Some(heading) = &section.heading {
                flow.gap(config.paragraph_gap_pt);
                if flow.remaining_pt() < heading_line + body_line {
                    flow.break_page();
                }
                let runs = [Run {
                    text: heading.clone(),
                    bold: true,
                }];
                for line in wrap_runs(&runs, config.heading_size_pt, config) {
                    flow.place(line, config.heading_size_pt, Align::Left);
                }
            }
            for paragraph in &section.paragraphs {
                for line in wrap_runs(&paragraph.runs, config.body_size_pt, config) {
                    flow.place(line, config.body_size_pt, paragraph.align);
                }
                flow.gap(config.paragraph_gap_pt);
            }
        }
    }

    let mut pages = flow.finish();
    reserve_signature_zone(&mut pages, config);
    if pages.is_empty() {
        pages.push(LaidOutPage::default());
    }
    pages
}

/// Moves lines that reach into the signature zone of the last page onto a new final page.
fn reserve_signature_zone(pages: &mut Vec<LaidOutPage>, config: &PageConfig) {
    let limit = config.last_page_bottom_pt();
    let Some(last) = pages.last_mut() else {
        return;
    };
    let Some(split_at) = last.lines.iter().position(|l| l.bottom_pt() > limit) else {
        return;
    };

    let mut carried: Vec<PlacedLine> = last.lines.split_off(split_at);
    let shift = carried[0].top_pt - config.margin_pt;
    for line in &mut carried {
        line.top_pt -= shift;
    }
    if last.lines.is_empty() {
        last.lines = carried;
    } else {
        pages.push(LaidOutPage { lines: carried });
    }
}
