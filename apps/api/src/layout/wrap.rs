//! Greedy word wrap over styled runs.
//!
//! Same greedy algorithm as a plain-text line simulation, extended so a word may carry
//! several styles (`Ana` bold followed by `,` regular stays one unbreakable word).

use serde::Serialize;

use crate::document::Run;
use crate::layout::font_metrics::{get_metrics, FontFace, PageConfig};

/// A same-style stretch of text within a line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub text: String,
    pub face: FontFace,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub segments: Vec<Segment>,
    pub width_pt: f32,
}

impl Line {
    fn empty() -> Self {
        Self {
            segments: Vec::new(),
            width_pt: 0.0,
        }
    }

    fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn push_text(&mut self, text: &str, face: FontFace) {
        match self.segments.last_mut() {
            Some(last) if last.face == face => last.text.push_str(text),
            _ => self.segments.push(Segment {
                text: text.to_string(),
                face,
            }),
        }
    }

    #[cfg(test)]
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// An unbreakable unit: whitespace-free pieces glued across run boundaries.
struct Word {
    pieces: Vec<(String, FontFace)>,
}

impl Word {
    fn width_pt(&self, size_pt: f32) -> f32 {
        self.pieces
            .iter()
            .map(|(text, face)| get_metrics(*face).measure_pt(text, size_pt))
            .sum()
    }
}

fn split_words(runs: &[Run]) -> Vec<Word> {
    let mut words: Vec<Word> = Vec::new();
    // True when the previous run ended in the middle of a word.
    let mut glued = false;

    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        let face = FontFace::from_bold(run.bold);
        let starts_with_space = run.text.starts_with(char::is_whitespace);

        for (i, token) in run.text.split_whitespace().enumerate() {
            if i == 0 && glued && !starts_with_space {
                if let Some(last) = words.last_mut() {
                    last.pieces.push((token.to_string(), face));
                    continue;
                }
            }
            words.push(Word {
                pieces: vec![(token.to_string(), face)],
            });
        }

        glued = !run.text.ends_with(char::is_whitespace) && !run.text.trim().is_empty();
    }
    words
}

/// Wraps `runs` to the page's text width at `size_pt`. An empty paragraph yields no lines.
pub fn wrap_runs(runs: &[Run], size_pt: f32, config: &PageConfig) -> Vec<Line> {
    let max_width = config.text_width_pt();
    let space_w = get_metrics(FontFace::Regular).space_width * size_pt;

    let mut lines = Vec::new();
    let mut current = Line::empty();

    for word in split_words(runs) {
        let word_w = word.width_pt(size_pt);

        if !current.is_empty() && current.width_pt + space_w + word_w > max_width {
            // Line is full, start a new one with this word.
            lines.push(std::mem::replace(&mut current, Line::empty()));
        }

        if !current.is_empty() {
            let face = word.pieces[0].1;
            current.push_text(" ", face);
            current.width_pt += space_w;
        }
        for (text, face) in &word.pieces {
            current.push_text(text, *face);
        }
        current.width_pt += word_w;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
