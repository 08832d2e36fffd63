//! Greedy line breaking for edited blocks.
//!
//! Reflow decides where lines break and where each line starts. Every
//! produced line carries one synthetic fragment with a placeholder width;
//! the renderer re-measures it once the line is laid out.

use std::sync::OnceLock;

use regex::Regex;

use super::options::ReflowOptions;
use crate::model::{BlockStyle, FontMetrics, GlyphMetrics, LineRecord, SemanticBlock, TextFragment};

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Split text into words and whitespace runs, keeping both.
pub fn split_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for m in whitespace().find_iter(text) {
        tokens.push(&text[last..m.start()]);
        tokens.push(m.as_str());
        last = m.end();
    }
    tokens.push(&text[last..]);
    tokens
}

/// A line produced by reflow.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflowLine {
    /// Line text
    pub content: String,
    /// Baseline y
    pub y: f64,
    /// Start x
    pub x: f64,
    /// A single fragment spanning the line
    pub items: Vec<TextFragment>,
}

impl ReflowLine {
    /// Convert to a line record for the renderer.
    pub fn into_line_record(self) -> LineRecord {
        let mut items = self.items.into_iter();
        let Some(first) = items.next() else {
            let frag = TextFragment::new(String::new(), self.content, [self.x, self.y, self.x, self.y])
                .with_origin(self.x, self.y);
            return LineRecord::start(String::new(), frag);
        };
        let mut line = LineRecord::start(first.id.clone(), first);
        for item in items {
            line.bbox[2] = line.bbox[2].max(item.bbox[2]);
            line.items.push(item);
        }
        line.content = self.content;
        line
    }
}

/// How word widths and line advances are computed.
#[derive(Clone, Copy)]
enum Widths<'a> {
    Metrics(&'a GlyphMetrics),
    Estimate,
}

/// Greedy reflow over a font metrics table.
#[derive(Debug, Clone, Default)]
pub struct ReflowEngine {
    fonts: Vec<FontMetrics>,
    options: ReflowOptions,
}

impl ReflowEngine {
    /// Create an engine over a metrics table.
    pub fn new(fonts: Vec<FontMetrics>) -> Self {
        Self {
            fonts,
            options: ReflowOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: ReflowOptions) -> Self {
        self.options = options;
        self
    }

    /// The engine's options.
    pub fn options(&self) -> &ReflowOptions {
        &self.options
    }

    fn metrics_for(&self, font: &str) -> Option<&GlyphMetrics> {
        self.fonts
            .iter()
            .find(|f| f.name == font)
            .and_then(|f| f.metrics.as_ref())
    }

    /// Break `text` into lines for `block`.
    ///
    /// Uses glyph metrics when the block's font has them and an average
    /// character width otherwise.
    pub fn reflow_block(&self, block: &SemanticBlock, text: &str) -> Vec<ReflowLine> {
        match self.metrics_for(&block.style.font) {
            Some(metrics) => self.reflow(block, text, Widths::Metrics(metrics)),
            None => {
                log::warn!(
                    "No metrics found for font {:?}, estimating widths for block {}",
                    block.style.font,
                    block.id
                );
                self.reflow(block, text, Widths::Estimate)
            }
        }
    }

    fn reflow(&self, block: &SemanticBlock, text: &str, widths: Widths<'_>) -> Vec<ReflowLine> {
        let opts = &self.options;
        let size = block.style.size;
        let indent_x = block.indent_x;
        let text_x = block.continuation_x();
        let right = block.bbox[2];

        let estimate = matches!(widths, Widths::Estimate);
        let line_height = if estimate {
            size * opts.estimate_line_height_ratio
        } else {
            size * opts.line_height_ratio
        };
        // The metrics path starts every line at the continuation indent
        // unless the first-line indent is requested explicitly.
        let distinct_first = estimate || opts.honor_first_line_indent;

        let word_width = |word: &str| -> f64 {
            match widths {
                Widths::Metrics(m) => word
                    .chars()
                    .map(|ch| {
                        let w100 = m
                            .width_of(ch)
                            .or_else(|| m.width_of(' '))
                            .unwrap_or(opts.fallback_char_width);
                        w100 / 100.0 * size
                    })
                    .sum(),
                Widths::Estimate => word.chars().count() as f64 * size * opts.estimate_char_ratio,
            }
        };

        let mut lines: Vec<ReflowLine> = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0;
        let mut y = block.first_line_y().unwrap_or(block.bbox[1] + size);

        for word in split_words(text) {
            let first = lines.is_empty();
            let start_x = if first && distinct_first { indent_x } else { text_x };
            let available = right - start_x;
            let width = word_width(word);

            if current_width + width > available && !current.is_empty() {
                let content = current.trim_end().to_string();
                lines.push(self.make_line(block, content, start_x, y, lines.len()));

                let rest = word.trim_start();
                current = rest.to_string();
                current_width = word_width(rest);
                y += line_height;
            } else {
                current.push_str(word);
                current_width += width;
            }
        }

        if !current.is_empty() {
            let start_x = if lines.is_empty() { indent_x } else { text_x };
            lines.push(self.make_line(block, current, start_x, y, lines.len()));
        }

        lines
    }

    fn make_line(&self, block: &SemanticBlock, content: String, x: f64, y: f64, n: usize) -> ReflowLine {
        let item = synthetic_item(
            format!("reflow-{}-{}", block.id, n),
            &content,
            x,
            y,
            &block.style,
            self.options.placeholder_width,
        );
        ReflowLine {
            content,
            y,
            x,
            items: vec![item],
        }
    }
}

fn synthetic_item(id: String, content: &str, x: f64, y: f64, style: &BlockStyle, width: f64) -> TextFragment {
    TextFragment::new(id, content, [x, y - style.size, x + width, y])
        .with_origin(x, y)
        .with_font(style.font.clone(), style.size)
}
