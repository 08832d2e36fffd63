//! Glyph-run to fragment conversion.
//!
//! Each positioned run from the text-extraction layer becomes one
//! [`TextFragment`] in render space. Runs are then bundled into fixed-size
//! [`TextBlockRecord`]s for the editor UI; semantic line detection happens
//! separately in the line merger.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::geometry::Matrix;
use super::options::TextOptions;
use crate::layout::{FontSpec, TextMeasurer};
use crate::model::{FontWeight, Glyph, TextBlockRecord, TextFragment};

/// A positioned glyph run from the text-extraction layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGlyphRun {
    /// Text rendering matrix `[a, b, c, d, e, f]`
    pub transform: Matrix,

    /// Decoded string
    #[serde(rename = "str")]
    pub text: String,

    /// Advance width of the run in PDF units
    #[serde(default)]
    pub width: f64,

    /// Font resource name
    #[serde(default)]
    pub font_name: String,
}

impl RawGlyphRun {
    /// Create a run.
    pub fn new(transform: Matrix, text: impl Into<String>, width: f64, font_name: impl Into<String>) -> Self {
        Self {
            transform,
            text: text.into(),
            width,
            font_name: font_name.into(),
        }
    }
}

/// Style hint for a font resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyleHint {
    /// Generic or concrete family the renderer should fall back to
    #[serde(default)]
    pub font_family: Option<String>,
}

/// Style hints keyed by font resource name.
pub type TextStyleHints = HashMap<String, TextStyleHint>;

/// Infer weight and italic style from a font name.
pub fn font_style_from_name(font_name: &str) -> (FontWeight, bool) {
    let name = font_name.to_lowercase();

    let weighted = ["bold", "700", "800", "black", "heavy", "semibold", "medium"]
        .iter()
        .any(|w| name.contains(w));
    let weight = if !weighted {
        FontWeight::Normal
    } else if name.contains("medium") || name.contains("semibold") {
        FontWeight::Medium
    } else {
        FontWeight::Bold
    };

    let italic = name.contains("italic") || name.contains("oblique") || name.contains("-it");

    (weight, italic)
}

/// Converts glyph runs into fragments and coarse blocks.
#[derive(Debug, Clone, Default)]
pub struct TextProcessor {
    options: TextOptions,
}

impl TextProcessor {
    /// Create a processor.
    pub fn new(options: TextOptions) -> Self {
        Self { options }
    }

    /// The processor's options.
    pub fn options(&self) -> &TextOptions {
        &self.options
    }

    /// Convert one run. The id is assigned by the caller so that it reflects
    /// the run's position in the input, empty runs included.
    pub fn fragment(&self, id: impl Into<String>, run: &RawGlyphRun, hints: &TextStyleHints) -> TextFragment {
        let opts = &self.options;
        let [a, b, c, d, e, f] = run.transform;

        let mut original_size = (a * a + b * b).sqrt();
        if original_size == 0.0 || !original_size.is_finite() {
            original_size = opts.default_font_size;
        }
        let font_size = original_size * opts.scale_y;

        let x = e * opts.scale_x;
        let y = (opts.viewport_height - f - original_size * opts.cap_height_ratio) * opts.scale_y;
        let baseline = (opts.viewport_height - f) * opts.scale_y;

        let (weight, is_italic) = font_style_from_name(&run.font_name);
        let fallback_family = hints
            .get(&run.font_name)
            .and_then(|h| h.font_family.clone())
            .unwrap_or_else(|| opts.fallback_family.clone());

        let mut frag = TextFragment::new(
            id,
            run.text.clone(),
            [x, y, x + run.width * opts.scale_x, y + font_size],
        )
        .with_origin(x, baseline)
        .with_font(run.font_name.clone(), font_size);
        frag.matrix = [a, b, c, d];
        frag.weight = weight;
        frag.is_bold = weight == FontWeight::Bold;
        frag.is_italic = is_italic;
        frag.fallback_family = Some(fallback_family);
        frag
    }

    /// Convert runs to fragments, drop empty ones, and bundle them into blocks.
    pub fn process_items(&self, runs: &[RawGlyphRun], hints: &TextStyleHints) -> Vec<TextBlockRecord> {
        let fragments: Vec<TextFragment> = runs
            .iter()
            .enumerate()
            .map(|(i, run)| self.fragment(format!("frag_{}", i), run, hints))
            .filter(|f| !f.is_empty())
            .collect();

        let chunk_size = self.options.chunk_size.max(1);
        let blocks: Vec<TextBlockRecord> = fragments
            .chunks(chunk_size)
            .enumerate()
            .map(|(n, chunk)| TextBlockRecord::from_children(format!("block_{}", n * chunk_size), chunk.to_vec()))
            .collect();

        log::debug!(
            "TextProcessor: {} runs -> {} fragments in {} blocks",
            runs.len(),
            fragments.len(),
            blocks.len()
        );
        blocks
    }

    /// Fragments only, without block bundling.
    pub fn fragments(&self, runs: &[RawGlyphRun], hints: &TextStyleHints) -> Vec<TextFragment> {
        self.process_items(runs, hints)
            .into_iter()
            .flat_map(|b| b.children)
            .collect()
    }
}

/// Re-measure every fragment with `measurer`, replacing the approximate run
/// width with cumulative per-character advances.
pub fn refine_metrics(blocks: Vec<TextBlockRecord>, measurer: &dyn TextMeasurer) -> Vec<TextBlockRecord> {
    blocks
        .into_iter()
        .map(|block| {
            let children = block
                .children
                .into_iter()
                .map(|frag| refine_fragment(frag, measurer))
                .collect();
            TextBlockRecord::from_children(block.id, children)
        })
        .collect()
}

fn refine_fragment(mut frag: TextFragment, measurer: &dyn TextMeasurer) -> TextFragment {
    let spec = FontSpec::from_fragment(&frag);
    let mut offset = 0.0;
    frag.glyphs = frag
        .content
        .chars()
        .map(|ch| {
            let w = measurer.advance(ch, &spec);
            let glyph = Glyph { ch, x: offset, w };
            offset += w;
            glyph
        })
        .collect();
    frag.bbox[2] = frag.bbox[0] + offset;
    frag
}
