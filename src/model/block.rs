//! Semantic blocks and font metrics consumed by the reflow engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::text::{BBox, TextFragment};

/// Kind of semantic block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    /// A regular paragraph
    #[default]
    Paragraph,
    /// A list item (marker line plus wrapped continuation)
    ListItem,
    /// A heading
    Heading,
    /// Anything else
    #[serde(other)]
    Other,
}

/// Font and size applied to a whole block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStyle {
    /// Font name, matched against [`FontMetrics::name`]
    pub font: String,

    /// Font size
    pub size: f64,
}

/// One line of a block; only the first line's `y` anchors a reflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockLine {
    /// Baseline y of the line
    pub y: f64,

    /// Text of the line
    #[serde(default)]
    pub content: String,

    /// Fragments making up the line
    #[serde(default)]
    pub items: Vec<TextFragment>,
}

/// A paragraph or list item as held by the editor's document model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticBlock {
    /// Block identifier
    pub id: String,

    /// Block box `[x0, y0, x1, y1]`
    pub bbox: BBox,

    /// X where the first line starts
    pub indent_x: f64,

    /// X where wrapped continuation lines start (defaults to `indent_x`)
    #[serde(default)]
    pub text_x: Option<f64>,

    /// Block kind
    #[serde(rename = "type", default)]
    pub block_type: BlockType,

    /// Block style
    pub style: BlockStyle,

    /// Existing lines
    #[serde(default)]
    pub lines: Vec<BlockLine>,
}

impl SemanticBlock {
    /// Continuation indent, falling back to the first-line indent.
    pub fn continuation_x(&self) -> f64 {
        self.text_x.unwrap_or(self.indent_x)
    }

    /// Baseline of the first line, if the block has any lines.
    pub fn first_line_y(&self) -> Option<f64> {
        self.lines.first().map(|l| l.y)
    }
}

/// Glyph metrics harvested from an embedded font.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlyphMetrics {
    /// Advance widths per character, in 1/100 em
    #[serde(default)]
    pub widths: HashMap<String, f64>,

    /// Ascender, in font units
    #[serde(default)]
    pub ascender: f64,

    /// Descender, in font units
    #[serde(default)]
    pub descender: f64,
}

impl GlyphMetrics {
    /// Width of `ch` in 1/100 em. Zero and missing entries both read as absent.
    pub fn width_of(&self, ch: char) -> Option<f64> {
        let mut buf = [0u8; 4];
        let key: &str = ch.encode_utf8(&mut buf);
        self.widths
            .get(key)
            .copied()
            .filter(|w| *w != 0.0 && w.is_finite())
    }
}

/// Metrics table entry for one font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontMetrics {
    /// Font name
    pub name: String,

    /// Metrics, absent when the font could not be harvested
    #[serde(default)]
    pub metrics: Option<GlyphMetrics>,
}

impl FontMetrics {
    /// Create an entry with metrics.
    pub fn new(name: impl Into<String>, metrics: GlyphMetrics) -> Self {
        Self {
            name: name.into(),
            metrics: Some(metrics),
        }
    }

    /// Create an entry for a font whose metrics are unknown.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metrics: None,
        }
    }
}
