//! Text-level types: positioned fragments, merged lines, coarse UI blocks.

use serde::{Deserialize, Serialize};

/// Axis-aligned box `[x0, y0, x1, y1]` in render space.
pub type BBox = [f64; 4];

/// RGB colour with components in `0..=1`.
pub type Rgb = [f64; 3];

/// Font weight inferred from a font name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontWeight {
    /// Regular weight
    #[default]
    #[serde(rename = "normal")]
    Normal,
    /// Medium / semibold ("500")
    #[serde(rename = "500")]
    Medium,
    /// Bold, black, heavy
    #[serde(rename = "bold")]
    Bold,
}

/// Advance of one character inside a fragment, relative to the fragment's left edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    /// The character
    pub ch: char,

    /// Offset from the fragment's x0
    pub x: f64,

    /// Advance width
    pub w: f64,
}

/// A positioned run of text with uniform style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Fragment identifier
    pub id: String,

    /// Text content
    pub content: String,

    /// Bounding box in render space (y0 < y1)
    pub bbox: BBox,

    /// Baseline origin; `bbox` is the fallback when absent
    #[serde(default)]
    pub origin: Option<[f64; 2]>,

    /// Linear part `[a, b, c, d]` of the text matrix
    #[serde(default = "identity_linear")]
    pub matrix: [f64; 4],

    /// Font name
    #[serde(default)]
    pub font: String,

    /// Font size; the sign may encode flipped text, the magnitude is the point size
    #[serde(default)]
    pub size: f64,

    /// Fill colour
    #[serde(default)]
    pub color: Rgb,

    /// Whether the font appears to be bold
    #[serde(default)]
    pub is_bold: bool,

    /// Whether the font appears to be italic
    #[serde(default)]
    pub is_italic: bool,

    /// Inferred weight (finer than `is_bold`)
    #[serde(default)]
    pub weight: FontWeight,

    /// Family to use when `font` is not available to the renderer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_family: Option<String>,

    /// Line identifier assigned by an upstream extractor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<String>,

    /// Per-character advances, filled in by metric refinement
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub glyphs: Vec<Glyph>,
}

fn identity_linear() -> [f64; 4] {
    [1.0, 0.0, 0.0, 1.0]
}

impl TextFragment {
    /// Create a fragment with default style.
    pub fn new(id: impl Into<String>, content: impl Into<String>, bbox: BBox) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            bbox,
            origin: None,
            matrix: identity_linear(),
            font: String::new(),
            size: 0.0,
            color: [0.0, 0.0, 0.0],
            is_bold: false,
            is_italic: false,
            weight: FontWeight::Normal,
            fallback_family: None,
            line_id: None,
            glyphs: Vec::new(),
        }
    }

    /// Set the baseline origin.
    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin = Some([x, y]);
        self
    }

    /// Set font name and size.
    pub fn with_font(mut self, font: impl Into<String>, size: f64) -> Self {
        self.font = font.into();
        self.size = size;
        self
    }

    /// Set the fill colour.
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Baseline y, falling back to `bbox.y0`.
    pub fn baseline_y(&self) -> f64 {
        self.origin.map(|o| o[1]).unwrap_or(self.bbox[1])
    }

    /// Left x, falling back to `bbox.x0`.
    pub fn start_x(&self) -> f64 {
        self.origin.map(|o| o[0]).unwrap_or(self.bbox[0])
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f64 {
        self.bbox[2] - self.bbox[0]
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f64 {
        self.bbox[3] - self.bbox[1]
    }

    /// Check if the fragment carries no text.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A reconstructed line of text built from one or more fragments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    /// Line identifier
    pub id: String,

    /// Concatenated fragment contents, with spaces at detected gaps
    pub content: String,

    /// Union of constituent boxes (x1 and y1 only ever widen)
    pub bbox: BBox,

    /// Origin of the first fragment
    #[serde(default)]
    pub origin: Option<[f64; 2]>,

    /// Font of the first fragment
    pub font: String,

    /// Size of the first fragment
    pub size: f64,

    /// Colour of the first fragment
    pub color: Rgb,

    /// Text matrix of the first fragment
    pub matrix: [f64; 4],

    /// Bold flag of the first fragment
    pub is_bold: bool,

    /// Italic flag of the first fragment
    pub is_italic: bool,

    /// Constituent fragments, kept for per-word restyling
    pub items: Vec<TextFragment>,
}

impl LineRecord {
    /// Start a line from its first fragment.
    pub fn start(id: impl Into<String>, first: TextFragment) -> Self {
        Self {
            id: id.into(),
            content: first.content.clone(),
            bbox: first.bbox,
            origin: first.origin,
            font: first.font.clone(),
            size: first.size,
            color: first.color,
            matrix: first.matrix,
            is_bold: first.is_bold,
            is_italic: first.is_italic,
            items: vec![first],
        }
    }

    /// Width of the line box.
    pub fn width(&self) -> f64 {
        self.bbox[2] - self.bbox[0]
    }

    /// Height of the line box.
    pub fn height(&self) -> f64 {
        self.bbox[3] - self.bbox[1]
    }

    /// The last fragment merged into the line.
    pub fn last_item(&self) -> Option<&TextFragment> {
        self.items.last()
    }
}

/// A coarse group of fragments for the editor UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlockRecord {
    /// Block identifier
    pub id: String,

    /// Min/max envelope of the children
    pub bbox: BBox,

    /// Fragments in extraction order
    pub children: Vec<TextFragment>,
}

impl TextBlockRecord {
    /// Build a block whose box envelopes its children.
    pub fn from_children(id: impl Into<String>, children: Vec<TextFragment>) -> Self {
        let bbox = envelope(children.iter().map(|c| c.bbox)).unwrap_or([0.0; 4]);
        Self {
            id: id.into(),
            bbox,
            children,
        }
    }
}

/// Min/max envelope of a set of boxes.
pub fn envelope<I: IntoIterator<Item = BBox>>(boxes: I) -> Option<BBox> {
    boxes.into_iter().fold(None, |acc, b| match acc {
        None => Some(b),
        Some(a) => Some([a[0].min(b[0]), a[1].min(b[1]), a[2].max(b[2]), a[3].max(b[3])]),
    })
}
