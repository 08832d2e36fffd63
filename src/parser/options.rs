//! Interpreter and text-processing options.
//!
//! The pruning thresholds are heuristics tuned against real producer output,
//! expressed as fractions of the viewport height. Keep the ratios stable:
//! existing visual output depends on them.

/// Options for the vector path interpreter.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterOptions {
    /// Page height in PDF units, used for the y flip and all prune ratios
    pub viewport_height: f64,

    /// Horizontal scale from PDF units to render units
    pub scale_x: f64,

    /// Vertical scale from PDF units to render units
    pub scale_y: f64,

    /// A jump longer than this fraction of the height starts an implicit sub-path
    pub jump_ratio: f64,

    /// Two-point unfilled paths longer than this fraction are dropped
    pub beam_ratio: f64,

    /// Unfilled paths spanning more than this fraction are dropped when short
    pub needle_ratio: f64,

    /// Sub-paths with fewer segments are dropped
    pub min_segments: usize,

    /// "Short" threshold for the needle rule
    pub needle_max_segments: usize,

    /// Apply the jump split to filled paths too (filled contours stay whole by default)
    pub split_filled_jumps: bool,
}

impl InterpreterOptions {
    /// Create options for a viewport of the given height.
    pub fn new(viewport_height: f64) -> Self {
        Self {
            viewport_height,
            ..Self::default()
        }
    }

    /// Set both scale factors.
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Set the jump ratio.
    pub fn with_jump_ratio(mut self, ratio: f64) -> Self {
        self.jump_ratio = ratio;
        self
    }

    /// Set the beam ratio.
    pub fn with_beam_ratio(mut self, ratio: f64) -> Self {
        self.beam_ratio = ratio;
        self
    }

    /// Set the needle ratio.
    pub fn with_needle_ratio(mut self, ratio: f64) -> Self {
        self.needle_ratio = ratio;
        self
    }

    /// Split filled paths at jumps as well.
    pub fn with_split_filled_jumps(mut self, split: bool) -> Self {
        self.split_filled_jumps = split;
        self
    }

    /// Absolute jump distance.
    pub fn jump_threshold(&self) -> f64 {
        self.viewport_height * self.jump_ratio
    }

    /// Absolute beam length.
    pub fn beam_threshold(&self) -> f64 {
        self.viewport_height * self.beam_ratio
    }

    /// Absolute needle extent.
    pub fn needle_threshold(&self) -> f64 {
        self.viewport_height * self.needle_ratio
    }
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            viewport_height: 792.0,
            scale_x: 1.0,
            scale_y: 1.0,
            jump_ratio: 0.4,
            beam_ratio: 0.5,
            needle_ratio: 0.8,
            min_segments: 2,
            needle_max_segments: 5,
            split_filled_jumps: false,
        }
    }
}

/// Options for turning raw glyph runs into fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    /// Page height in PDF units
    pub viewport_height: f64,

    /// Horizontal scale from PDF units to render units
    pub scale_x: f64,

    /// Vertical scale from PDF units to render units
    pub scale_y: f64,

    /// Baseline-to-top offset as a fraction of the font size
    pub cap_height_ratio: f64,

    /// Size used when the run matrix has no scale component
    pub default_font_size: f64,

    /// Fragments per UI block
    pub chunk_size: usize,

    /// Family used when no style hint names one
    pub fallback_family: String,
}

impl TextOptions {
    /// Create options for a viewport of the given height.
    pub fn new(viewport_height: f64) -> Self {
        Self {
            viewport_height,
            ..Self::default()
        }
    }

    /// Set both scale factors.
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Set the block chunk size (minimum 1).
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            viewport_height: 792.0,
            scale_x: 1.0,
            scale_y: 1.0,
            cap_height_ratio: 0.82,
            default_font_size: 12.0,
            chunk_size: 10,
            fallback_family: "sans-serif".to_string(),
        }
    }
}
