//! Options for line merging, reflow and fit scaling.

/// Order in which merged lines are returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineOrder {
    /// Greatest `bbox.y0` first
    #[default]
    Descending,
    /// Smallest `bbox.y0` first (top of a top-down page first)
    Ascending,
}

/// Options for the line merger.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    /// Fragments whose baselines differ by less than this share a group
    pub baseline_tolerance: f64,

    /// A gap wider than this many ems of the line's size starts a new line
    pub gap_em_ratio: f64,

    /// A gap wider than this (in render units) gets a space when merged
    pub space_gap: f64,

    /// Drop substring fragments painted over a longer one
    pub dedupe_overlaps: bool,

    /// Max difference of top/bottom edges for the overlap check
    pub overlap_tolerance: f64,

    /// Min horizontal coverage for the overlap check
    pub overlap_coverage: f64,

    /// Output order of lines
    pub line_order: LineOrder,
}

impl MergeOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the baseline tolerance.
    pub fn with_baseline_tolerance(mut self, tolerance: f64) -> Self {
        self.baseline_tolerance = tolerance;
        self
    }

    /// Set the line-break gap ratio.
    pub fn with_gap_em_ratio(mut self, ratio: f64) -> Self {
        self.gap_em_ratio = ratio;
        self
    }

    /// Enable or disable overlap de-duplication.
    pub fn with_dedupe_overlaps(mut self, enabled: bool) -> Self {
        self.dedupe_overlaps = enabled;
        self
    }

    /// Set the line order.
    pub fn with_line_order(mut self, order: LineOrder) -> Self {
        self.line_order = order;
        self
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            baseline_tolerance: 2.0,
            gap_em_ratio: 0.5,
            space_gap: 1.0,
            dedupe_overlaps: true,
            overlap_tolerance: 3.0,
            overlap_coverage: 0.8,
            line_order: LineOrder::Descending,
        }
    }
}

/// Options for the reflow engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflowOptions {
    /// Line advance as a multiple of the font size (metrics path)
    pub line_height_ratio: f64,

    /// Line advance as a multiple of the font size (estimate path)
    pub estimate_line_height_ratio: f64,

    /// Average character width in ems (estimate path)
    pub estimate_char_ratio: f64,

    /// Width in 1/100 em for characters missing from the metrics table
    pub fallback_char_width: f64,

    /// Width given to the synthetic item of each reflowed line
    pub placeholder_width: f64,

    /// Start the first line at `indent_x` on the metrics path as well
    pub honor_first_line_indent: bool,
}

impl ReflowOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `indent_x` for the first line on the metrics path.
    pub fn with_first_line_indent(mut self, honor: bool) -> Self {
        self.honor_first_line_indent = honor;
        self
    }

    /// Set the metrics-path line height ratio.
    pub fn with_line_height_ratio(mut self, ratio: f64) -> Self {
        self.line_height_ratio = ratio;
        self
    }
}

impl Default for ReflowOptions {
    fn default() -> Self {
        Self {
            line_height_ratio: 1.2,
            estimate_line_height_ratio: 1.25,
            estimate_char_ratio: 0.5,
            fallback_char_width: 50.0,
            placeholder_width: 100.0,
            honor_first_line_indent: false,
        }
    }
}

/// Clamp policy for [`fit_ratio`](super::fit_ratio).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Smallest scale returned
    pub min_scale: f64,
    /// Largest scale returned
    pub max_scale: f64,
    /// Subtracted from the target width before dividing
    pub safety_cushion: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            min_scale: 0.75,
            max_scale: 1.1,
            safety_cushion: 0.5,
        }
    }
}
