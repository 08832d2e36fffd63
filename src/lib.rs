//! # pdfscene
//!
//! Turns a PDF page's low-level drawing operators into an editable scene.
//!
//! The crate consumes the output of an upstream content-stream tokenizer
//! (numeric operator lists and positioned glyph runs) and produces vector
//! shapes, image placements and reconstructed text lines ready for a
//! renderer or editor.
//!
//! ## Quick Start
//!
//! ```
//! use pdfscene::{JsonFormat, SceneBuilder, SceneOptions};
//!
//! fn main() -> pdfscene::Result<()> {
//!     let page = r#"{
//!         "operators": [
//!             {"fn": 19, "args": [0, 0, 10, 10], "index": 0},
//!             {"fn": 22, "args": [], "index": 1}
//!         ],
//!         "glyphRuns": [
//!             {"transform": [12, 0, 0, 12, 72, 700], "str": "Hello", "width": 30, "fontName": "F1"}
//!         ]
//!     }"#;
//!
//!     let scene = SceneBuilder::new(SceneOptions::new(792.0)).build_from_json(page)?;
//!     assert_eq!(scene.shapes.len(), 1);
//!     assert_eq!(scene.lines[0].content, "Hello");
//!
//!     let json = scene.to_json(JsonFormat::Compact)?;
//!     assert!(json.starts_with(r#"{"nodes":"#));
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Vector interpreter**: graphics-state stack, CTM composition, batched paths
//! - **Artifact pruning**: jump splitting plus beam and needle filters
//! - **Line merging**: baseline grouping, gap detection, duplicate removal
//! - **Reflow**: greedy line breaking with font metrics or estimates
//! - **Parallel processing**: Uses Rayon for multi-page input

pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use layout::{
    fit_ratio, FitOptions, FontSpec, LineMerger, LineOrder, MergeOptions, MetricsMeasurer,
    ReflowEngine, ReflowLine, ReflowOptions, TextMeasurer,
};
pub use model::{
    BBox, BlockLine, BlockStyle, BlockType, FontMetrics, FontWeight, GlyphMetrics, ImageRecord,
    LineRecord, PathSegment, SceneGraph, SceneNode, SemanticBlock, ShapeRecord, TextBlockRecord,
    TextFragment,
};
pub use parser::{
    InterpreterOptions, InterpreterStats, Operator, RawGlyphRun, RawOperator, TextOptions,
    TextProcessor, TextStyleHints, VectorProcessor,
};
pub use render::JsonFormat;

use serde::{Deserialize, Serialize};

/// Upstream data for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInput {
    /// Operator list from the content-stream tokenizer
    #[serde(default)]
    pub operators: Vec<RawOperator>,

    /// Positioned glyph runs from the text-extraction layer
    #[serde(default)]
    pub glyph_runs: Vec<RawGlyphRun>,

    /// Style hints keyed by font resource name
    #[serde(default)]
    pub styles: TextStyleHints,
}

impl PageInput {
    /// Parse page input from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Options for building one page scene.
#[derive(Debug, Clone)]
pub struct SceneOptions {
    /// Vector interpreter options
    pub interpreter: InterpreterOptions,
    /// Glyph-run processing options
    pub text: TextOptions,
    /// Line merging options
    pub merge: MergeOptions,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            interpreter: InterpreterOptions::default(),
            text: TextOptions::default(),
            merge: MergeOptions::default().with_line_order(LineOrder::Ascending),
        }
    }
}

impl SceneOptions {
    /// Create options for a page of the given height.
    ///
    /// Glyph runs are flipped into top-down render space, so lines are
    /// ordered by ascending `bbox.y0` to come out top of page first.
    pub fn new(viewport_height: f64) -> Self {
        Self {
            interpreter: InterpreterOptions::new(viewport_height),
            text: TextOptions::new(viewport_height),
            merge: MergeOptions::default().with_line_order(LineOrder::Ascending),
        }
    }

    /// Check that the page geometry is usable.
    pub fn validate(&self) -> Result<()> {
        let dims = [
            ("viewport height", self.interpreter.viewport_height),
            ("scale x", self.interpreter.scale_x),
            ("scale y", self.interpreter.scale_y),
            ("text viewport height", self.text.viewport_height),
            ("text scale x", self.text.scale_x),
            ("text scale y", self.text.scale_y),
        ];
        for (name, value) in dims {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidArgument(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Set the render scale for both geometry and text.
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.interpreter = self.interpreter.with_scale(scale_x, scale_y);
        self.text = self.text.with_scale(scale_x, scale_y);
        self
    }

    /// Replace the interpreter options.
    pub fn with_interpreter(mut self, options: InterpreterOptions) -> Self {
        self.interpreter = options;
        self
    }

    /// Replace the text options.
    pub fn with_text(mut self, options: TextOptions) -> Self {
        self.text = options;
        self
    }

    /// Replace the merge options.
    pub fn with_merge(mut self, options: MergeOptions) -> Self {
        self.merge = options;
        self
    }
}

/// Everything built for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageScene {
    /// Painted vector paths
    pub shapes: Vec<ShapeRecord>,
    /// Image placements
    pub images: Vec<ImageRecord>,
    /// Coarse fragment blocks for the editor UI
    pub blocks: Vec<TextBlockRecord>,
    /// Reconstructed text lines
    pub lines: Vec<LineRecord>,
    /// Interpreter counters
    pub stats: InterpreterStats,
}

impl PageScene {
    /// Scene graph in paint order: shapes, images, then lines.
    pub fn to_scene_graph(&self) -> SceneGraph {
        self.shapes
            .iter()
            .cloned()
            .map(SceneNode::Shape)
            .chain(self.images.iter().cloned().map(SceneNode::Image))
            .chain(self.lines.iter().cloned().map(SceneNode::Line))
            .collect()
    }

    /// Render the scene graph as JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.to_scene_graph(), format)
    }

    /// Line contents joined by newlines.
    pub fn plain_text(&self) -> String {
        render::to_text(&self.lines)
    }
}

/// Builds page scenes.
///
/// # Example
///
/// ```
/// use pdfscene::{PageInput, RawOperator, SceneBuilder, SceneOptions};
/// use serde_json::json;
///
/// let input = PageInput {
///     operators: vec![
///         RawOperator::new(13, vec![json!(0), json!(0)], 0),
///         RawOperator::new(14, vec![json!(10), json!(0)], 1),
///         RawOperator::new(20, vec![], 2),
///     ],
///     ..Default::default()
/// };
/// let scene = SceneBuilder::new(SceneOptions::new(100.0)).build(&input);
/// assert_eq!(scene.shapes[0].id, "path_2_0");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    options: SceneOptions,
}

impl SceneBuilder {
    /// Create a builder.
    pub fn new(options: SceneOptions) -> Self {
        Self { options }
    }

    /// The builder's options.
    pub fn options(&self) -> &SceneOptions {
        &self.options
    }

    /// Interpret operators, convert glyph runs and merge lines.
    pub fn build(&self, input: &PageInput) -> PageScene {
        let text = TextProcessor::new(self.options.text.clone());
        let blocks = text.process_items(&input.glyph_runs, &input.styles);
        self.assemble(input, blocks)
    }

    /// Like [`build`](Self::build), re-measuring fragments with `measurer` first.
    pub fn build_with_measurer(&self, input: &PageInput, measurer: &dyn TextMeasurer) -> PageScene {
        let text = TextProcessor::new(self.options.text.clone());
        let blocks = text.process_items(&input.glyph_runs, &input.styles);
        let blocks = parser::refine_metrics(blocks, measurer);
        self.assemble(input, blocks)
    }

    /// Parse a [`PageInput`] from JSON and build it.
    ///
    /// Fails on invalid JSON or on options rejected by [`SceneOptions::validate`].
    pub fn build_from_json(&self, json: &str) -> Result<PageScene> {
        self.options.validate()?;
        let input = PageInput::from_json(json)?;
        Ok(self.build(&input))
    }

    /// Line order comes from `options.merge.line_order`. Fragments are in
    /// top-down render space here, so the scene options default to
    /// [`LineOrder::Ascending`] for reading order.
    fn assemble(&self, input: &PageInput, blocks: Vec<TextBlockRecord>) -> PageScene {
        let mut vector = VectorProcessor::new(self.options.interpreter.clone());
        vector.process_all(&input.operators);
        let out = vector.finish();

        let fragments = blocks.iter().flat_map(|b| b.children.iter().cloned()).collect();
        let lines = LineMerger::new(self.options.merge.clone()).merge_fragments(fragments);

        PageScene {
            shapes: out.shapes,
            images: out.images,
            blocks,
            lines,
            stats: out.stats,
        }
    }
}

/// Build many pages. Each page owns its interpreter state, so pages are
/// processed in parallel when the `parallel` feature is enabled.
pub fn extract_pages(pages: &[PageInput], options: &SceneOptions) -> Vec<PageScene> {
    let builder = SceneBuilder::new(options.clone());

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        pages.par_iter().map(|p| builder.build(p)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        pages.iter().map(|p| builder.build(p)).collect()
    }
}
