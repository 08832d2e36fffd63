//! Operator interpretation and glyph-run processing.

mod geometry;
mod operators;
mod options;
mod text;
mod vector;

pub use geometry::{
    apply_transform, comps_to_hex, multiply_matrices, number_from_value, sanitize_color_comps,
    Matrix, Point, IDENTITY,
};
pub use operators::{
    ops, path_ops, ColorTarget, FillRule, GStateParams, Operator, PaintOp, RawOperator,
};
pub use options::{InterpreterOptions, TextOptions};
pub use text::{
    font_style_from_name, refine_metrics, RawGlyphRun, TextProcessor, TextStyleHint,
    TextStyleHints,
};
pub use vector::{
    split_sub_paths, GraphicsState, InterpreterStats, SavedState, VectorOutput, VectorProcessor,
};
