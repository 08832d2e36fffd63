//! Line reconstruction, reflow and text measurement.
//!
//! The merger turns raw fragments into [`LineRecord`](crate::model::LineRecord)s,
//! the reflow engine re-breaks edited blocks, and the measurement types give
//! both a way to size text without a rendering backend.

mod measure;
mod merger;
mod options;
mod reflow;

pub use measure::{fit_ratio, FontSpec, MetricsMeasurer, TextMeasurer};
pub use merger::{merge_fragments_into_lines, LineMerger};
pub use options::{FitOptions, LineOrder, MergeOptions, ReflowOptions};
pub use reflow::{split_words, ReflowEngine, ReflowLine};
