//! Scene model types.
//!
//! This module defines the records that flow between the interpreter, the
//! line merger, the reflow engine and the external renderer/editor. All types
//! are plain data and serialize to the JSON shapes those collaborators read.

mod block;
mod scene;
mod shape;
mod text;

pub use block::{BlockLine, BlockStyle, BlockType, FontMetrics, GlyphMetrics, SemanticBlock};
pub use scene::{SceneGraph, SceneNode};
pub use shape::{bounds_of, ImageRecord, PathSegment, ShapeRecord};
pub use text::{envelope, BBox, FontWeight, Glyph, LineRecord, Rgb, TextBlockRecord, TextFragment};
