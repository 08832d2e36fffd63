//! Vector shape and image placement records.

use serde::{Deserialize, Serialize};

use super::text::BBox;

/// One step of a path, already transformed into render space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathSegment {
    /// Start a new sub-path
    Move { x: f64, y: f64 },
    /// Straight line to a point
    Line { x: f64, y: f64 },
    /// Cubic Bezier curve
    Curve {
        cp1x: f64,
        cp1y: f64,
        cp2x: f64,
        cp2y: f64,
        x: f64,
        y: f64,
    },
    /// Close the current sub-path
    Close,
}

impl PathSegment {
    /// End point of the segment; `None` for `Close`.
    pub fn end_point(&self) -> Option<(f64, f64)> {
        match *self {
            PathSegment::Move { x, y }
            | PathSegment::Line { x, y }
            | PathSegment::Curve { x, y, .. } => Some((x, y)),
            PathSegment::Close => None,
        }
    }

    /// Check if this segment starts a sub-path.
    pub fn is_move(&self) -> bool {
        matches!(self, PathSegment::Move { .. })
    }

    /// Check if this segment closes a sub-path.
    pub fn is_close(&self) -> bool {
        matches!(self, PathSegment::Close)
    }
}

/// A painted sub-path emitted by the interpreter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeRecord {
    /// `path_<operator index>_<sub-path index>`
    pub id: String,

    /// Segments after splitting and pruning
    pub path: Vec<PathSegment>,

    /// Stroke width
    pub thickness: f64,

    /// Stroke colour (hex)
    pub stroke_color: String,

    /// Fill colour (hex)
    pub fill_color: String,

    /// Opacity (0..1)
    pub opacity: f64,

    /// Whether the path is filled
    pub is_filled: bool,

    /// Whether the path is stroked
    pub is_stroked: bool,
}

impl ShapeRecord {
    /// Bounding box of the segment end points.
    pub fn bounds(&self) -> Option<BBox> {
        bounds_of(&self.path)
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.path.len()
    }
}

/// Bounding box of the end points of `segments` (control points excluded).
pub fn bounds_of(segments: &[PathSegment]) -> Option<BBox> {
    segments
        .iter()
        .filter_map(PathSegment::end_point)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .fold(None, |acc, (x, y)| match acc {
            None => Some([x, y, x, y]),
            Some(b) => Some([b[0].min(x), b[1].min(y), b[2].max(x), b[3].max(y)]),
        })
}

/// Placement of an image XObject on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// `image_<operator index>`
    pub id: String,

    /// Resource name, when the operator carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Box of the CTM-transformed unit square in render space
    pub bbox: BBox,

    /// Opacity at paint time
    pub opacity: f64,
}
