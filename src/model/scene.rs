//! Scene graph handed to the renderer.

use serde::{Deserialize, Serialize};

use super::shape::{ImageRecord, ShapeRecord};
use super::text::{LineRecord, TextFragment};

/// A drawable node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneNode {
    /// A painted vector path
    Shape(ShapeRecord),
    /// An image placement
    Image(ImageRecord),
    /// A raw text fragment not yet merged into a line
    Text(TextFragment),
    /// A reconstructed text line
    Line(LineRecord),
}

impl SceneNode {
    /// Check if the node is an unmerged text fragment.
    pub fn is_text(&self) -> bool {
        matches!(self, SceneNode::Text(_))
    }

    /// Node identifier.
    pub fn id(&self) -> &str {
        match self {
            SceneNode::Shape(s) => &s.id,
            SceneNode::Image(i) => &i.id,
            SceneNode::Text(t) => &t.id,
            SceneNode::Line(l) => &l.id,
        }
    }
}

/// Ordered list of nodes for one page, painted back to front.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneGraph {
    /// Nodes in paint order
    pub nodes: Vec<SceneNode>,
}

impl SceneGraph {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node.
    pub fn push(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over the line nodes.
    pub fn lines(&self) -> impl Iterator<Item = &LineRecord> {
        self.nodes.iter().filter_map(|n| match n {
            SceneNode::Line(l) => Some(l),
            _ => None,
        })
    }

    /// Iterate over the shape nodes.
    pub fn shapes(&self) -> impl Iterator<Item = &ShapeRecord> {
        self.nodes.iter().filter_map(|n| match n {
            SceneNode::Shape(s) => Some(s),
            _ => None,
        })
    }
}

impl FromIterator<SceneNode> for SceneGraph {
    fn from_iter<I: IntoIterator<Item = SceneNode>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
