//! JSON rendering for page scenes.

use crate::error::{Error, Result};
use crate::model::SceneGraph;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a scene to the renderer's `{ "nodes": [...] }` document.
pub fn to_json(scene: &SceneGraph, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(scene),
        JsonFormat::Compact => serde_json::to_string(scene),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Parse a renderer document back into a scene.
pub fn from_json(json: &str) -> Result<SceneGraph> {
    Ok(serde_json::from_str(json)?)
}
