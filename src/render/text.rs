//! Plain text rendering for merged lines.

use crate::model::LineRecord;

/// Join line contents with newlines, in the order given.
pub fn to_text(lines: &[LineRecord]) -> String {
    lines
        .iter()
        .map(|l| l.content.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
