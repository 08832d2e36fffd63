//! Fragment-to-line merging.
//!
//! Text extractors hand out one fragment per positioned run, often per glyph.
//! The merger removes double-painted duplicates, groups fragments by
//! baseline, and walks each group left to right, breaking wherever the
//! horizontal gap exceeds half an em.

use std::collections::HashSet;

use super::options::{LineOrder, MergeOptions};
use crate::model::{LineRecord, SceneNode, TextFragment};

/// JavaScript-style rounding (halves round up).
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// A baseline group built during merging.
#[derive(Debug, Clone)]
struct BaselineGroup {
    key: f64,
    items: Vec<TextFragment>,
}

/// Merges fragments into lines.
#[derive(Debug, Clone, Default)]
pub struct LineMerger {
    options: MergeOptions,
}

impl LineMerger {
    /// Create a merger.
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    /// The merger's options.
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merge scene nodes: non-text nodes pass through first, in input order,
    /// followed by the lines built from the text fragments.
    pub fn merge_nodes(&self, nodes: Vec<SceneNode>) -> Vec<SceneNode> {
        let (text, mut other): (Vec<SceneNode>, Vec<SceneNode>) =
            nodes.into_iter().partition(SceneNode::is_text);
        if text.is_empty() {
            return other;
        }

        let fragments = text
            .into_iter()
            .filter_map(|n| match n {
                SceneNode::Text(t) => Some(t),
                _ => None,
            })
            .collect();

        other.extend(self.merge_fragments(fragments).into_iter().map(SceneNode::Line));
        other
    }

    /// Merge fragments into lines.
    pub fn merge_fragments(&self, fragments: Vec<TextFragment>) -> Vec<LineRecord> {
        if fragments.is_empty() {
            return Vec::new();
        }
        let input = fragments.len();

        let mut fragments = dedupe_exact(fragments);
        if self.options.dedupe_overlaps {
            fragments = self.dedupe_overlaps(fragments);
        }
        let kept = fragments.len();

        let groups = self.group_by_baseline(fragments);
        let group_count = groups.len();

        let mut lines: Vec<LineRecord> = groups
            .into_iter()
            .flat_map(|g| self.split_group(g.items))
            .collect();

        match self.options.line_order {
            LineOrder::Descending => lines.sort_by(|a, b| b.bbox[1].total_cmp(&a.bbox[1])),
            LineOrder::Ascending => lines.sort_by(|a, b| a.bbox[1].total_cmp(&b.bbox[1])),
        }

        log::debug!(
            "LineMerger: {} fragments ({} after de-duplication) -> {} baseline groups -> {} lines",
            input,
            kept,
            group_count,
            lines.len()
        );
        lines
    }

    /// Drop fragments whose content is contained in an already kept, longer
    /// fragment painted at nearly the same place. Longer fragments are
    /// decided first; survivors keep their input order.
    fn dedupe_overlaps(&self, fragments: Vec<TextFragment>) -> Vec<TextFragment> {
        let mut order: Vec<usize> = (0..fragments.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(fragments[i].content.chars().count()));

        let mut kept: Vec<usize> = Vec::with_capacity(fragments.len());
        for i in order {
            let item = &fragments[i];
            let duplicate = kept
                .iter()
                .any(|&k| self.is_overlap_duplicate(item, &fragments[k]));
            if !duplicate {
                kept.push(i);
            }
        }

        let mut keep = vec![false; fragments.len()];
        for i in kept {
            keep[i] = true;
        }
        fragments
            .into_iter()
            .zip(keep)
            .filter_map(|(f, k)| k.then_some(f))
            .collect()
    }

    fn is_overlap_duplicate(&self, item: &TextFragment, existing: &TextFragment) -> bool {
        let [ix0, iy0, ix1, iy1] = item.bbox;
        let [ex0, ey0, ex1, ey1] = existing.bbox;
        let tol = self.options.overlap_tolerance;

        let vertical = (iy0 - ey0).abs() < tol && (iy1 - ey1).abs() < tol;
        if !vertical || !existing.content.contains(item.content.as_str()) {
            return false;
        }

        let inter = (ix1.min(ex1) - ix0.max(ex0)).max(0.0);
        let width = ix1 - ix0;
        let coverage = if width > 0.0 { inter / width } else { 1.0 };
        coverage > self.options.overlap_coverage
    }

    /// First-match grouping: each fragment joins the first existing group
    /// whose key lies within tolerance of its baseline.
    fn group_by_baseline(&self, fragments: Vec<TextFragment>) -> Vec<BaselineGroup> {
        let mut groups: Vec<BaselineGroup> = Vec::new();
        for frag in fragments {
            let y = frag.baseline_y();
            match groups
                .iter_mut()
                .find(|g| (g.key - y).abs() < self.options.baseline_tolerance)
            {
                Some(group) => group.items.push(frag),
                None => groups.push(BaselineGroup {
                    key: round_half_up(y * 2.0) / 2.0,
                    items: vec![frag],
                }),
            }
        }
        groups
    }

    /// Sort one baseline group left to right and cut it at wide gaps.
    fn split_group(&self, mut items: Vec<TextFragment>) -> Vec<LineRecord> {
        items.sort_by(|a, b| a.start_x().total_cmp(&b.start_x()));

        let mut lines = Vec::new();
        let mut current: Option<LineRecord> = None;

        for frag in items {
            let Some(mut line) = current.take() else {
                current = Some(LineRecord::start(line_id(&frag, 0), frag));
                continue;
            };

            let (prev_x1, prev_ends_ws) = match line.last_item() {
                Some(prev) => (
                    prev.bbox[2],
                    prev.content.chars().last().is_some_and(char::is_whitespace),
                ),
                None => (line.bbox[2], false),
            };
            let gap = frag.start_x() - prev_x1;

            if gap > self.options.gap_em_ratio * line.size.abs() {
                lines.push(line);
                current = Some(LineRecord::start(line_id(&frag, lines.len()), frag));
                continue;
            }

            let starts_ws = frag.content.chars().next().is_some_and(char::is_whitespace);
            if gap > self.options.space_gap && !prev_ends_ws && !starts_ws {
                line.content.push(' ');
            }
            line.content.push_str(&frag.content);
            line.bbox = [
                line.bbox[0].min(frag.bbox[0]),
                line.bbox[1].min(frag.bbox[1]),
                line.bbox[2].max(frag.bbox[2]),
                line.bbox[3].max(frag.bbox[3]),
            ];
            line.items.push(frag);
            current = Some(line);
        }

        if let Some(line) = current {
            lines.push(line);
        }
        lines
    }
}

/// Id for the `n`-th line cut from a baseline group.
fn line_id(first: &TextFragment, n: usize) -> String {
    match &first.line_id {
        Some(id) if n == 0 => id.clone(),
        Some(id) => format!("{}-{}", id, n),
        None if !first.id.is_empty() => first.id.clone(),
        None => format!(
            "line-{}-{}",
            round_half_up(first.bbox[0]),
            round_half_up(first.bbox[1])
        ),
    }
}

/// Drop fragments repeating an earlier `(content, round(x0), round(y0))`.
fn dedupe_exact(fragments: Vec<TextFragment>) -> Vec<TextFragment> {
    let mut seen = HashSet::new();
    fragments
        .into_iter()
        .filter(|f| {
            let key = (
                f.content.clone(),
                round_half_up(f.bbox[0]) as i64,
                round_half_up(f.bbox[1]) as i64,
            );
            seen.insert(key)
        })
        .collect()
}

/// Merge fragments with default options.
pub fn merge_fragments_into_lines(fragments: Vec<TextFragment>) -> Vec<LineRecord> {
    LineMerger::default().merge_fragments(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShapeRecord;

    fn frag(id: &str, content: &str, x0: f64, x1: f64, baseline: f64) -> TextFragment {
        TextFragment::new(id, content, [x0, baseline - 10.0, x1, baseline])
            .with_origin(x0, baseline)
            .with_font("F1", 10.0)
    }

    #[test]
    fn test_baseline_tolerance() {
        let merger = LineMerger::default();
        let lines = merger.merge_fragments(vec![
            frag("a", "A", 0.0, 5.0, 100.0),
            frag("b", "B", 5.0, 10.0, 101.5),
        ]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].content, "AB");

        let lines = merger.merge_fragments(vec![
            frag("a", "A", 0.0, 5.0, 100.0),
            frag("b", "B", 5.0, 10.0, 103.0),
        ]);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_first_match_grouping() {
        let merger = LineMerger::default();
        let groups = merger.group_by_baseline(vec![
            frag("a", "a", 0.0, 1.0, 100.0),
            frag("b", "b", 0.0, 1.0, 103.0),
            frag("c", "c", 0.0, 1.0, 101.6),
        ]);
        // 101.6 is within tolerance of both 100 and 103; the first group wins
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].items.len(), 2);
        assert_eq!(groups[0].items[1].id, "c");
        assert_eq!(groups[1].key, 103.0);
    }

    #[test]
    fn test_gap_threshold() {
        let merger = LineMerger::default();
        let lines = merger.merge_fragments(vec![
            frag("a", "Hello", 20.0, 50.0, 100.0),
            frag("b", "World", 56.0, 80.0, 100.0),
        ]);
        assert_eq!(lines.len(), 2);

        let lines = merger.merge_fragments(vec![
            frag("a", "Hello", 20.0, 50.0, 100.0),
            frag("b", "World", 54.0, 80.0, 100.0),
        ]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].content, "Hello World");
        assert_eq!(lines[0].items.len(), 2);
        assert_eq!(lines[0].bbox, [20.0, 90.0, 80.0, 100.0]);
    }

    #[test]
    fn test_no_double_space() {
        let merger = LineMerger::default();
        let lines = merger.merge_fragments(vec![
            frag("a", "Hello ", 20.0, 50.0, 100.0),
            frag("b", "World", 53.0, 80.0, 100.0),
        ]);
        assert_eq!(lines[0].content, "Hello World");
    }

    #[test]
    fn test_sorted_left_to_right() {
        let merger = LineMerger::default();
        let lines = merger.merge_fragments(vec![
            frag("b", "b", 10.0, 15.0, 100.0),
            frag("a", "a", 5.0, 10.0, 100.0),
        ]);
        assert_eq!(lines[0].content, "ab");
        assert_eq!(lines[0].id, "a");
    }

    #[test]
    fn test_exact_dedupe() {
        let merger = LineMerger::default();
        let lines = merger.merge_fragments(vec![
            frag("a", "Bold", 10.2, 30.0, 100.0),
            frag("b", "Bold", 9.8, 30.0, 100.0),
        ]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].content, "Bold");
    }

    #[test]
    fn test_overlap_dedupe() {
        let merger = LineMerger::default();
        let lines = merger.merge_fragments(vec![
            frag("a", "ell", 12.0, 28.0, 100.0),
            frag("b", "Hello", 10.0, 35.0, 100.0),
        ]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].content, "Hello");

        let merger = LineMerger::new(MergeOptions::default().with_dedupe_overlaps(false));
        let lines = merger.merge_fragments(vec![
            frag("a", "ell", 12.0, 28.0, 100.0),
            frag("b", "Hello", 10.0, 35.0, 100.0),
        ]);
        assert_eq!(lines[0].items.len(), 2);
    }

    #[test]
    fn test_line_order() {
        let input = vec![
            frag("top", "top", 0.0, 10.0, 50.0),
            frag("bottom", "bottom", 0.0, 10.0, 500.0),
        ];
        let lines = LineMerger::default().merge_fragments(input.clone());
        assert_eq!(lines[0].id, "bottom");

        let merger = LineMerger::new(MergeOptions::default().with_line_order(LineOrder::Ascending));
        let lines = merger.merge_fragments(input);
        assert_eq!(lines[0].id, "top");
    }

    #[test]
    fn test_line_id_suffix() {
        let mut a = frag("a", "A", 0.0, 10.0, 100.0);
        let mut b = frag("b", "B", 40.0, 50.0, 100.0);
        a.line_id = Some("L1".to_string());
        b.line_id = Some("L1".to_string());
        let lines = LineMerger::default().merge_fragments(vec![a, b]);
        let ids: Vec<&str> = lines.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["L1", "L1-1"]);
    }

    #[test]
    fn test_merge_nodes_puts_other_first() {
        let shape = ShapeRecord {
            id: "path_0_0".to_string(),
            path: Vec::new(),
            thickness: 1.0,
            stroke_color: "#000000".to_string(),
            fill_color: "#000000".to_string(),
            opacity: 1.0,
            is_filled: false,
            is_stroked: true,
        };
        let nodes = vec![
            SceneNode::Text(frag("a", "A", 0.0, 5.0, 100.0)),
            SceneNode::Shape(shape),
        ];
        let merged = LineMerger::default().merge_nodes(nodes);
        assert_eq!(merged.len(), 2);
        assert!(matches!(merged[0], SceneNode::Shape(_)));
        assert!(matches!(merged[1], SceneNode::Line(_)));
    }

    #[test]
    fn test_fallback_to_bbox() {
        let a = TextFragment::new("a", "x", [0.0, 100.0, 5.0, 110.0]).with_font("F", 10.0);
        let b = TextFragment::new("b", "y", [5.0, 101.0, 9.0, 111.0]).with_font("F", 10.0);
        let lines = merge_fragments_into_lines(vec![a, b]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].bbox, [0.0, 100.0, 9.0, 111.0]);
    }
}
