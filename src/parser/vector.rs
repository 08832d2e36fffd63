//! Vector path interpreter.
//!
//! Replays a page's operator list against a stack-based graphics state and
//! emits one [`ShapeRecord`] per painted sub-path. Producers routinely emit
//! degenerate geometry (stray beams, coordinate leaks between unrelated
//! shapes, clip paths that are never painted), so every flush runs the
//! sub-path splitting and pruning heuristics configured in
//! [`InterpreterOptions`].

use serde::Serialize;

use super::geometry::{apply_transform, comps_to_hex, multiply_matrices, Matrix, Point, IDENTITY};
use super::operators::{path_ops, ColorTarget, Operator, PaintOp, RawOperator};
use super::options::InterpreterOptions;
use crate::model::{bounds_of, ImageRecord, PathSegment, ShapeRecord};

/// State captured by `save` and reinstated by `restore`.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedState {
    pub line_width: f64,
    pub stroke_color: String,
    pub fill_color: String,
    pub opacity: f64,
    pub fill_opacity: f64,
    pub ctm: Matrix,
}

/// Mutable graphics state for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    /// Stroke width
    pub line_width: f64,
    /// Stroke colour (hex)
    pub stroke_color: String,
    /// Fill colour (hex)
    pub fill_color: String,
    /// Opacity applied to emitted shapes
    pub opacity: f64,
    /// Fill opacity
    pub fill_opacity: f64,
    /// Path under construction, in render space
    pub current_path: Vec<PathSegment>,
    /// Current transformation matrix
    pub ctm: Matrix,
    /// Whether we are between `beginText` and `endText`
    pub in_text_mode: bool,
    /// Saved states
    pub stack: Vec<SavedState>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            stroke_color: "#000000".to_string(),
            fill_color: "#000000".to_string(),
            opacity: 1.0,
            fill_opacity: 1.0,
            current_path: Vec::new(),
            ctm: IDENTITY,
            in_text_mode: false,
            stack: Vec::new(),
        }
    }
}

impl GraphicsState {
    /// Push a snapshot of everything except the path and the text-mode flag.
    pub fn save(&mut self) {
        self.stack.push(SavedState {
            line_width: self.line_width,
            stroke_color: self.stroke_color.clone(),
            fill_color: self.fill_color.clone(),
            opacity: self.opacity,
            fill_opacity: self.fill_opacity,
            ctm: self.ctm,
        });
    }

    /// Pop the last snapshot. Returns `false` (and changes nothing) when the stack is empty.
    pub fn restore(&mut self) -> bool {
        match self.stack.pop() {
            Some(saved) => {
                self.line_width = saved.line_width;
                self.stroke_color = saved.stroke_color;
                self.fill_color = saved.fill_color;
                self.opacity = saved.opacity;
                self.fill_opacity = saved.fill_opacity;
                self.ctm = saved.ctm;
                true
            }
            None => false,
        }
    }

    /// Nesting depth of `save`.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Counters collected while interpreting a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InterpreterStats {
    /// Shapes emitted
    pub paths: usize,
    /// Rectangles appended (explicit and batched)
    pub rects: usize,
    /// Colour operators applied
    pub colors: usize,
    /// Image placements emitted
    pub images: usize,
    /// Operators skipped because their operands were unusable
    pub malformed: usize,
}

/// Everything the interpreter produced for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VectorOutput {
    pub shapes: Vec<ShapeRecord>,
    pub images: Vec<ImageRecord>,
    pub stats: InterpreterStats,
}

/// Single-pass interpreter over a page's operator list.
#[derive(Debug, Clone)]
pub struct VectorProcessor {
    options: InterpreterOptions,
    state: GraphicsState,
    shapes: Vec<ShapeRecord>,
    images: Vec<ImageRecord>,
    stats: InterpreterStats,
}

impl VectorProcessor {
    /// Create an interpreter with a fresh graphics state.
    pub fn new(options: InterpreterOptions) -> Self {
        Self {
            options,
            state: GraphicsState::default(),
            shapes: Vec::new(),
            images: Vec::new(),
            stats: InterpreterStats::default(),
        }
    }

    /// Current graphics state.
    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    /// Shapes emitted so far.
    pub fn shapes(&self) -> &[ShapeRecord] {
        &self.shapes
    }

    /// Image placements emitted so far.
    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    /// Counters so far.
    pub fn stats(&self) -> InterpreterStats {
        self.stats
    }

    /// Decode and apply one raw operator.
    ///
    /// Operators with unusable operands are logged and skipped; the state is
    /// left as it was.
    pub fn process_raw(&mut self, raw: &RawOperator) {
        match Operator::decode(raw) {
            Ok(op) => self.process_operator(&op, raw.index),
            Err(e) => {
                self.stats.malformed += 1;
                log::warn!("Skipping operator at index {}: {}", raw.index, e);
            }
        }
    }

    /// Apply a whole operator list.
    pub fn process_all<'a, I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = &'a RawOperator>,
    {
        for raw in ops {
            self.process_raw(raw);
        }
    }

    /// Apply one decoded operator; `index` is its position in the list.
    pub fn process_operator(&mut self, op: &Operator, index: usize) {
        if op.is_path_construction() && self.state.in_text_mode {
            return;
        }

        match op {
            Operator::Save => self.state.save(),
            Operator::Restore => {
                if !self.state.restore() {
                    log::trace!("restore with empty stack at index {}", index);
                }
            }
            Operator::Transform(m) => {
                self.state.ctm = multiply_matrices(m, &self.state.ctm);
                log::debug!(
                    "CTM updated at index {}: move=[{}, {}] scale=[{}, {}] -> {:?}",
                    index,
                    m[4],
                    m[5],
                    m[0],
                    m[3],
                    self.state.ctm
                );
            }
            Operator::SetLineWidth(w) => self.state.line_width = *w,
            Operator::SetGState(params) => {
                if let Some(opacity) = params.opacity {
                    self.state.opacity = opacity;
                }
                if let Some(fill_opacity) = params.fill_opacity {
                    self.state.fill_opacity = fill_opacity;
                }
                log::debug!("setGState opacity: {}", self.state.opacity);
            }
            Operator::SetColor { target, comps } => {
                self.stats.colors += 1;
                let hex = comps_to_hex(comps);
                log::debug!("{:?} colour updated: {} from {:?}", target, hex, comps);
                match target {
                    ColorTarget::Stroke => self.state.stroke_color = hex,
                    ColorTarget::Fill => self.state.fill_color = hex,
                }
            }
            Operator::BeginText => {
                self.state.in_text_mode = true;
                self.state.current_path.clear();
            }
            Operator::EndText => {
                self.state.in_text_mode = false;
                self.state.current_path.clear();
            }
            Operator::MoveTo(x, y) => {
                let p = self.point(*x, *y);
                if index % 50 == 0 {
                    log::trace!(
                        "sample move at index {}: raw({}, {}) -> view({:.1}, {:.1})",
                        index,
                        x,
                        y,
                        p.x,
                        p.y
                    );
                }
                self.push(PathSegment::Move { x: p.x, y: p.y });
            }
            Operator::LineTo(x, y) => {
                let p = self.point(*x, *y);
                self.push(PathSegment::Line { x: p.x, y: p.y });
            }
            Operator::CurveTo([x1, y1, x2, y2, x3, y3]) => {
                let c1 = self.point(*x1, *y1);
                let c2 = self.point(*x2, *y2);
                let to = self.point(*x3, *y3);
                self.push(curve(c1, c2, to));
            }
            Operator::CurveTo2([x2, y2, x3, y3]) => {
                let c1 = self.current_point();
                let c2 = self.point(*x2, *y2);
                let to = self.point(*x3, *y3);
                self.push(curve(c1, c2, to));
            }
            Operator::CurveTo3([x1, y1, x3, y3]) => {
                let c1 = self.point(*x1, *y1);
                let to = self.point(*x3, *y3);
                self.push(curve(c1, to, to));
            }
            Operator::Rectangle([x, y, w, h]) => self.push_rect(*x, *y, *w, *h),
            Operator::ClosePath => self.push(PathSegment::Close),
            Operator::ConstructPath { draw, data } => {
                self.construct_path(data);
                match draw {
                    Some(paint) => self.paint(*paint, index),
                    // A batch without a draw op is a clip or abandoned path.
                    None => self.state.current_path.clear(),
                }
            }
            Operator::Paint(paint) => self.paint(*paint, index),
            Operator::Clip(_) | Operator::EndPath => self.state.current_path.clear(),
            Operator::PaintImage { name } => self.place_image(name.clone(), index),
            Operator::Unsupported(_) => {}
        }
    }

    /// Finish the page and hand back the results.
    pub fn finish(self) -> VectorOutput {
        log::debug!(
            "Vector interpreter: {} shapes, {} images, {} rects, {} colour changes, {} malformed",
            self.stats.paths,
            self.stats.images,
            self.stats.rects,
            self.stats.colors,
            self.stats.malformed
        );
        VectorOutput {
            shapes: self.shapes,
            images: self.images,
            stats: self.stats,
        }
    }

    fn point(&self, x: f64, y: f64) -> Point {
        apply_transform(
            x,
            y,
            &self.state.ctm,
            self.options.viewport_height,
            self.options.scale_x,
            self.options.scale_y,
        )
    }

    /// End point of the last segment, or the render-space origin.
    fn current_point(&self) -> Point {
        self.state
            .current_path
            .iter()
            .rev()
            .find_map(PathSegment::end_point)
            .map(|(x, y)| Point::new(x, y))
            .unwrap_or(Point::new(0.0, 0.0))
    }

    fn push(&mut self, segment: PathSegment) {
        self.state.current_path.push(segment);
    }

    fn push_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.stats.rects += 1;
        let corners = [
            self.point(x, y),
            self.point(x + w, y),
            self.point(x + w, y + h),
            self.point(x, y + h),
        ];
        self.push(PathSegment::Move {
            x: corners[0].x,
            y: corners[0].y,
        });
        for p in &corners[1..] {
            self.push(PathSegment::Line { x: p.x, y: p.y });
        }
        self.push(PathSegment::Close);
    }

    /// Walk a flattened `constructPath` batch into the current path.
    ///
    /// Stops at the first unknown sub-opcode or truncated operand list and
    /// keeps whatever was appended before it.
    fn construct_path(&mut self, data: &[f64]) {
        let mut i = 0;
        while i < data.len() {
            let code = data[i];
            i += 1;

            let arity = match sub_opcode(code) {
                Some(path_ops::MOVE_TO) | Some(path_ops::LINE_TO) => 2,
                Some(path_ops::CURVE_TO) => 6,
                Some(path_ops::QUADRATIC_CURVE_TO)
                | Some(path_ops::OTHER_CURVE_TO)
                | Some(path_ops::RECTANGLE) => 4,
                Some(path_ops::CLOSE_PATH) => 0,
                _ => {
                    log::warn!("constructPath: unknown sub-opcode {} at {}, batch truncated", code, i - 1);
                    return;
                }
            };
            let Some(a) = data.get(i..i + arity) else {
                log::warn!("constructPath: sub-opcode {} is missing operands, batch truncated", code);
                return;
            };
            i += arity;

            match sub_opcode(code) {
                Some(path_ops::MOVE_TO) => {
                    let p = self.point(a[0], a[1]);
                    self.push(PathSegment::Move { x: p.x, y: p.y });
                }
                Some(path_ops::LINE_TO) => {
                    let p = self.point(a[0], a[1]);
                    self.push(PathSegment::Line { x: p.x, y: p.y });
                }
                Some(path_ops::CURVE_TO) => {
                    let c1 = self.point(a[0], a[1]);
                    let c2 = self.point(a[2], a[3]);
                    let to = self.point(a[4], a[5]);
                    self.push(curve(c1, c2, to));
                }
                Some(path_ops::RECTANGLE) => self.push_rect(a[0], a[1], a[2], a[3]),
                Some(path_ops::CLOSE_PATH) => self.push(PathSegment::Close),
                // Quadratic and other curves collapse to a line to their end point.
                _ => {
                    let p = self.point(a[2], a[3]);
                    self.push(PathSegment::Line { x: p.x, y: p.y });
                }
            }
        }
    }

    fn paint(&mut self, paint: PaintOp, index: usize) {
        if paint.closes() {
            self.push(PathSegment::Close);
        }
        self.flush_path(paint.fills(), paint.strokes(), index);
    }

    /// Split, prune and emit the current path, then clear it.
    fn flush_path(&mut self, is_filled: bool, is_stroked: bool, index: usize) {
        let path = std::mem::take(&mut self.state.current_path);
        if path.is_empty() {
            return;
        }

        let jump = if is_filled && !self.options.split_filled_jumps {
            None
        } else {
            Some(self.options.jump_threshold())
        };

        for (sub_index, segments) in split_sub_paths(&path, jump).into_iter().enumerate() {
            if !self.keep_sub_path(&segments, is_filled) {
                log::trace!(
                    "pruned sub-path {} of operator {} ({} segments)",
                    sub_index,
                    index,
                    segments.len()
                );
                continue;
            }

            self.shapes.push(ShapeRecord {
                id: format!("path_{}_{}", index, sub_index),
                path: segments,
                thickness: self.state.line_width,
                stroke_color: self.state.stroke_color.clone(),
                fill_color: self.state.fill_color.clone(),
                opacity: self.state.opacity,
                is_filled,
                is_stroked,
            });
            self.stats.paths += 1;
        }
    }

    /// Outlier rules for one sub-path.
    fn keep_sub_path(&self, segments: &[PathSegment], is_filled: bool) -> bool {
        if segments.len() < self.options.min_segments {
            return false;
        }

        let points: Vec<(f64, f64)> = segments
            .iter()
            .filter_map(PathSegment::end_point)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        if points.len() < 2 {
            return false;
        }

        if is_filled {
            return true;
        }

        if segments.len() == 2 {
            let (a, b) = (points[0], points[1]);
            let dist = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
            if dist > self.options.beam_threshold() {
                return false;
            }
        }

        if let Some([x0, y0, x1, y1]) = bounds_of(segments) {
            let needle = self.options.needle_threshold();
            if (x1 - x0 > needle || y1 - y0 > needle)
                && segments.len() < self.options.needle_max_segments
            {
                return false;
            }
        }

        true
    }

    fn place_image(&mut self, name: Option<String>, index: usize) {
        let corners = [
            self.point(0.0, 0.0),
            self.point(1.0, 0.0),
            self.point(0.0, 1.0),
            self.point(1.0, 1.0),
        ];
        let bbox = corners.iter().fold(
            [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY],
            |b, p| [b[0].min(p.x), b[1].min(p.y), b[2].max(p.x), b[3].max(p.y)],
        );
        self.images.push(ImageRecord {
            id: format!("image_{}", index),
            name,
            bbox,
            opacity: self.state.opacity,
        });
        self.stats.images += 1;
    }
}

fn curve(c1: Point, c2: Point, to: Point) -> PathSegment {
    PathSegment::Curve {
        cp1x: c1.x,
        cp1y: c1.y,
        cp2x: c2.x,
        cp2y: c2.y,
        x: to.x,
        y: to.y,
    }
}

fn sub_opcode(code: f64) -> Option<u32> {
    (code.is_finite() && code >= 0.0 && code.fract() == 0.0).then_some(code as u32)
}

/// Split a path at every `move`, then at jumps longer than `jump`.
///
/// A jump is measured between the end points of consecutive segments; a
/// `close` on either side never counts. The segment after a jump opens a new
/// sub-path with a synthesized `move` at its end point.
pub fn split_sub_paths(path: &[PathSegment], jump: Option<f64>) -> Vec<Vec<PathSegment>> {
    let mut groups: Vec<Vec<PathSegment>> = Vec::new();
    for seg in path {
        match groups.last_mut() {
            Some(group) if !seg.is_move() => group.push(*seg),
            _ => groups.push(vec![*seg]),
        }
    }

    let Some(threshold) = jump else {
        return groups;
    };

    let mut sub_paths = Vec::with_capacity(groups.len());
    for group in groups {
        let mut sub = vec![group[0]];
        for pair in group.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            let leaked = match (prev.end_point(), curr.end_point()) {
                (Some(a), Some(b)) => {
                    Point::new(a.0, a.1).distance(&Point::new(b.0, b.1)) > threshold
                }
                _ => false,
            };

            if leaked {
                sub_paths.push(std::mem::take(&mut sub));
                if let Some((x, y)) = curr.end_point() {
                    sub.push(PathSegment::Move { x, y });
                }
                if !curr.is_move() {
                    sub.push(curr);
                }
            } else {
                sub.push(curr);
            }
        }
        if !sub.is_empty() {
            sub_paths.push(sub);
        }
    }
    sub_paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::operators::ops;
    use serde_json::{json, Value};

    fn raw(opcode: u32, args: Vec<Value>, index: usize) -> RawOperator {
        RawOperator::new(opcode, args, index)
    }

    fn processor(height: f64) -> VectorProcessor {
        VectorProcessor::new(InterpreterOptions::new(height))
    }

    #[test]
    fn test_save_restore() {
        let mut vp = processor(100.0);
        vp.process_raw(&raw(ops::SET_LINE_WIDTH, vec![json!(3)], 0));
        vp.process_raw(&raw(ops::SAVE, vec![], 1));
        vp.process_raw(&raw(ops::SET_LINE_WIDTH, vec![json!(7)], 2));
        vp.process_raw(&raw(
            ops::TRANSFORM,
            vec![json!(2), json!(0), json!(0), json!(2), json!(5), json!(5)],
            3,
        ));
        vp.process_raw(&raw(ops::SET_FILL_GRAY, vec![json!(1)], 4));
        assert_eq!(vp.state().depth(), 1);
        vp.process_raw(&raw(ops::RESTORE, vec![], 5));

        let state = vp.state();
        assert_eq!(state.line_width, 3.0);
        assert_eq!(state.ctm, IDENTITY);
        assert_eq!(state.fill_color, "#000000");
        assert_eq!(state.depth(), 0);
    }

    #[test]
    fn test_restore_on_empty_stack_is_noop() {
        let mut vp = processor(100.0);
        vp.process_raw(&raw(ops::SET_LINE_WIDTH, vec![json!(4)], 0));
        vp.process_raw(&raw(ops::RESTORE, vec![], 1));
        assert_eq!(vp.state().line_width, 4.0);
    }

    #[test]
    fn test_save_does_not_capture_path() {
        let mut vp = processor(100.0);
        vp.process_raw(&raw(ops::MOVE_TO, vec![json!(0), json!(0)], 0));
        vp.process_raw(&raw(ops::SAVE, vec![], 1));
        vp.process_raw(&raw(ops::LINE_TO, vec![json!(5), json!(0)], 2));
        vp.process_raw(&raw(ops::RESTORE, vec![], 3));
        assert_eq!(vp.state().current_path.len(), 2);
    }

    #[test]
    fn test_text_mode_shields_geometry() {
        let mut vp = processor(100.0);
        vp.process_raw(&raw(ops::BEGIN_TEXT, vec![], 0));
        vp.process_raw(&raw(ops::MOVE_TO, vec![json!(1), json!(1)], 1));
        assert!(vp.state().current_path.is_empty());
        vp.process_raw(&raw(ops::END_TEXT, vec![], 2));
        vp.process_raw(&raw(ops::LINE_TO, vec![json!(20), json!(20)], 3));
        vp.process_raw(&raw(ops::STROKE, vec![], 4));
        assert!(vp.shapes().is_empty());
    }

    #[test]
    fn test_begin_text_discards_pending_path() {
        let mut vp = processor(100.0);
        vp.process_raw(&raw(ops::MOVE_TO, vec![json!(1), json!(1)], 0));
        vp.process_raw(&raw(ops::LINE_TO, vec![json!(5), json!(1)], 1));
        vp.process_raw(&raw(ops::BEGIN_TEXT, vec![], 2));
        vp.process_raw(&raw(ops::END_TEXT, vec![], 3));
        vp.process_raw(&raw(ops::STROKE, vec![], 4));
        assert!(vp.shapes().is_empty());
    }

    #[test]
    fn test_filled_triangle() {
        let mut vp = processor(20.0);
        vp.process_raw(&raw(ops::MOVE_TO, vec![json!(0), json!(0)], 0));
        vp.process_raw(&raw(ops::LINE_TO, vec![json!(10), json!(0)], 1));
        vp.process_raw(&raw(ops::LINE_TO, vec![json!(10), json!(10)], 2));
        vp.process_raw(&raw(ops::CLOSE_PATH, vec![], 3));
        vp.process_raw(&raw(
            ops::SET_FILL_RGB_COLOR,
            vec![json!(1), json!(0), json!(0)],
            4,
        ));
        vp.process_raw(&raw(ops::FILL, vec![], 5));

        let out = vp.finish();
        assert_eq!(out.shapes.len(), 1);
        let shape = &out.shapes[0];
        assert_eq!(shape.id, "path_5_0");
        assert!(shape.is_filled);
        assert!(!shape.is_stroked);
        assert_eq!(shape.fill_color, "#ff0000");
        assert_eq!(
            shape.path,
            vec![
                PathSegment::Move { x: 0.0, y: 20.0 },
                PathSegment::Line { x: 10.0, y: 20.0 },
                PathSegment::Line { x: 10.0, y: 10.0 },
                PathSegment::Close,
            ]
        );
        assert_eq!(out.stats.colors, 1);
        assert_eq!(out.stats.paths, 1);
    }

    #[test]
    fn test_close_stroke_appends_close() {
        let mut vp = processor(100.0);
        vp.process_raw(&raw(ops::MOVE_TO, vec![json!(0), json!(0)], 0));
        vp.process_raw(&raw(ops::LINE_TO, vec![json!(10), json!(0)], 1));
        vp.process_raw(&raw(ops::CLOSE_STROKE, vec![], 2));
        let shape = &vp.shapes()[0];
        assert!(shape.is_stroked && !shape.is_filled);
        assert_eq!(shape.path.last(), Some(&PathSegment::Close));
        assert!(vp.state().current_path.is_empty());
    }

    #[test]
    fn test_flush_clears_path_even_when_pruned() {
        let mut vp = processor(100.0);
        vp.process_raw(&raw(ops::MOVE_TO, vec![json!(0), json!(0)], 0));
        vp.process_raw(&raw(ops::STROKE, vec![], 1));
        assert!(vp.shapes().is_empty());
        assert!(vp.state().current_path.is_empty());
    }

    #[test]
    fn test_clip_and_end_path_discard() {
        let mut vp = processor(100.0);
        vp.process_raw(&raw(
            ops::RECTANGLE,
            vec![json!(0), json!(0), json!(10), json!(10)],
            0,
        ));
        vp.process_raw(&raw(ops::CLIP, vec![], 1));
        vp.process_raw(&raw(ops::END_PATH, vec![], 2));
        vp.process_raw(&raw(ops::FILL, vec![], 3));
        assert!(vp.shapes().is_empty());
        assert_eq!(vp.stats().rects, 1);
    }

    #[test]
    fn test_rectangle_expands() {
        let mut vp = processor(100.0);
        vp.process_raw(&raw(
            ops::RECTANGLE,
            vec![json!(10), json!(10), json!(20), json!(5)],
            7,
        ));
        vp.process_raw(&raw(ops::FILL_STROKE, vec![], 8));
        let shape = &vp.shapes()[0];
        assert!(shape.is_filled && shape.is_stroked);
        assert_eq!(shape.segment_count(), 5);
        assert_eq!(shape.bounds(), Some([10.0, 85.0, 30.0, 90.0]));
    }

    #[test]
    fn test_reduced_curves() {
        let mut vp = processor(100.0);
        vp.process_raw(&raw(ops::MOVE_TO, vec![json!(0), json!(0)], 0));
        vp.process_raw(&raw(
            ops::CURVE_TO_2,
            vec![json!(5), json!(5), json!(10), json!(0)],
            1,
        ));
        vp.process_raw(&raw(
            ops::CURVE_TO_3,
            vec![json!(15), json!(5), json!(20), json!(0)],
            2,
        ));
        let path = &vp.state().current_path;
        assert_eq!(
            path[1],
            PathSegment::Curve {
                cp1x: 0.0,
                cp1y: 100.0,
                cp2x: 5.0,
                cp2y: 95.0,
                x: 10.0,
                y: 100.0
            }
        );
        assert_eq!(
            path[2],
            PathSegment::Curve {
                cp1x: 15.0,
                cp1y: 95.0,
                cp2x: 20.0,
                cp2y: 100.0,
                x: 20.0,
                y: 100.0
            }
        );
    }

    #[test]
    fn test_construct_path_with_draw() {
        let mut vp = processor(100.0);
        vp.process_raw(&raw(
            ops::CONSTRUCT_PATH,
            vec![json!(ops::CLOSE_STROKE), json!([[0, 0, 0, 1, 10, 0, 1, 10, 10]])],
            3,
        ));
        let out = vp.finish();
        assert_eq!(out.shapes.len(), 1);
        let shape = &out.shapes[0];
        assert_eq!(shape.id, "path_3_0");
        assert_eq!(shape.segment_count(), 4);
        assert_eq!(shape.path[3], PathSegment::Close);
        assert!(shape.is_stroked && !shape.is_filled);
    }

    #[test]
    fn test_construct_path_without_draw_is_discarded() {
        let mut vp = processor(100.0);
        vp.process_raw(&raw(
            ops::CONSTRUCT_PATH,
            vec![json!(null), json!([[5, 0, 0, 10, 10]])],
            0,
        ));
        assert!(vp.state().current_path.is_empty());
        vp.process_raw(&raw(ops::FILL, vec![], 1));
        assert!(vp.shapes().is_empty());
    }

    #[test]
    fn test_construct_path_truncated_keeps_parsed() {
        let mut vp = processor(100.0);
        vp.construct_path(&[0.0, 0.0, 0.0, 1.0, 10.0, 0.0, 2.0, 1.0]);
        assert_eq!(vp.state().current_path.len(), 2);

        vp.state.current_path.clear();
        vp.construct_path(&[0.0, 0.0, 0.0, 9.0, 1.0, 5.0, 5.0]);
        assert_eq!(vp.state().current_path.len(), 1);
    }

    #[test]
    fn test_construct_path_quadratic_becomes_line() {
        let mut vp = processor(100.0);
        vp.construct_path(&[0.0, 0.0, 0.0, 3.0, 5.0, 5.0, 10.0, 0.0]);
        assert_eq!(
            vp.state().current_path[1],
            PathSegment::Line { x: 10.0, y: 100.0 }
        );
    }

    #[test]
    fn test_jump_split() {
        let path = vec![
            PathSegment::Move { x: 0.0, y: 0.0 },
            PathSegment::Line { x: 5.0, y: 0.0 },
            PathSegment::Line { x: 500.0, y: 0.0 },
            PathSegment::Line { x: 505.0, y: 0.0 },
            PathSegment::Close,
        ];
        let subs = split_sub_paths(&path, Some(400.0));
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].len(), 2);
        assert_eq!(
            subs[1],
            vec![
                PathSegment::Move { x: 500.0, y: 0.0 },
                PathSegment::Line { x: 500.0, y: 0.0 },
                PathSegment::Line { x: 505.0, y: 0.0 },
                PathSegment::Close,
            ]
        );

        assert_eq!(split_sub_paths(&path, None).len(), 1);
    }

    #[test]
    fn test_jump_split_leaves_degenerate_tail() {
        // 60 units on a 100-unit page: split at the jump, the tail is a zero-length pair
        let mut vp = processor(100.0);
        vp.process_raw(&raw(ops::MOVE_TO, vec![json!(0), json!(10)], 0));
        vp.process_raw(&raw(ops::LINE_TO, vec![json!(0), json!(70)], 1));
        vp.process_raw(&raw(ops::STROKE, vec![], 2));
        assert_eq!(vp.shapes().len(), 1);
        assert_eq!(vp.shapes()[0].id, "path_2_1");
        assert_eq!(vp.shapes()[0].bounds(), Some([0.0, 30.0, 0.0, 30.0]));
    }

    #[test]
    fn test_filled_jump_split_is_opt_in() {
        // 120-unit leak on a 100-unit page
        let stream = vec![
            raw(ops::MOVE_TO, vec![json!(10), json!(10)], 0),
            raw(ops::LINE_TO, vec![json!(20), json!(10)], 1),
            raw(ops::LINE_TO, vec![json!(20), json!(20)], 2),
            raw(ops::LINE_TO, vec![json!(140), json!(20)], 3),
            raw(ops::LINE_TO, vec![json!(150), json!(20)], 4),
            raw(ops::LINE_TO, vec![json!(150), json!(30)], 5),
            raw(ops::FILL, vec![], 6),
        ];

        let mut vp = processor(100.0);
        vp.process_all(&stream);
        assert_eq!(vp.shapes().len(), 1);

        let mut vp = VectorProcessor::new(InterpreterOptions::new(100.0).with_split_filled_jumps(true));
        vp.process_all(&stream);
        let shapes = vp.shapes();
        assert_eq!(shapes.len(), 2);
        assert!(shapes.iter().all(|s| s.is_filled));
        assert_eq!(shapes[0].id, "path_6_0");
        assert_eq!(shapes[0].path.len(), 3);
        assert_eq!(shapes[1].id, "path_6_1");
        assert_eq!(shapes[1].path[0], PathSegment::Move { x: 140.0, y: 80.0 });
        assert_eq!(shapes[1].bounds(), Some([140.0, 70.0, 150.0, 80.0]));
    }

    #[test]
    fn test_move_split() {
        let path = vec![
            PathSegment::Move { x: 0.0, y: 0.0 },
            PathSegment::Line { x: 1.0, y: 0.0 },
            PathSegment::Move { x: 5.0, y: 5.0 },
            PathSegment::Line { x: 6.0, y: 5.0 },
        ];
        assert_eq!(split_sub_paths(&path, Some(100.0)).len(), 2);
    }

    #[test]
    fn test_beam_and_needle_pruning() {
        // two-point unfilled line longer than half the page; jump split off
        let mut vp = VectorProcessor::new(InterpreterOptions::new(100.0).with_jump_ratio(1.0));
        vp.process_raw(&raw(ops::MOVE_TO, vec![json!(0), json!(10)], 0));
        vp.process_raw(&raw(ops::LINE_TO, vec![json!(0), json!(70)], 1));
        vp.process_raw(&raw(ops::STROKE, vec![], 2));
        assert!(vp.shapes().is_empty());

        // the same line filled survives
        vp.process_raw(&raw(ops::MOVE_TO, vec![json!(0), json!(10)], 3));
        vp.process_raw(&raw(ops::LINE_TO, vec![json!(0), json!(70)], 4));
        vp.process_raw(&raw(ops::FILL, vec![], 5));
        assert_eq!(vp.shapes().len(), 1);

        // a short polyline spanning 90% of the page in small steps
        let mut vp = processor(100.0);
        vp.process_raw(&raw(ops::MOVE_TO, vec![json!(0), json!(0)], 0));
        vp.process_raw(&raw(ops::LINE_TO, vec![json!(30), json!(0)], 1));
        vp.process_raw(&raw(ops::LINE_TO, vec![json!(60), json!(0)], 2));
        vp.process_raw(&raw(ops::LINE_TO, vec![json!(90), json!(0)], 3));
        vp.process_raw(&raw(ops::STROKE, vec![], 4));
        assert!(vp.shapes().is_empty());
    }

    #[test]
    fn test_gstate_opacity_applies() {
        let mut vp = processor(100.0);
        vp.process_raw(&raw(ops::SET_GSTATE, vec![json!({"CA": 0.5, "ca": 0.25})], 0));
        vp.process_raw(&raw(
            ops::RECTANGLE,
            vec![json!(0), json!(0), json!(10), json!(10)],
            1,
        ));
        vp.process_raw(&raw(ops::FILL, vec![], 2));
        assert_eq!(vp.shapes()[0].opacity, 0.5);
        assert_eq!(vp.state().fill_opacity, 0.25);
    }

    #[test]
    fn test_malformed_operator_recovers() {
        let mut vp = processor(100.0);
        vp.process_raw(&raw(ops::MOVE_TO, vec![json!(1)], 0));
        vp.process_raw(&raw(ops::MOVE_TO, vec![json!(0), json!(0)], 1));
        vp.process_raw(&raw(ops::LINE_TO, vec![json!(10), json!(0)], 2));
        vp.process_raw(&raw(ops::STROKE, vec![], 3));
        assert_eq!(vp.stats().malformed, 1);
        assert_eq!(vp.shapes().len(), 1);
    }

    #[test]
    fn test_image_placement() {
        let mut vp = processor(100.0);
        vp.process_raw(&raw(
            ops::TRANSFORM,
            vec![json!(50), json!(0), json!(0), json!(20), json!(10), json!(30)],
            0,
        ));
        vp.process_raw(&raw(ops::PAINT_IMAGE_X_OBJECT, vec![json!("img_p0_1")], 1));
        let out = vp.finish();
        assert_eq!(out.images.len(), 1);
        assert_eq!(out.images[0].id, "image_1");
        assert_eq!(out.images[0].name.as_deref(), Some("img_p0_1"));
        assert_eq!(out.images[0].bbox, [10.0, 50.0, 60.0, 70.0]);
    }
}
