//! Content-stream operators as delivered by the upstream tokenizer.
//!
//! The tokenizer emits `{ fn, args, index }` triples keyed by numeric
//! opcodes. [`Operator::decode`] turns one of those into a closed enum so the
//! interpreter's dispatch is checked exhaustively.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::geometry::{number_from_value, sanitize_color_comps, Matrix};
use crate::error::{Error, Result};

/// Numeric opcodes of the operator list format.
pub mod ops {
    pub const SET_LINE_WIDTH: u32 = 2;
    pub const SET_GSTATE: u32 = 9;
    pub const SAVE: u32 = 10;
    pub const RESTORE: u32 = 11;
    pub const TRANSFORM: u32 = 12;
    pub const MOVE_TO: u32 = 13;
    pub const LINE_TO: u32 = 14;
    pub const CURVE_TO: u32 = 15;
    pub const CURVE_TO_2: u32 = 16;
    pub const CURVE_TO_3: u32 = 17;
    pub const CLOSE_PATH: u32 = 18;
    pub const RECTANGLE: u32 = 19;
    pub const STROKE: u32 = 20;
    pub const CLOSE_STROKE: u32 = 21;
    pub const FILL: u32 = 22;
    pub const EO_FILL: u32 = 23;
    pub const FILL_STROKE: u32 = 24;
    pub const EO_FILL_STROKE: u32 = 25;
    pub const CLOSE_FILL_STROKE: u32 = 26;
    pub const CLOSE_EO_FILL_STROKE: u32 = 27;
    pub const END_PATH: u32 = 28;
    pub const CLIP: u32 = 29;
    pub const EO_CLIP: u32 = 30;
    pub const BEGIN_TEXT: u32 = 31;
    pub const END_TEXT: u32 = 32;
    pub const SET_STROKE_COLOR: u32 = 52;
    pub const SET_STROKE_COLOR_N: u32 = 53;
    pub const SET_FILL_COLOR: u32 = 54;
    pub const SET_FILL_COLOR_N: u32 = 55;
    pub const SET_STROKE_GRAY: u32 = 56;
    pub const SET_FILL_GRAY: u32 = 57;
    pub const SET_STROKE_RGB_COLOR: u32 = 58;
    pub const SET_FILL_RGB_COLOR: u32 = 59;
    pub const SET_STROKE_CMYK_COLOR: u32 = 60;
    pub const SET_FILL_CMYK_COLOR: u32 = 61;
    pub const PAINT_IMAGE_MASK_X_OBJECT: u32 = 83;
    pub const PAINT_IMAGE_X_OBJECT: u32 = 85;
    pub const PAINT_INLINE_IMAGE_X_OBJECT: u32 = 86;
    pub const PAINT_IMAGE_X_OBJECT_REPEAT: u32 = 88;
    pub const CONSTRUCT_PATH: u32 = 91;
}

/// Sub-opcodes inside a `constructPath` batch.
pub mod path_ops {
    pub const MOVE_TO: u32 = 0;
    pub const LINE_TO: u32 = 1;
    pub const CURVE_TO: u32 = 2;
    pub const QUADRATIC_CURVE_TO: u32 = 3;
    pub const OTHER_CURVE_TO: u32 = 4;
    pub const RECTANGLE: u32 = 5;
    pub const CLOSE_PATH: u32 = 6;
}

/// One operator as emitted by the tokenizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOperator {
    /// Numeric opcode
    #[serde(rename = "fn", alias = "opcode")]
    pub opcode: u32,

    /// Operands
    #[serde(default, deserialize_with = "null_as_empty")]
    pub args: Vec<Value>,

    /// Position in the operator list
    #[serde(default)]
    pub index: usize,
}

impl RawOperator {
    /// Create a raw operator.
    pub fn new(opcode: u32, args: Vec<Value>, index: usize) -> Self {
        Self {
            opcode,
            args,
            index,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Which colour a colour operator sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    /// Stroke colour
    Stroke,
    /// Fill colour
    Fill,
}

/// Fill rule carried by clip operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillRule {
    /// Non-zero winding
    NonZero,
    /// Even-odd
    EvenOdd,
}

/// Path painting operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOp {
    Stroke,
    CloseStroke,
    Fill,
    EoFill,
    FillStroke,
    EoFillStroke,
    CloseFillStroke,
    CloseEoFillStroke,
}

impl PaintOp {
    /// Map a top-level opcode to a paint operator.
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            ops::STROKE => PaintOp::Stroke,
            ops::CLOSE_STROKE => PaintOp::CloseStroke,
            ops::FILL => PaintOp::Fill,
            ops::EO_FILL => PaintOp::EoFill,
            ops::FILL_STROKE => PaintOp::FillStroke,
            ops::EO_FILL_STROKE => PaintOp::EoFillStroke,
            ops::CLOSE_FILL_STROKE => PaintOp::CloseFillStroke,
            ops::CLOSE_EO_FILL_STROKE => PaintOp::CloseEoFillStroke,
            _ => return None,
        })
    }

    /// Map the draw operation of a `constructPath` batch.
    ///
    /// Older producers use `1` for stroke and `2`/`3` for fill here.
    pub fn from_draw_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(PaintOp::Stroke),
            2 | 3 => Some(PaintOp::Fill),
            _ => Self::from_code(code),
        }
    }

    /// Whether a `close` segment is appended before painting.
    pub fn closes(&self) -> bool {
        matches!(
            self,
            PaintOp::CloseStroke | PaintOp::CloseFillStroke | PaintOp::CloseEoFillStroke
        )
    }

    /// Whether the path is filled.
    pub fn fills(&self) -> bool {
        !matches!(self, PaintOp::Stroke | PaintOp::CloseStroke)
    }

    /// Whether the path is stroked.
    pub fn strokes(&self) -> bool {
        !matches!(self, PaintOp::Fill | PaintOp::EoFill)
    }
}

/// Opacity values read from an ExtGState dictionary.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GStateParams {
    /// Resolved opacity (`CA_m > CA > ca_m > ca`)
    pub opacity: Option<f64>,
    /// Resolved fill opacity (`ca_m > ca`)
    pub fill_opacity: Option<f64>,
}

impl GStateParams {
    /// Read opacity keys from either a dictionary or a list of `[key, value]` pairs.
    pub fn from_value(value: &Value) -> Self {
        let lookup = |key: &str| -> Option<f64> {
            match value {
                Value::Object(map) => map.get(key).and_then(number_from_value),
                Value::Array(pairs) => pairs.iter().rev().find_map(|pair| match pair {
                    Value::Array(kv) if kv.first().and_then(Value::as_str) == Some(key) => {
                        kv.get(1).and_then(number_from_value)
                    }
                    _ => None,
                }),
                _ => None,
            }
        };

        let fill_opacity = lookup("ca_m").or_else(|| lookup("ca"));
        let opacity = lookup("CA_m").or_else(|| lookup("CA")).or(fill_opacity);
        Self {
            opacity,
            fill_opacity,
        }
    }
}

/// A decoded content-stream operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Save,
    Restore,
    Transform(Matrix),
    SetLineWidth(f64),
    SetGState(GStateParams),
    SetColor {
        target: ColorTarget,
        comps: Vec<f64>,
    },
    BeginText,
    EndText,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CurveTo([f64; 6]),
    /// First control point taken from the current point
    CurveTo2([f64; 4]),
    /// Second control point equals the end point
    CurveTo3([f64; 4]),
    Rectangle([f64; 4]),
    ClosePath,
    /// Pre-flattened path batch; `data` interleaves sub-opcodes and operands
    ConstructPath {
        draw: Option<PaintOp>,
        data: Vec<f64>,
    },
    Paint(PaintOp),
    Clip(FillRule),
    EndPath,
    PaintImage {
        name: Option<String>,
    },
    /// Anything the interpreter does not act on
    Unsupported(u32),
}

impl Operator {
    /// Decode a raw operator.
    ///
    /// Returns [`Error::MalformedOperator`] when a known operator lacks the
    /// operands it needs.
    pub fn decode(raw: &RawOperator) -> Result<Self> {
        let code = raw.opcode;
        let args = &raw.args;

        let op = match code {
            ops::SAVE => Operator::Save,
            ops::RESTORE => Operator::Restore,
            ops::TRANSFORM => Operator::Transform(numbers::<6>(code, args)?),
            ops::SET_LINE_WIDTH => {
                let [w] = numbers::<1>(code, args)?;
                Operator::SetLineWidth(w)
            }
            ops::SET_GSTATE => {
                let dict = args
                    .first()
                    .filter(|v| !v.is_null())
                    .ok_or_else(|| Error::malformed(code, "missing graphics state dictionary"))?;
                Operator::SetGState(GStateParams::from_value(dict))
            }
            ops::SET_STROKE_GRAY
            | ops::SET_STROKE_COLOR
            | ops::SET_STROKE_COLOR_N
            | ops::SET_STROKE_RGB_COLOR
            | ops::SET_STROKE_CMYK_COLOR => Operator::SetColor {
                target: ColorTarget::Stroke,
                comps: sanitize_color_comps(args),
            },
            ops::SET_FILL_GRAY
            | ops::SET_FILL_COLOR
            | ops::SET_FILL_COLOR_N
            | ops::SET_FILL_RGB_COLOR
            | ops::SET_FILL_CMYK_COLOR => Operator::SetColor {
                target: ColorTarget::Fill,
                comps: sanitize_color_comps(args),
            },
            ops::BEGIN_TEXT => Operator::BeginText,
            ops::END_TEXT => Operator::EndText,
            ops::MOVE_TO => {
                let [x, y] = numbers::<2>(code, args)?;
                Operator::MoveTo(x, y)
            }
            ops::LINE_TO => {
                let [x, y] = numbers::<2>(code, args)?;
                Operator::LineTo(x, y)
            }
            ops::CURVE_TO => Operator::CurveTo(numbers::<6>(code, args)?),
            ops::CURVE_TO_2 => Operator::CurveTo2(numbers::<4>(code, args)?),
            ops::CURVE_TO_3 => Operator::CurveTo3(numbers::<4>(code, args)?),
            ops::CLOSE_PATH => Operator::ClosePath,
            ops::RECTANGLE => Operator::Rectangle(numbers::<4>(code, args)?),
            ops::CONSTRUCT_PATH => decode_construct_path(code, args)?,
            ops::END_PATH => Operator::EndPath,
            ops::CLIP => Operator::Clip(FillRule::NonZero),
            ops::EO_CLIP => Operator::Clip(FillRule::EvenOdd),
            ops::PAINT_IMAGE_X_OBJECT
            | ops::PAINT_IMAGE_X_OBJECT_REPEAT
            | ops::PAINT_IMAGE_MASK_X_OBJECT
            | ops::PAINT_INLINE_IMAGE_X_OBJECT => Operator::PaintImage {
                name: args.first().and_then(Value::as_str).map(str::to_string),
            },
            other => match PaintOp::from_code(other) {
                Some(paint) => Operator::Paint(paint),
                None => Operator::Unsupported(other),
            },
        };

        Ok(op)
    }

    /// Like [`decode`](Self::decode), but rejects opcodes outside the known table.
    pub fn decode_strict(raw: &RawOperator) -> Result<Self> {
        match Self::decode(raw)? {
            Operator::Unsupported(code) => Err(Error::UnknownOperator(code)),
            op => Ok(op),
        }
    }

    /// Check if this operator builds path geometry.
    pub fn is_path_construction(&self) -> bool {
        matches!(
            self,
            Operator::MoveTo(..)
                | Operator::LineTo(..)
                | Operator::CurveTo(_)
                | Operator::CurveTo2(_)
                | Operator::CurveTo3(_)
                | Operator::Rectangle(_)
                | Operator::ConstructPath { .. }
        )
    }
}

/// Read the first `N` operands as numbers; unparsable values become `0`.
fn numbers<const N: usize>(code: u32, args: &[Value]) -> Result<[f64; N]> {
    if args.len() < N {
        return Err(Error::malformed(
            code,
            format!("expected {} operands, got {}", N, args.len()),
        ));
    }
    let mut out = [0.0; N];
    for (slot, value) in out.iter_mut().zip(args) {
        *slot = number_from_value(value).unwrap_or(0.0);
    }
    Ok(out)
}

fn decode_construct_path(code: u32, args: &[Value]) -> Result<Operator> {
    let draw = args
        .first()
        .and_then(number_from_value)
        .and_then(|c| PaintOp::from_draw_code(c as u32));

    // `[drawOp, [pathData, minMax?]]`, or `[drawOp, pathData]` from flatter encoders
    let data = match args.get(1) {
        Some(Value::Array(outer)) => match outer.first() {
            Some(Value::Array(inner)) => inner,
            Some(_) => outer,
            None => return Err(Error::malformed(code, "empty path data")),
        },
        _ => return Err(Error::malformed(code, "missing path data")),
    };

    let data = data
        .iter()
        .map(|v| number_from_value(v).unwrap_or(f64::NAN))
        .collect();

    Ok(Operator::ConstructPath { draw, data })
}
