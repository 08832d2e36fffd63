//! Matrix composition, point transformation and colour conversion.
//!
//! PDF user space is bottom-up; the scene is top-down. Every point that enters
//! a [`PathSegment`](crate::model::PathSegment) goes through [`apply_transform`],
//! which applies the CTM, flips the y axis against the viewport height and
//! scales both axes.

use serde_json::Value;

/// Affine matrix `[a, b, c, d, e, f]`.
pub type Matrix = [f64; 6];

/// The identity matrix.
pub const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// A point in render space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal position
    pub x: f64,
    /// Vertical position (top-down)
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[inline]
fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Compose two matrices so that `m1` is applied first, then `m2`.
///
/// This is the PDF `cm` convention: `ctm' = multiply_matrices(&args, &ctm)`.
/// Non-finite components, in or out, become `0`.
pub fn multiply_matrices(m1: &Matrix, m2: &Matrix) -> Matrix {
    let a = m1.map(finite_or_zero);
    let b = m2.map(finite_or_zero);
    [
        a[0] * b[0] + a[1] * b[2],
        a[0] * b[1] + a[1] * b[3],
        a[2] * b[0] + a[3] * b[2],
        a[2] * b[1] + a[3] * b[3],
        a[4] * b[0] + a[5] * b[2] + b[4],
        a[4] * b[1] + a[5] * b[3] + b[5],
    ]
    .map(finite_or_zero)
}

/// Transform `(x, y)` by `ctm`, flip into top-down space and scale.
pub fn apply_transform(
    x: f64,
    y: f64,
    ctm: &Matrix,
    viewport_height: f64,
    scale_x: f64,
    scale_y: f64,
) -> Point {
    let lx = finite_or_zero(x);
    let ly = finite_or_zero(y);
    let m = ctm.map(finite_or_zero);

    let tx = lx * m[0] + ly * m[2] + m[4];
    let ty = lx * m[1] + ly * m[3] + m[5];

    Point {
        x: finite_or_zero(tx * scale_x),
        y: finite_or_zero((viewport_height - ty) * scale_y),
    }
}

/// Read a number from a JSON operand; numeric strings are parsed.
pub fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Coerce colour operands to finite numbers, defaulting invalid entries to `0`.
pub fn sanitize_color_comps(args: &[Value]) -> Vec<f64> {
    args.iter()
        .map(|v| number_from_value(v).unwrap_or(0.0))
        .collect()
}

/// Quantise to a byte, rounding halves down so `0.5 * 255` lands on `0x7f`.
fn to_byte(v: f64) -> u8 {
    if !v.is_finite() {
        return 0;
    }
    (v - 0.5).ceil().clamp(0.0, 255.0) as u8
}

fn unit_channel(c: f64) -> u8 {
    to_byte(finite_or_zero(c).clamp(0.0, 1.0) * 255.0)
}

/// Convert gray (1), RGB (3) or CMYK (4) components to `#rrggbb`.
///
/// Any other component count yields `#000000`.
pub fn comps_to_hex(comps: &[f64]) -> String {
    let [r, g, b] = match *comps {
        [gray] => {
            let v = unit_channel(gray);
            [v, v, v]
        }
        [r, g, b] => [unit_channel(r), unit_channel(g), unit_channel(b)],
        [c, m, y, k] => {
            let k = finite_or_zero(k);
            [
                to_byte(255.0 * (1.0 - finite_or_zero(c)) * (1.0 - k)),
                to_byte(255.0 * (1.0 - finite_or_zero(m)) * (1.0 - k)),
                to_byte(255.0 * (1.0 - finite_or_zero(y)) * (1.0 - k)),
            ]
        }
        _ => return "#000000".to_string(),
    };
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_composition() {
        let m = [2.0, 0.5, -1.0, 3.0, 10.0, -4.0];
        assert_eq!(multiply_matrices(&IDENTITY, &m), m);
        assert_eq!(multiply_matrices(&m, &IDENTITY), m);
    }

    #[test]
    fn test_composition_order() {
        // translate then scale: (1,0) -> (11,0) -> (22,0)
        let translate = [1.0, 0.0, 0.0, 1.0, 10.0, 0.0];
        let scale = [2.0, 0.0, 0.0, 2.0, 0.0, 0.0];
        let m = multiply_matrices(&translate, &scale);
        let p = apply_transform(1.0, 0.0, &m, 0.0, 1.0, 1.0);
        assert_eq!(p.x, 22.0);
    }

    #[test]
    fn test_nan_coerced() {
        let m = [f64::NAN, 0.0, 0.0, 1.0, 0.0, 0.0];
        let r = multiply_matrices(&m, &IDENTITY);
        assert_eq!(r[0], 0.0);
        let p = apply_transform(f64::INFINITY, 5.0, &IDENTITY, 10.0, 1.0, 1.0);
        assert_eq!(p, Point::new(0.0, 5.0));
    }

    #[test]
    fn test_identity_transform_flips_y() {
        for (x, y, h) in [(0.0, 0.0, 100.0), (12.5, 40.0, 792.0), (-3.0, 900.0, 792.0)] {
            let p = apply_transform(x, y, &IDENTITY, h, 1.0, 1.0);
            assert_eq!(p, Point::new(x, h - y));
        }
    }

    #[test]
    fn test_transform_scales_after_flip() {
        let p = apply_transform(10.0, 20.0, &IDENTITY, 100.0, 2.0, 0.5);
        assert_eq!(p, Point::new(20.0, 40.0));
    }

    #[test]
    fn test_sanitize() {
        let comps = sanitize_color_comps(&[json!(0.5), json!("0.25"), json!("abc"), json!(null)]);
        assert_eq!(comps, vec![0.5, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn test_hex_boundaries() {
        assert_eq!(comps_to_hex(&[0.0, 0.0, 0.0]), "#000000");
        assert_eq!(comps_to_hex(&[1.0, 1.0, 1.0]), "#ffffff");
        assert_eq!(comps_to_hex(&[0.5]), "#7f7f7f");
        assert_eq!(comps_to_hex(&[0.0, 0.0, 0.0, 0.0]), "#ffffff");
        assert_eq!(comps_to_hex(&[0.0, 0.0, 0.0, 1.0]), "#000000");
        assert_eq!(comps_to_hex(&[1.0, 0.0, 0.0]), "#ff0000");
        assert_eq!(comps_to_hex(&[1.0, 0.0, 0.0, 0.0]), "#00ffff");
    }

    #[test]
    fn test_hex_clamps_and_defaults() {
        assert_eq!(comps_to_hex(&[2.0, -1.0, 0.0]), "#ff0000");
        assert_eq!(comps_to_hex(&[]), "#000000");
        assert_eq!(comps_to_hex(&[0.1, 0.2]), "#000000");
        assert_eq!(comps_to_hex(&[0.0, 0.0, 0.0, -1.0]), "#ffffff");
    }
}
