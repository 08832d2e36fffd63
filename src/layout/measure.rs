//! Text measurement backends and fit scaling.

use std::collections::HashMap;

use super::options::FitOptions;
use crate::model::{FontMetrics, FontWeight, GlyphMetrics, TextFragment};

/// Font description passed to a [`TextMeasurer`].
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Font name as referenced by fragments and blocks
    pub family: String,
    /// Family to use when `family` is unavailable
    pub fallback_family: Option<String>,
    /// Size in render units
    pub size: f64,
    /// Weight
    pub weight: FontWeight,
    /// Italic style
    pub italic: bool,
}

impl FontSpec {
    /// Regular-weight upright font.
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            fallback_family: None,
            size,
            weight: FontWeight::Normal,
            italic: false,
        }
    }

    /// Font of a fragment. The size magnitude is used.
    pub fn from_fragment(frag: &TextFragment) -> Self {
        Self {
            family: frag.font.clone(),
            fallback_family: frag.fallback_family.clone(),
            size: frag.size.abs(),
            weight: frag.weight,
            italic: frag.is_italic,
        }
    }
}

/// Per-character advance widths for a font.
pub trait TextMeasurer {
    /// Advance width of `ch` in render units.
    fn advance(&self, ch: char, font: &FontSpec) -> f64;

    /// Width of a whole string.
    fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        text.chars().map(|ch| self.advance(ch, font)).sum()
    }
}

/// Measurer backed by harvested font metrics.
#[derive(Debug, Clone)]
pub struct MetricsMeasurer {
    fonts: HashMap<String, GlyphMetrics>,
    fallback_char_width: f64,
    fallback_em: f64,
}

impl MetricsMeasurer {
    /// Build from a metrics table; entries without metrics are skipped.
    pub fn new(fonts: &[FontMetrics]) -> Self {
        Self {
            fonts: fonts
                .iter()
                .filter_map(|f| f.metrics.clone().map(|m| (f.name.clone(), m)))
                .collect(),
            fallback_char_width: 50.0,
            fallback_em: 0.5,
        }
    }

    /// Advance in ems used for fonts missing from the table.
    pub fn with_fallback_em(mut self, em: f64) -> Self {
        self.fallback_em = em;
        self
    }

    /// Check if metrics are known for `family`.
    pub fn has_font(&self, family: &str) -> bool {
        self.fonts.contains_key(family)
    }
}

impl TextMeasurer for MetricsMeasurer {
    fn advance(&self, ch: char, font: &FontSpec) -> f64 {
        match self.fonts.get(&font.family) {
            Some(metrics) => {
                let w100 = metrics
                    .width_of(ch)
                    .or_else(|| metrics.width_of(' '))
                    .unwrap_or(self.fallback_char_width);
                w100 / 100.0 * font.size
            }
            None => font.size * self.fallback_em,
        }
    }
}

/// Horizontal scale that fits `measured` into `target`, clamped by `options`.
///
/// Non-positive inputs yield `1.0`.
pub fn fit_ratio(measured: f64, target: f64, options: &FitOptions) -> f64 {
    if measured <= 0.0 || target <= 0.0 || !measured.is_finite() || !target.is_finite() {
        return 1.0;
    }
    let effective = (target - options.safety_cushion).max(1.0);
    (effective / measured).clamp(options.min_scale, options.max_scale)
}
