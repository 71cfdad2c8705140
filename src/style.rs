//! Named plot styling shared by every figure unit.
//!
//! All lookups are pure: a `Style` is built once from the output settings and
//! passed to each unit. Unrecognized names are errors, never silent defaults.

use crate::error::{FigureError, Result};
use plotters::style::{FontDesc, FontStyle, IntoFont, RGBColor};
use std::collections::BTreeMap;

/// Figure dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width_in: f64,
    pub height_in: f64,
}

impl FigureSize {
    pub const fn new(width_in: f64, height_in: f64) -> Self {
        Self {
            width_in,
            height_in,
        }
    }

    pub fn pixels(&self, px_per_inch: u32) -> (u32, u32) {
        let scale = px_per_inch as f64;
        (
            (self.width_in * scale).round().max(1.0) as u32,
            (self.height_in * scale).round().max(1.0) as u32,
        )
    }
}

/// Font size in points plus weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub points: f64,
    pub bold: bool,
}

/// A categorical palette. Colors are handed out in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<RGBColor>,
}

impl Palette {
    fn new(colors: Vec<RGBColor>) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &[RGBColor] {
        &self.colors
    }

    /// Color for the i-th category, cycling when there are more categories
    /// than colors.
    pub fn color(&self, i: usize) -> RGBColor {
        self.colors[i % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// A continuous colormap built from evenly interpolated stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    stops: Vec<(f64, RGBColor)>,
}

impl Colormap {
    fn from_colors(colors: &[RGBColor]) -> Self {
        let n = colors.len().max(2) - 1;
        let stops = colors
            .iter()
            .enumerate()
            .map(|(i, c)| (i as f64 / n as f64, *c))
            .collect();
        Self { stops }
    }

    /// Restrict the map to the `[lo, hi]` fraction of its range.
    pub fn sub(&self, lo: f64, hi: f64) -> Self {
        const SAMPLES: usize = 64;
        let colors: Vec<RGBColor> = (0..SAMPLES)
            .map(|i| self.sample(lo + (hi - lo) * i as f64 / (SAMPLES - 1) as f64))
            .collect();
        Self::from_colors(&colors)
    }

    /// Color at position `t` in `[0, 1]`; out of range values are clamped.
    pub fn sample(&self, t: f64) -> RGBColor {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let upper = self
            .stops
            .iter()
            .position(|(pos, _)| *pos >= t)
            .unwrap_or(self.stops.len() - 1);
        if upper == 0 {
            return self.stops[0].1;
        }
        let (p0, c0) = self.stops[upper - 1];
        let (p1, c1) = self.stops[upper];
        let w = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
        lerp_rgb(c0, c1, w)
    }

    /// Color for `value` within `range`. `None` for the no-data sentinel.
    pub fn map(&self, value: f64, range: ColorRange) -> Option<RGBColor> {
        if !value.is_finite() {
            return None;
        }
        Some(self.sample(range.normalize(value)))
    }
}

fn lerp_rgb(a: RGBColor, b: RGBColor, w: f64) -> RGBColor {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * w).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Value range a colormap spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRange {
    pub min: f64,
    pub max: f64,
}

impl ColorRange {
    /// Symmetric range around zero, the convention for signed statistic maps.
    pub fn symmetric(vmax: f64) -> Self {
        let v = vmax.abs();
        Self { min: -v, max: v }
    }

    pub fn normalize(&self, value: f64) -> f64 {
        if self.max > self.min {
            (value - self.min) / (self.max - self.min)
        } else {
            0.5
        }
    }
}

pub const ORANGE: RGBColor = RGBColor(0xff, 0xa5, 0x00);
pub const GREEN: RGBColor = RGBColor(0x00, 0x80, 0x00);
pub const BLUE: RGBColor = RGBColor(0x00, 0x00, 0xff);
pub const RED: RGBColor = RGBColor(0xff, 0x00, 0x00);
pub const LIGHT_GRAY: RGBColor = RGBColor(0xd3, 0xd3, 0xd3);
pub const SILVER: RGBColor = RGBColor(0xc0, 0xc0, 0xc0);
pub const LIGHT_BLUE: RGBColor = RGBColor(0xad, 0xd8, 0xe6);
pub const GRAY: RGBColor = RGBColor(0x80, 0x80, 0x80);
pub const INK: RGBColor = RGBColor(0x00, 0x00, 0x00);
pub const PAPER: RGBColor = RGBColor(0xff, 0xff, 0xff);

const SULC_DARK: RGBColor = RGBColor(0x55, 0x55, 0x55);
const SULC_LIGHT: RGBColor = RGBColor(0xcc, 0xcc, 0xcc);

/// RdBu, ColorBrewer 11-class, red end first.
const RDBU: [RGBColor; 11] = [
    RGBColor(0x67, 0x00, 0x1f),
    RGBColor(0xb2, 0x18, 0x2b),
    RGBColor(0xd6, 0x60, 0x4d),
    RGBColor(0xf4, 0xa5, 0x82),
    RGBColor(0xfd, 0xdb, 0xc7),
    RGBColor(0xf7, 0xf7, 0xf7),
    RGBColor(0xd1, 0xe5, 0xf0),
    RGBColor(0x92, 0xc5, 0xde),
    RGBColor(0x43, 0x93, 0xc3),
    RGBColor(0x21, 0x66, 0xac),
    RGBColor(0x05, 0x30, 0x61),
];

/// seaborn "deep" categorical colors.
const DEEP: [RGBColor; 6] = [
    RGBColor(0x4c, 0x72, 0xb0),
    RGBColor(0xdd, 0x84, 0x52),
    RGBColor(0x55, 0xa8, 0x68),
    RGBColor(0xc4, 0x4e, 0x52),
    RGBColor(0x81, 0x72, 0xb3),
    RGBColor(0x93, 0x78, 0x60),
];

#[derive(Debug, Clone)]
pub struct Style {
    px_per_inch: u32,
    palettes: BTreeMap<&'static str, Palette>,
    sizes: BTreeMap<&'static str, FigureSize>,
    fonts: BTreeMap<&'static str, FontSpec>,
    colormaps: BTreeMap<&'static str, Colormap>,
    colors: BTreeMap<&'static str, RGBColor>,
}

impl Default for Style {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Style {
    pub fn new(px_per_inch: u32) -> Self {
        let palettes = BTreeMap::from([
            // indexed by hand: left, right
            ("hand", Palette::new(vec![ORANGE, GREEN])),
            ("early-error", Palette::new(vec![ORANGE, GREEN])),
            ("rsa-models", Palette::new(vec![GREEN, ORANGE, BLUE, RED])),
            ("categorical", Palette::new(DEEP.to_vec())),
        ]);

        let sizes = BTreeMap::from([
            ("learning-curve-strip", FigureSize::new(16.0, 4.0)),
            ("bar-pair-tall", FigureSize::new(2.5, 6.0)),
            ("model-comparison", FigureSize::new(4.0, 4.0)),
            ("hemisphere-pair", FigureSize::new(6.0, 3.5)),
            ("reexpression-pair", FigureSize::new(4.5, 6.0)),
            ("facet-grid-2x2", FigureSize::new(5.0, 5.0)),
            ("distribution-triple", FigureSize::new(6.0, 4.0)),
            ("single-panel", FigureSize::new(3.0, 3.0)),
            ("panel-pair", FigureSize::new(6.0, 3.0)),
            ("permutation-pair", FigureSize::new(12.0, 5.0)),
            ("surface-row", FigureSize::new(8.0, 2.0)),
            ("surface-view", FigureSize::new(1.5, 2.0)),
        ]);

        let fonts = BTreeMap::from([
            (
                "axis-label",
                FontSpec {
                    points: 12.0,
                    bold: true,
                },
            ),
            (
                "axis-label-large",
                FontSpec {
                    points: 14.0,
                    bold: true,
                },
            ),
            (
                "axis-label-plain",
                FontSpec {
                    points: 12.0,
                    bold: false,
                },
            ),
            (
                "label-large",
                FontSpec {
                    points: 14.0,
                    bold: false,
                },
            ),
            (
                "label-xl",
                FontSpec {
                    points: 16.0,
                    bold: false,
                },
            ),
            (
                "tick",
                FontSpec {
                    points: 10.0,
                    bold: false,
                },
            ),
            (
                "tick-category",
                FontSpec {
                    points: 12.0,
                    bold: false,
                },
            ),
            (
                "title",
                FontSpec {
                    points: 14.0,
                    bold: false,
                },
            ),
            (
                "title-large",
                FontSpec {
                    points: 18.0,
                    bold: false,
                },
            ),
            (
                "significance",
                FontSpec {
                    points: 18.0,
                    bold: true,
                },
            ),
            (
                "significance-large",
                FontSpec {
                    points: 22.0,
                    bold: false,
                },
            ),
        ]);

        let rdbu_r: Vec<RGBColor> = RDBU.iter().rev().copied().collect();
        let colormaps = BTreeMap::from([
            ("tstat-diverging", Colormap::from_colors(&rdbu_r).sub(0.05, 0.95)),
            ("sulc", Colormap::from_colors(&[SULC_DARK, SULC_LIGHT])),
            ("outline", Colormap::from_colors(&[PAPER, INK])),
        ]);

        let colors = BTreeMap::from([
            ("orange", ORANGE),
            ("green", GREEN),
            ("blue", BLUE),
            ("red", RED),
            ("lightgray", LIGHT_GRAY),
            ("silver", SILVER),
            ("lightblue", LIGHT_BLUE),
            ("gray", GRAY),
            ("ink", INK),
            ("paper", PAPER),
        ]);

        Self {
            px_per_inch: px_per_inch.max(1),
            palettes,
            sizes,
            fonts,
            colormaps,
            colors,
        }
    }

    pub fn px_per_inch(&self) -> u32 {
        self.px_per_inch
    }

    pub fn palette(&self, name: &str) -> Result<&Palette> {
        self.palettes.get(name).ok_or_else(|| unknown("palette", name))
    }

    pub fn figure_size(&self, name: &str) -> Result<FigureSize> {
        self.sizes
            .get(name)
            .copied()
            .ok_or_else(|| unknown("figure size", name))
    }

    pub fn font_spec(&self, name: &str) -> Result<FontSpec> {
        self.fonts
            .get(name)
            .copied()
            .ok_or_else(|| unknown("font", name))
    }

    /// Plotters font for a named font spec, scaled to output pixels.
    pub fn font(&self, name: &str) -> Result<FontDesc<'static>> {
        let spec = self.font_spec(name)?;
        let px = spec.points * self.px_per_inch as f64 / 72.0;
        let font = ("sans-serif", px).into_font();
        Ok(if spec.bold {
            font.style(FontStyle::Bold)
        } else {
            font
        })
    }

    pub fn colormap(&self, name: &str) -> Result<&Colormap> {
        self.colormaps
            .get(name)
            .ok_or_else(|| unknown("colormap", name))
    }

    pub fn color(&self, name: &str) -> Result<RGBColor> {
        self.colors
            .get(name)
            .copied()
            .ok_or_else(|| unknown("color", name))
    }

    /// Points to output pixels, for line widths and marker sizes.
    pub fn pt(&self, points: f64) -> u32 {
        (points * self.px_per_inch as f64 / 72.0).round().max(1.0) as u32
    }
}

fn unknown(kind: &'static str, name: &str) -> FigureError {
    FigureError::UnknownStyle {
        kind,
        name: name.to_string(),
    }
}
