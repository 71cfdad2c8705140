//! Statistical plot primitives: categorical axes, strip plots, bars, boxes
//! and significance brackets.
//!
//! Charts are drawn without grid lines and with only the left and bottom
//! spines.

use crate::error::Result;
use crate::render::canvas::Area;
use crate::stats::Quartiles;
use crate::style::{Style, GRAY, INK, PAPER};
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

pub type Plane = Cartesian2d<TickedRange, TickedRange>;
pub type Chart<'a, 'b> = ChartContext<'a, SVGBackend<'b>, Plane>;

/// Linear f64 coordinate whose tick marks sit exactly at `ticks`.
#[derive(Clone)]
pub struct TickedRange {
    linear: RangedCoordf64,
    ticks: Vec<f64>,
}

impl TickedRange {
    pub fn new(range: Range<f64>, ticks: Vec<f64>) -> Self {
        let ticks = ticks
            .into_iter()
            .filter(|t| *t >= range.start.min(range.end) && *t <= range.start.max(range.end))
            .collect();
        Self {
            linear: range.into(),
            ticks,
        }
    }
}

impl Ranged for TickedRange {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.linear.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        // ticks only; the light pass would otherwise add unlabelled marks
        if hint.weight().allow_light_points() {
            Vec::new()
        } else {
            self.ticks.clone()
        }
    }

    fn range(&self) -> Range<f64> {
        self.linear.range()
    }
}

/// One axis: value range, labelled ticks and a description.
#[derive(Debug, Clone)]
pub struct Axis {
    pub range: Range<f64>,
    pub ticks: Vec<(f64, String)>,
    pub label: String,
}

impl Axis {
    /// Categories placed at 0, 1, .. n-1.
    pub fn categorical<S: AsRef<str>>(labels: &[S]) -> Self {
        let n = labels.len().max(1) as f64;
        Self {
            range: -0.5..n - 0.5,
            ticks: labels
                .iter()
                .enumerate()
                .map(|(i, l)| (i as f64, l.as_ref().to_string()))
                .collect(),
            label: String::new(),
        }
    }

    pub fn numeric(range: Range<f64>, ticks: &[f64]) -> Self {
        Self {
            range,
            ticks: ticks.iter().map(|t| (*t, format_tick(*t))).collect(),
            label: String::new(),
        }
    }

    /// Numeric axis spanning `values` with round tick positions.
    pub fn fit(values: &[f64], max_ticks: usize) -> Self {
        let (lo, hi) = padded_bounds(values, 0.08);
        let ticks = nice_ticks(lo, hi, max_ticks);
        Self::numeric(lo..hi, &ticks)
    }

    /// Numeric axis with fixed ticks, widened to cover `values` as well.
    pub fn fit_with_ticks(values: &[f64], ticks: &[f64]) -> Self {
        let (lo, hi) = padded_bounds(values, 0.08);
        let lo = ticks.iter().copied().fold(lo, f64::min);
        let hi = ticks.iter().copied().fold(hi, f64::max);
        Self::numeric(lo..hi, ticks)
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    fn span(&self) -> f64 {
        self.range.end - self.range.start
    }
}

/// Everything needed to lay out one panel.
#[derive(Debug, Clone)]
pub struct AxesSpec {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub rotate_x_labels: bool,
    pub show_x_axis: bool,
    pub show_y_axis: bool,
    /// Named font for the axis descriptions.
    pub desc_font: &'static str,
    /// Named font for category tick labels.
    pub tick_font: &'static str,
    pub title_font: &'static str,
}

impl AxesSpec {
    pub fn new(x: Axis, y: Axis) -> Self {
        Self {
            title: None,
            x,
            y,
            rotate_x_labels: false,
            show_x_axis: true,
            show_y_axis: true,
            desc_font: "axis-label",
            tick_font: "tick",
            title_font: "title",
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.title = (!title.is_empty()).then_some(title);
        self
    }

    pub fn rotated(mut self) -> Self {
        self.rotate_x_labels = true;
        self
    }

    pub fn hide_x_axis(mut self) -> Self {
        self.show_x_axis = false;
        self
    }

    pub fn hide_y_axis(mut self) -> Self {
        self.show_y_axis = false;
        self
    }

    pub fn fonts(mut self, desc: &'static str, tick: &'static str) -> Self {
        self.desc_font = desc;
        self.tick_font = tick;
        self
    }

    pub fn title_font(mut self, font: &'static str) -> Self {
        self.title_font = font;
        self
    }
}

fn tick_label(ticks: &[(f64, String)], value: f64) -> String {
    ticks
        .iter()
        .find(|(t, _)| (t - value).abs() < 1e-9)
        .map(|(_, l)| l.clone())
        .unwrap_or_default()
}

pub fn format_tick(v: f64) -> String {
    if v.fract().abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        let s = format!("{v:.2}");
        match s.trim_end_matches('0').trim_end_matches('.') {
            "-0" => "0".to_string(),
            trimmed => trimmed.to_string(),
        }
    }
}

/// Build a despined chart on `area` following `spec`.
pub fn build_axes<'a, 'b>(area: &'a Area<'b>, style: &Style, spec: &AxesSpec) -> Result<Chart<'a, 'b>> {
    let tick_font = style.font(spec.tick_font)?;
    let desc_font = style.font(spec.desc_font)?;
    let tick_px = style.font_spec(spec.tick_font)?.points * style.px_per_inch() as f64 / 72.0;

    let longest_x = spec.x.ticks.iter().map(|(_, l)| l.chars().count()).max().unwrap_or(0);
    let desc_px = |label: &str| if label.is_empty() { 0.0 } else { tick_px * 1.8 };
    let x_ticks_px = if !spec.show_x_axis {
        tick_px * 0.5
    } else if spec.rotate_x_labels {
        longest_x as f64 * tick_px * 0.62 + tick_px * 1.5
    } else {
        tick_px * 2.0
    };
    let x_area = (x_ticks_px + desc_px(&spec.x.label)) as u32;
    let y_area = if spec.show_y_axis {
        let longest_y = spec.y.ticks.iter().map(|(_, l)| l.chars().count()).max().unwrap_or(0);
        (longest_y as f64 * tick_px * 0.62 + tick_px * 1.2 + desc_px(&spec.y.label)) as u32
    } else {
        0
    };

    let x_keys: Vec<f64> = spec.x.ticks.iter().map(|(t, _)| *t).collect();
    let y_keys: Vec<f64> = spec.y.ticks.iter().map(|(t, _)| *t).collect();

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(style.pt(4.0))
        .margin_right(style.pt(8.0))
        .x_label_area_size(x_area)
        .y_label_area_size(y_area);
    if let Some(title) = &spec.title {
        builder.caption(title, style.font(spec.title_font)?);
    }
    let (n_x, n_y) = (x_keys.len(), y_keys.len());
    let mut chart = builder.build_cartesian_2d(
        TickedRange::new(spec.x.range.clone(), x_keys),
        TickedRange::new(spec.y.range.clone(), y_keys),
    )?;

    let x_fmt = |v: &f64| tick_label(&spec.x.ticks, *v);
    let y_fmt = |v: &f64| tick_label(&spec.y.ticks, *v);
    let x_style = if spec.rotate_x_labels {
        tick_font.clone().transform(FontTransform::Rotate90)
    } else {
        tick_font.clone()
    };

    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .x_labels(n_x.max(1))
        .y_labels(n_y.max(1))
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .x_label_style(x_style)
        .y_label_style(tick_font)
        .axis_desc_style(desc_font)
        .axis_style(INK.stroke_width(1));
    if !spec.x.label.is_empty() {
        mesh.x_desc(spec.x.label.as_str());
    }
    if !spec.y.label.is_empty() {
        mesh.y_desc(spec.y.label.as_str());
    }
    if !spec.show_x_axis {
        mesh.disable_x_axis();
    }
    if !spec.show_y_axis {
        mesh.disable_y_axis();
    }
    mesh.draw()?;
    Ok(chart)
}

/// Range of `values` widened by `pad` of its span on both sides.
pub fn padded_bounds(values: &[f64], pad: f64) -> (f64, f64) {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let span = if hi > lo { hi - lo } else { lo.abs().max(1.0) };
    (lo - span * pad, hi + span * pad)
}

/// Round tick positions inside `[lo, hi]`, at most `max_ticks` of them.
pub fn nice_ticks(lo: f64, hi: f64, max_ticks: usize) -> Vec<f64> {
    let max_ticks = max_ticks.max(2);
    let span = hi - lo;
    if !(span > 0.0) {
        return vec![lo];
    }
    let raw = span / (max_ticks - 1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| span / s <= (max_ticks - 1) as f64)
        .unwrap_or(10.0 * magnitude);
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// `start, start + step, ..` strictly below `end`, like `numpy.arange`.
pub fn arange(start: f64, end: f64, step: f64) -> Vec<f64> {
    let n = ((end - start) / step).ceil().max(0.0) as usize;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Seeded uniform jitter so repeated runs place points identically.
pub struct Jitter {
    rng: StdRng,
}

impl Jitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform offset in `[-width, width]`.
    pub fn symmetric(&mut self, width: f64) -> f64 {
        if width <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-width..=width)
    }

    /// Uniform offset in `[lo, hi)`.
    pub fn between(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }
}

/// Black line through per-category means with white, black-edged markers.
pub fn mean_line(chart: &mut Chart, style: &Style, points: &[(f64, f64)], marker_pt: f64) -> Result<()> {
    let finite: Vec<(f64, f64)> = points.iter().copied().filter(|(_, y)| y.is_finite()).collect();
    let line_w = style.pt(1.2);
    chart.draw_series(LineSeries::new(finite.clone(), INK.stroke_width(line_w)))?;
    let r = style.pt(marker_pt / 2.0);
    chart.draw_series(finite.iter().map(|p| Circle::new(*p, r, PAPER.filled())))?;
    chart.draw_series(finite.iter().map(|p| Circle::new(*p, r, INK.stroke_width(1))))?;
    Ok(())
}

/// Jittered points around category positions.
pub fn strip(
    chart: &mut Chart,
    style: &Style,
    points: &[(f64, f64, RGBColor)],
    jitter: &mut Jitter,
    width: f64,
    size_pt: f64,
    alpha: f64,
) -> Result<()> {
    let r = style.pt(size_pt / 2.0);
    let placed: Vec<(f64, f64, RGBColor)> = points
        .iter()
        .filter(|(_, y, _)| y.is_finite())
        .map(|(x, y, c)| (x + jitter.symmetric(width), *y, *c))
        .collect();
    chart.draw_series(
        placed
            .iter()
            .map(|(x, y, c)| Circle::new((*x, *y), r, c.mix(alpha).filled())),
    )?;
    Ok(())
}

/// Filled bars centred on `x` with optional symmetric error bars.
pub fn bars(
    chart: &mut Chart,
    style: &Style,
    bars: &[(f64, f64, Option<f64>, RGBColor)],
    width: f64,
) -> Result<()> {
    let half = width / 2.0;
    chart.draw_series(
        bars.iter()
            .filter(|(_, h, _, _)| h.is_finite())
            .map(|(x, h, _, c)| Rectangle::new([(x - half, 0.0), (x + half, *h)], c.filled())),
    )?;
    let cap = half * 0.3;
    let stroke = INK.stroke_width(style.pt(1.0));
    for (x, h, err, _) in bars {
        let Some(e) = err.filter(|e| e.is_finite() && h.is_finite()) else {
            continue;
        };
        let (lo, hi) = (h - e, h + e);
        chart.draw_series([
            PathElement::new(vec![(*x, lo), (*x, hi)], stroke),
            PathElement::new(vec![(x - cap, lo), (x + cap, lo)], stroke),
            PathElement::new(vec![(x - cap, hi), (x + cap, hi)], stroke),
        ])?;
    }
    Ok(())
}

/// Which range the box-plot whiskers cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Whiskers {
    /// Most extreme data within 1.5 IQR of the box.
    Tukey,
    /// Full data range.
    MinMax,
}

/// Whisker ends for `data` summarised by `q`.
pub fn whisker_bounds(data: &[f64], q: &Quartiles, whiskers: Whiskers) -> (f64, f64) {
    match whiskers {
        Whiskers::MinMax => (q.min, q.max),
        Whiskers::Tukey => {
            let lo_fence = q.q1 - 1.5 * q.iqr();
            let hi_fence = q.q3 + 1.5 * q.iqr();
            let inside = data.iter().copied().filter(|v| v.is_finite());
            let lo = inside
                .clone()
                .filter(|v| *v >= lo_fence)
                .fold(f64::INFINITY, f64::min);
            let hi = inside.filter(|v| *v <= hi_fence).fold(f64::NEG_INFINITY, f64::max);
            (lo.min(q.q1), hi.max(q.q3))
        }
    }
}

/// A vertical box plot at `x`. Outliers are not drawn.
pub fn box_plot(
    chart: &mut Chart,
    style: &Style,
    x: f64,
    data: &[f64],
    q: &Quartiles,
    whiskers: Whiskers,
    width: f64,
    fill: RGBColor,
) -> Result<()> {
    let half = width / 2.0;
    let cap = half * 0.5;
    let (w_lo, w_hi) = whisker_bounds(data, q, whiskers);
    let stroke = INK.stroke_width(style.pt(0.8));
    chart.draw_series([Rectangle::new([(x - half, q.q1), (x + half, q.q3)], fill.filled())])?;
    chart.draw_series([Rectangle::new([(x - half, q.q1), (x + half, q.q3)], stroke)])?;
    chart.draw_series([
        PathElement::new(vec![(x - half, q.median), (x + half, q.median)], stroke),
        PathElement::new(vec![(x, q.q3), (x, w_hi)], stroke),
        PathElement::new(vec![(x, q.q1), (x, w_lo)], stroke),
        PathElement::new(vec![(x - cap, w_hi), (x + cap, w_hi)], stroke),
        PathElement::new(vec![(x - cap, w_lo), (x + cap, w_lo)], stroke),
    ])?;
    Ok(())
}

/// Horizontal bracket from `x1` to `x2` at `y` with a centred label above.
pub fn significance_bracket(
    chart: &mut Chart,
    style: &Style,
    x1: f64,
    x2: f64,
    y: f64,
    label: &str,
    font: &str,
) -> Result<()> {
    significance_bracket_at(chart, style, (x1, x2), y, y, label, font)
}

/// Bracket line at `line_y`; the label's bottom edge sits at `label_y`.
pub fn significance_bracket_at(
    chart: &mut Chart,
    style: &Style,
    (x1, x2): (f64, f64),
    line_y: f64,
    label_y: f64,
    label: &str,
    font: &str,
) -> Result<()> {
    chart.draw_series([PathElement::new(
        vec![(x1, line_y), (x2, line_y)],
        INK.stroke_width(style.pt(1.2)),
    )])?;
    let text = TextStyle::from(style.font(font)?)
        .color(&INK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series([Text::new(label.to_string(), ((x1 + x2) / 2.0, label_y), text)])?;
    Ok(())
}

fn dashed(chart: &mut Chart, from: (f64, f64), to: (f64, f64), stroke: ShapeStyle) -> Result<()> {
    const DASHES: usize = 30;
    let step = |i: usize| {
        let t = i as f64 / (2 * DASHES - 1) as f64;
        (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
    };
    chart.draw_series((0..DASHES).map(|i| PathElement::new(vec![step(2 * i), step(2 * i + 1)], stroke)))?;
    Ok(())
}

/// Dashed horizontal line across `x`.
pub fn dashed_hline(chart: &mut Chart, style: &Style, y: f64, x: Range<f64>, color: RGBColor) -> Result<()> {
    dashed(chart, (x.start, y), (x.end, y), color.stroke_width(style.pt(1.0)))
}

/// Thin dashed vertical line across `y`.
pub fn dashed_vline(chart: &mut Chart, x: f64, y: Range<f64>, color: RGBAColor) -> Result<()> {
    dashed(chart, (x, y.start), (x, y.end), color.stroke_width(1))
}

/// Shaded band between `lower` and `upper` curves sharing x positions.
pub fn band(chart: &mut Chart, lower: &[(f64, f64)], upper: &[(f64, f64)], color: RGBColor, alpha: f64) -> Result<()> {
    let mut outline: Vec<(f64, f64)> = upper
        .iter()
        .copied()
        .filter(|(_, y)| y.is_finite())
        .collect();
    outline.extend(lower.iter().rev().copied().filter(|(_, y)| y.is_finite()));
    if outline.len() >= 3 {
        chart.draw_series([Polygon::new(outline, color.mix(alpha).filled())])?;
    }
    Ok(())
}

/// Gray rectangle spanning the full y range between `x0` and `x1`.
pub fn vspan(chart: &mut Chart, spec: &AxesSpec, x0: f64, x1: f64) -> Result<()> {
    chart.draw_series([Rectangle::new(
        [(x0, spec.y.range.start), (x1, spec.y.range.end)],
        GRAY.mix(0.2).filled(),
    )])?;
    Ok(())
}

/// Marker for points that pass a test: circles, triangles or crosses.
pub fn markers(
    chart: &mut Chart,
    style: &Style,
    points: &[(f64, f64)],
    shape: MarkerShape,
    size_pt: f64,
    fill: RGBColor,
) -> Result<()> {
    let r = style.pt(size_pt / 2.0);
    match shape {
        MarkerShape::Circle => {
            chart.draw_series(points.iter().map(|p| Circle::new(*p, r, fill.filled())))?;
            chart.draw_series(points.iter().map(|p| Circle::new(*p, r, INK.stroke_width(1))))?;
        }
        MarkerShape::TriangleDown => {
            let (w, h) = (r as f64, r as f64 * 1.15);
            for &(x, y) in points {
                let to_px = chart.backend_coord(&(x, y));
                let tri = vec![
                    (to_px.0 - w as i32, to_px.1 - h as i32),
                    (to_px.0 + w as i32, to_px.1 - h as i32),
                    (to_px.0, to_px.1 + h as i32),
                ];
                let area = chart.plotting_area().strip_coord_spec();
                let (ox, oy) = area.get_base_pixel();
                let local: Vec<(i32, i32)> = tri.iter().map(|(a, b)| (a - ox, b - oy)).collect();
                area.draw(&Polygon::new(local.clone(), fill.filled()))?;
                let mut closed = local;
                closed.push(closed[0]);
                area.draw(&PathElement::new(closed, INK.stroke_width(1)))?;
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerShape {
    Circle,
    TriangleDown,
}

/// Screen-space vertical offset in data units, for stacking annotations.
pub fn data_offset(axis: &Axis, fraction: f64) -> f64 {
    axis.span() * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorical_axis_centres_labels() {
        let axis = Axis::categorical(&["a", "b", "c"]);
        assert_eq!(axis.range, -0.5..2.5);
        assert_eq!(axis.ticks[2], (2.0, "c".to_string()));
        assert_eq!(tick_label(&axis.ticks, 1.0), "b");
        assert_eq!(tick_label(&axis.ticks, 1.5), "");
    }

    #[test]
    fn nice_ticks_are_round() {
        assert_eq!(nice_ticks(0.0, 10.0, 6), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(nice_ticks(-0.45, 0.45, 5), vec![-0.25, 0.0, 0.25]);
        assert_eq!(nice_ticks(3.0, 3.0, 5), vec![3.0]);
    }

    #[test]
    fn arange_excludes_end() {
        assert_eq!(arange(-15.0, 60.0, 15.0), vec![-15.0, 0.0, 15.0, 30.0, 45.0]);
        assert_eq!(arange(1.0, 4.0, 1.0), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn tick_format_drops_trailing_zeros() {
        assert_eq!(format_tick(15.0), "15");
        assert_eq!(format_tick(-0.2), "-0.2");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(-1e-17), "0");
    }

    #[test]
    fn jitter_is_reproducible() {
        let mut a = Jitter::new(1);
        let mut b = Jitter::new(1);
        let xs: Vec<f64> = (0..5).map(|_| a.symmetric(0.1)).collect();
        let ys: Vec<f64> = (0..5).map(|_| b.symmetric(0.1)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|x| x.abs() <= 0.1));
    }

    #[test]
    fn tukey_whiskers_stop_at_fences() {
        let data = [1.0, 2.0, 3.0, 4.0, 100.0];
        let q = crate::stats::quartiles(&data).unwrap();
        let (lo, hi) = whisker_bounds(&data, &q, Whiskers::Tukey);
        assert_eq!(lo, 1.0);
        assert_eq!(hi, 4.0);
        assert_eq!(whisker_bounds(&data, &q, Whiskers::MinMax), (1.0, 100.0));
    }

    #[test]
    fn fixed_ticks_widen_the_axis() {
        let axis = Axis::fit_with_ticks(&[1.5, 2.5], &[1.0, 2.0, 3.0]);
        assert!(axis.range.start <= 1.0);
        assert!(axis.range.end >= 3.0);
        assert_eq!(axis.ticks.len(), 3);
    }

    #[test]
    fn ticked_range_reports_only_its_ticks() {
        use plotters::coord::ranged1d::{BoldPoints, LightPoints};

        let range = TickedRange::new(0.0..4.0, vec![-1.0, 1.0, 2.0, 3.0, 5.0]);
        assert_eq!(range.key_points(BoldPoints(10)), vec![1.0, 2.0, 3.0]);
        assert!(range.key_points(LightPoints::new(10, 50)).is_empty());
        assert_eq!(range.map(&2.0, (0, 100)), 50);
        assert_eq!(range.range(), 0.0..4.0);
    }

    #[test]
    fn axes_draw_the_listed_tick_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("axes.svg");
        let style = Style::default();
        let canvas = crate::render::Canvas::new(&path, crate::style::FigureSize::new(3.0, 3.0), &style).unwrap();
        let spec = AxesSpec::new(
            Axis::categorical(&["alpha", "beta"]),
            Axis::numeric(0.5..3.5, &[1.0, 2.0, 3.0]).label("Eccentricity"),
        )
        .rotated()
        .title("Panel");
        let chart = build_axes(canvas.root(), &style, &spec).unwrap();
        assert!(chart.backend_coord(&(0.0, 1.0)).0 < chart.backend_coord(&(1.0, 1.0)).0);
        drop(chart);
        let artifact = canvas.finish().unwrap();

        let svg = std::fs::read_to_string(&artifact.path).unwrap();
        for label in ["alpha", "beta", "1", "2", "3", "Eccentricity", "Panel"] {
            assert!(svg.contains(&format!(">{label}\n")), "missing tick label {label}");
        }
        assert!(!svg.contains(">2.5\n"));
    }

    #[test]
    fn padded_bounds_handle_degenerate_input() {
        assert_eq!(padded_bounds(&[], 0.1), (0.0, 1.0));
        let (lo, hi) = padded_bounds(&[2.0, 2.0], 0.1);
        assert!(lo < 2.0 && hi > 2.0);
    }
}
